use quiz_core::model::{Player, UserId};

/// Who is playing. Only authenticated players write to the per-user ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(Player),
}

impl Identity {
    #[must_use]
    pub fn player(&self) -> Option<&Player> {
        match self {
            Identity::Anonymous => None,
            Identity::Authenticated(player) => Some(player),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.player().map(|p| p.user_id)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Identity::Authenticated(_))
    }
}
