use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;
use crate::scoring::display_points;

/// Public profile of an authenticated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl Player {
    pub const DEFAULT_USERNAME: &'static str = "Player";

    /// Blank usernames fall back to `Player::DEFAULT_USERNAME`.
    #[must_use]
    pub fn new(user_id: UserId, username: impl Into<String>, avatar_url: Option<String>) -> Self {
        let username = username.into();
        let username = if username.trim().is_empty() {
            Self::DEFAULT_USERNAME.to_string()
        } else {
            username.trim().to_string()
        };
        Self {
            user_id,
            username,
            avatar_url: avatar_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Career row maintained by the storage backend; read-only for clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: UserId,
    pub username: String,
    pub avatar_url: Option<String>,
    pub total_score: u64,
    pub games_played: u32,
    pub last_played_at: Option<DateTime<Utc>>,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn display_points(&self) -> u64 {
        display_points(self.total_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_username_gets_default() {
        let player = Player::new(UserId::random(), "  ", Some(String::new()));
        assert_eq!(player.username, Player::DEFAULT_USERNAME);
        assert_eq!(player.avatar_url, None);
    }

    #[test]
    fn entry_displays_thousands() {
        let entry = LeaderboardEntry {
            user_id: UserId::random(),
            username: "Sarah".into(),
            avatar_url: None,
            total_score: 101_999,
            games_played: 3,
            last_played_at: None,
        };
        assert_eq!(entry.display_points(), 101);
    }
}
