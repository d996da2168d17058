use std::path::Path;
use std::sync::Arc;

use storage::{ChangeFeed, InMemoryLocalStore, JsonFileStore, LocalStore, Storage, Table};

use crate::admin::AdminService;
use crate::analytics::AnalyticsService;
use crate::error::AppServicesError;
use crate::identity::Identity;
use crate::import::ImportService;
use crate::leaderboard::LeaderboardService;
use crate::live::LiveRefresh;
use crate::quiz::QuizLoopService;
use crate::replay_gate::ReplayGate;
use crate::Clock;

/// Assembles app-facing services over one storage backend and one local store.
#[derive(Clone)]
pub struct AppServices {
    identity: Identity,
    changes: ChangeFeed,
    quiz: Arc<QuizLoopService>,
    leaderboard: Arc<LeaderboardService>,
    admin: Arc<AdminService>,
    analytics: Arc<AnalyticsService>,
    import: Arc<ImportService>,
}

impl AppServices {
    #[must_use]
    pub fn from_parts(
        storage: &Storage,
        local: Arc<dyn LocalStore>,
        clock: Clock,
        identity: Identity,
    ) -> Self {
        let gate = ReplayGate::new(local);
        let quiz = Arc::new(
            QuizLoopService::new(
                clock,
                Arc::clone(&storage.questions),
                Arc::clone(&storage.attempts),
                Arc::clone(&storage.history),
                gate.clone(),
            )
            .with_identity(identity.clone()),
        );
        let leaderboard = Arc::new(LeaderboardService::new(
            clock,
            Arc::clone(&storage.leaderboard),
            Arc::clone(&storage.history),
            gate,
        ));
        let admin = Arc::new(AdminService::new(Arc::clone(&storage.questions)));
        let analytics = Arc::new(AnalyticsService::new(
            clock,
            Arc::clone(&storage.attempts),
            Arc::clone(&storage.leaderboard),
        ));
        let import = Arc::new(ImportService::new(Arc::clone(&storage.questions)));

        Self {
            identity,
            changes: storage.changes.clone(),
            quiz,
            leaderboard,
            admin,
            analytics,
            import,
        }
    }

    /// Services over in-memory storage, for tests and previews.
    #[must_use]
    pub fn in_memory(clock: Clock, identity: Identity) -> Self {
        Self::from_parts(
            &Storage::in_memory(),
            Arc::new(InMemoryLocalStore::new()),
            clock,
            identity,
        )
    }

    /// Build services backed by `SQLite` and a JSON state file.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the state
    /// file exists but cannot be read.
    pub async fn new_sqlite(
        db_url: &str,
        state_path: &Path,
        clock: Clock,
        identity: Identity,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let local: Arc<dyn LocalStore> = Arc::new(JsonFileStore::open(state_path)?);
        tracing::info!(db_url, state = %state_path.display(), "services ready");
        Ok(Self::from_parts(&storage, local, clock, identity))
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn leaderboard(&self) -> Arc<LeaderboardService> {
        Arc::clone(&self.leaderboard)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }

    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }

    #[must_use]
    pub fn import(&self) -> Arc<ImportService> {
        Arc::clone(&self.import)
    }

    /// Subscribe to changes of the given tables.
    #[must_use]
    pub fn live(&self, tables: &[Table]) -> LiveRefresh {
        LiveRefresh::new(&self.changes, tables)
    }
}
