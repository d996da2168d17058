use std::sync::Arc;

use services::{
    AdminService, AnalyticsService, Identity, LeaderboardService, LiveRefresh, QuizLoopService,
};
use storage::Table;

pub trait UiApp: Send + Sync {
    fn identity(&self) -> Identity;

    fn quiz(&self) -> Arc<QuizLoopService>;
    fn leaderboard(&self) -> Arc<LeaderboardService>;
    fn admin(&self) -> Arc<AdminService>;
    fn analytics(&self) -> Arc<AnalyticsService>;

    /// Wakes when any of `tables` changes in the backend.
    fn live(&self, tables: &[Table]) -> LiveRefresh;
}

#[derive(Clone)]
pub struct AppContext {
    app: Arc<dyn UiApp>,
    identity: Identity,

    quiz: Arc<QuizLoopService>,
    leaderboard: Arc<LeaderboardService>,
    admin: Arc<AdminService>,
    analytics: Arc<AnalyticsService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            app: Arc::clone(app),
            identity: app.identity(),
            quiz: app.quiz(),
            leaderboard: app.leaderboard(),
            admin: app.admin(),
            analytics: app.analytics(),
        }
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
    pub fn live(&self, tables: &[Table]) -> LiveRefresh {
        self.app.live(tables)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
