mod admin;
mod analytics;
mod leaderboard;
mod live;
mod quiz;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use admin::AdminView;
pub use analytics::AnalyticsView;
pub use leaderboard::LeaderboardView;
pub use live::{use_live_refresh, use_live_refresh_while};
pub use quiz::{DailyQuizView, VaultView};
pub use state::{ViewError, ViewState, view_state_from_resource};
