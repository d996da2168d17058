#![forbid(unsafe_code)]

pub mod admin;
pub mod analytics;
pub mod app_services;
pub mod error;
pub mod identity;
pub mod import;
pub mod leaderboard;
pub mod live;
pub mod quiz;
pub mod replay_gate;

pub use quiz_core::Clock;

pub use admin::{AdminService, DateFolder};
pub use analytics::{ActivityPoint, AnalyticsService, AnalyticsSnapshot, ScoreBucket};
pub use app_services::AppServices;
pub use error::{
    AdminError, AnalyticsError, AppServicesError, ImportError, LeaderboardError, QuizError,
};
pub use identity::Identity;
pub use import::{ImportReport, ImportService};
pub use leaderboard::{CareerTotal, LeaderboardService, SyncReport};
pub use live::LiveRefresh;
pub use quiz::{
    ANSWER_REVEAL_DELAY, AnswerOutcome, CompletionReport, HistoryUpload, QuizLoopService,
    QuizMode, QuizProgress, QuizSession, QuizStart, QuizStep, QuizView,
};
pub use replay_gate::{Checkpoint, ReplayGate};
