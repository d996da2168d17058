//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::QuestionError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use storage::LocalStoreError;

/// Errors emitted by the quiz session controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no questions available for this quiz")]
    Empty,
    #[error("quiz already completed")]
    Completed,
    #[error("an option was already selected for this question")]
    AlreadyAnswered,
    #[error("the current question has not been answered yet")]
    NotAnswered,
    #[error("option {0} is not part of the current question")]
    UnknownOption(quiz_core::model::OptionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Local(#[from] LocalStoreError),
}

/// Errors emitted by `LeaderboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeaderboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Local(#[from] LocalStoreError),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AnalyticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyticsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while importing study questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("no questions could be parsed from the input")]
    NothingParsed,
    #[error("questions per day must be at least 1")]
    InvalidBatchSize,
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Local(#[from] LocalStoreError),
}
