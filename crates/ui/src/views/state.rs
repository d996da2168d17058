use dioxus::prelude::*;
use services::{AdminError, AnalyticsError, LeaderboardError, QuizError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    /// The backend could not be reached or rejected the request.
    Backend,
    /// Progress saved on this device could not be read or written.
    LocalState,
    /// The submitted form is incomplete.
    Invalid,
    NotFound,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::Unknown => "Something went wrong. Please try again.",
            ViewError::Backend => "Could not reach the quiz server. Please try again.",
            ViewError::LocalState => "Could not read progress saved on this device.",
            ViewError::Invalid => "Fill in the question, every option and the correct answer.",
            ViewError::NotFound => "That question no longer exists.",
        }
    }
}

impl From<&QuizError> for ViewError {
    fn from(err: &QuizError) -> Self {
        match err {
            QuizError::Storage(_) => ViewError::Backend,
            QuizError::Local(_) => ViewError::LocalState,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&LeaderboardError> for ViewError {
    fn from(err: &LeaderboardError) -> Self {
        match err {
            LeaderboardError::Storage(_) => ViewError::Backend,
            LeaderboardError::Local(_) => ViewError::LocalState,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&AdminError> for ViewError {
    fn from(err: &AdminError) -> Self {
        match err {
            AdminError::Question(_) => ViewError::Invalid,
            AdminError::Storage(storage::StorageError::NotFound) => ViewError::NotFound,
            AdminError::Storage(_) => ViewError::Backend,
            _ => ViewError::Unknown,
        }
    }
}

impl From<&AnalyticsError> for ViewError {
    fn from(err: &AnalyticsError) -> Self {
        match err {
            AnalyticsError::Storage(_) => ViewError::Backend,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: &Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}
