use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::date::QuizDate;
use crate::model::ids::UserId;

/// Anonymous record of a finished daily session, used only for aggregate stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub score: u32,
    pub date: QuizDate,
    pub created_at: DateTime<Utc>,
}

impl QuizAttempt {
    #[must_use]
    pub fn new(score: u32, date: QuizDate, created_at: DateTime<Utc>) -> Self {
        Self {
            score,
            date,
            created_at,
        }
    }
}

/// One score per authenticated user per calendar date.
///
/// Uniqueness of `(user_id, date)` is enforced by the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizHistoryEntry {
    pub user_id: UserId,
    pub date: QuizDate,
    pub score: u32,
    pub created_at: DateTime<Utc>,
}

impl QuizHistoryEntry {
    #[must_use]
    pub fn new(user_id: UserId, date: QuizDate, score: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            date,
            score,
            created_at,
        }
    }
}
