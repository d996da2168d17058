//! Per-device "one daily attempt" gate and mid-session checkpoint.
//!
//! Cooperative only: deleting the state file resets it.

use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_core::model::QuizDate;
use serde::{Deserialize, Serialize};
use storage::{LocalStore, LocalStoreError};
use tracing::warn;

pub const HISTORY_KEY: &str = "physio_quiz_history";
pub const PROGRESS_KEY: &str = "physio_quiz_progress";

/// Final daily scores keyed by date.
pub type ScoreHistory = BTreeMap<QuizDate, u32>;

/// In-progress daily session: the next question to show and the score so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub date: QuizDate,
    pub index: usize,
    pub score: u32,
}

#[derive(Clone)]
pub struct ReplayGate {
    store: Arc<dyn LocalStore>,
}

impl ReplayGate {
    #[must_use]
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Every recorded daily score. A corrupt blob reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be read.
    pub fn history(&self) -> Result<ScoreHistory, LocalStoreError> {
        let Some(raw) = self.store.get(HISTORY_KEY)? else {
            return Ok(ScoreHistory::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(%err, key = HISTORY_KEY, "ignoring unreadable score history");
            ScoreHistory::new()
        }))
    }

    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be read.
    pub fn score_for(&self, date: QuizDate) -> Result<Option<u32>, LocalStoreError> {
        Ok(self.history()?.get(&date).copied())
    }

    /// Record the final score for `date`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be written.
    pub fn record_score(&self, date: QuizDate, score: u32) -> Result<(), LocalStoreError> {
        let mut history = self.history()?;
        history.insert(date, score);
        let raw = serde_json::to_string(&history)?;
        self.store.set(HISTORY_KEY, &raw)
    }

    /// Sum of every locally recorded daily score.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be read.
    pub fn local_total(&self) -> Result<u64, LocalStoreError> {
        Ok(self.history()?.values().map(|s| u64::from(*s)).sum())
    }

    /// The saved checkpoint, if any. A corrupt blob reads as none.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be read.
    pub fn checkpoint(&self) -> Result<Option<Checkpoint>, LocalStoreError> {
        let Some(raw) = self.store.get(PROGRESS_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(err) => {
                warn!(%err, key = PROGRESS_KEY, "ignoring unreadable checkpoint");
                Ok(None)
            }
        }
    }

    /// The checkpoint for `date`. Checkpoints from other days are dropped.
    ///
    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be read or cleaned up.
    pub fn checkpoint_for(&self, date: QuizDate) -> Result<Option<Checkpoint>, LocalStoreError> {
        match self.checkpoint()? {
            Some(checkpoint) if checkpoint.date == date => Ok(Some(checkpoint)),
            Some(stale) => {
                tracing::debug!(date = %stale.date, "dropping checkpoint from another day");
                self.clear_checkpoint()?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be written.
    pub fn save_checkpoint(&self, checkpoint: &Checkpoint) -> Result<(), LocalStoreError> {
        let raw = serde_json::to_string(checkpoint)?;
        self.store.set(PROGRESS_KEY, &raw)
    }

    /// # Errors
    ///
    /// Returns `LocalStoreError` if the store cannot be written.
    pub fn clear_checkpoint(&self) -> Result<(), LocalStoreError> {
        self.store.remove(PROGRESS_KEY)
    }
}
