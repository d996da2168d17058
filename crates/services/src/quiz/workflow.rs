use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{OptionId, QuizAttempt, QuizDate, QuizHistoryEntry};
use rand::seq::SliceRandom;
use storage::repository::{AttemptRepository, HistoryRepository, QuestionRepository, StorageError};
use tracing::{debug, error, info};

use super::session::{Advance, AnswerOutcome, QuizMode, QuizSession};
use super::view::QuizView;
use crate::error::QuizError;
use crate::identity::Identity;
use crate::replay_gate::{Checkpoint, ReplayGate};
use crate::Clock;

/// Pause between revealing an answer and showing the next question.
pub const ANSWER_REVEAL_DELAY: Duration = Duration::from_millis(1200);

/// Outcome of loading a quiz.
#[derive(Debug, Clone)]
pub enum QuizStart {
    Ready(QuizSession),
    AlreadyPlayed { date: QuizDate, score: u32 },
    NoQuiz,
}

impl QuizStart {
    #[must_use]
    pub fn view(&self) -> QuizView {
        match self {
            QuizStart::Ready(_) => QuizView::Quiz,
            QuizStart::AlreadyPlayed { score, .. } => QuizView::AlreadyPlayed { score: *score },
            QuizStart::NoQuiz => QuizView::NoQuiz,
        }
    }
}

/// What happened to the per-user ledger when a daily run finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryUpload {
    /// Nobody is signed in; only the local gate was updated.
    Anonymous,
    Uploaded,
    /// The ledger already had a row for this user and date.
    AlreadySynced,
    Failed(String),
}

/// Bookkeeping done when a daily run finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    pub date: QuizDate,
    pub score: u32,
    pub attempt_logged: bool,
    pub history: HistoryUpload,
}

/// Result of `QuizLoopService::advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizStep {
    Next { index: usize },
    Completed(CompletionReport),
    PracticeCompleted { score: u32 },
}

impl QuizStep {
    #[must_use]
    pub fn view(&self) -> QuizView {
        match self {
            QuizStep::Next { .. } => QuizView::Quiz,
            QuizStep::Completed(report) => QuizView::Completed {
                score: report.score,
            },
            QuizStep::PracticeCompleted { score } => QuizView::PracticeCompleted { score: *score },
        }
    }
}

/// Orchestrates quiz start, answering and the bookkeeping around daily runs.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    attempts: Arc<dyn AttemptRepository>,
    history: Arc<dyn HistoryRepository>,
    gate: ReplayGate,
    identity: Identity,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        attempts: Arc<dyn AttemptRepository>,
        history: Arc<dyn HistoryRepository>,
        gate: ReplayGate,
    ) -> Self {
        Self {
            clock,
            questions,
            attempts,
            history,
            gate,
            identity: Identity::Anonymous,
        }
    }

    #[must_use]
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn gate(&self) -> &ReplayGate {
        &self.gate
    }

    #[must_use]
    pub fn today(&self) -> QuizDate {
        self.clock.today()
    }

    /// Load today's quiz, honouring the replay gate and any saved checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` for storage or local store failures.
    pub async fn load_daily(&self) -> Result<QuizStart, QuizError> {
        let today = self.clock.today();
        if let Some(score) = self.gate.score_for(today)? {
            info!(%today, score, "daily quiz already played");
            return Ok(QuizStart::AlreadyPlayed { date: today, score });
        }

        let questions = self.questions.questions_on(today).await?;
        if questions.is_empty() {
            info!(%today, "no questions scheduled");
            return Ok(QuizStart::NoQuiz);
        }

        let now = self.clock.now();
        let mut session = QuizSession::new(QuizMode::Daily(today), questions, now)?;
        if let Some(checkpoint) = self.gate.checkpoint_for(today)? {
            debug!(index = checkpoint.index, score = checkpoint.score, "resuming daily quiz");
            session.resume(checkpoint.index, checkpoint.score, now);
        }
        Ok(QuizStart::Ready(session))
    }

    /// Start a practice run over every question dated before today, shuffled.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if questions cannot be loaded.
    pub async fn start_practice(&self) -> Result<QuizStart, QuizError> {
        let today = self.clock.today();
        let mut questions = self.questions.questions_before(today).await?;
        if questions.is_empty() {
            return Ok(QuizStart::NoQuiz);
        }
        questions.shuffle(&mut rand::rng());
        let session = QuizSession::new(QuizMode::Practice, questions, self.clock.now())?;
        Ok(QuizStart::Ready(session))
    }

    /// Answer the current question. Daily runs checkpoint the next position.
    ///
    /// The session is only updated once the checkpoint is saved, so a failed
    /// write leaves the question unanswered and the call can be repeated.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the answer is rejected or the checkpoint cannot be saved.
    pub fn answer_current(
        &self,
        session: &mut QuizSession,
        option: OptionId,
    ) -> Result<AnswerOutcome, QuizError> {
        let mut staged = session.clone();
        let outcome = staged.answer(option, self.clock.now())?;
        if let QuizMode::Daily(date) = staged.mode() {
            if !staged.is_last() {
                self.gate
                    .save_checkpoint(&Checkpoint {
                        date,
                        index: staged.index() + 1,
                        score: outcome.score,
                    })
                    .inspect_err(|err| error!(%err, %date, "failed to save quiz checkpoint"))?;
            }
        }
        *session = staged;
        Ok(outcome)
    }

    /// Move to the next question, finishing the run after the last one.
    ///
    /// A daily run only counts as finished once its score is in the local
    /// gate; if that write fails the session stays on the last question and
    /// `advance` can be called again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if the session cannot advance or the local gate
    /// cannot be written.
    pub async fn advance(&self, session: &mut QuizSession) -> Result<QuizStep, QuizError> {
        let mut staged = session.clone();
        let step = match staged.advance(self.clock.now())? {
            Advance::Next { index } => QuizStep::Next { index },
            Advance::Finished { score } => match staged.mode() {
                QuizMode::Daily(date) => QuizStep::Completed(self.finish_daily(date, score).await?),
                QuizMode::Practice => QuizStep::PracticeCompleted { score },
            },
        };
        *session = staged;
        Ok(step)
    }

    async fn finish_daily(&self, date: QuizDate, score: u32) -> Result<CompletionReport, QuizError> {
        self.gate
            .record_score(date, score)
            .and_then(|()| self.gate.clear_checkpoint())
            .inspect_err(|err| error!(%err, %date, "failed to record daily score"))?;

        let now = self.clock.now();
        let attempt_logged = match self
            .attempts
            .record_attempt(&QuizAttempt::new(score, date, now))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                error!(%err, %date, "failed to log quiz attempt");
                false
            }
        };

        let history = match self.identity.player() {
            None => HistoryUpload::Anonymous,
            Some(player) => {
                let entry = QuizHistoryEntry::new(player.user_id, date, score, now);
                match self.history.insert_history(&entry).await {
                    Ok(()) => HistoryUpload::Uploaded,
                    Err(StorageError::Conflict) => {
                        debug!(%date, "history already synced");
                        HistoryUpload::AlreadySynced
                    }
                    Err(err) => {
                        error!(%err, %date, "failed to upload quiz history");
                        HistoryUpload::Failed(err.to_string())
                    }
                }
            }
        };

        info!(%date, score, "daily quiz completed");
        Ok(CompletionReport {
            date,
            score,
            attempt_logged,
            history,
        })
    }
}
