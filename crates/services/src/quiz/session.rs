use chrono::{DateTime, Utc};
use quiz_core::model::{OptionId, Question, QuizDate};
use quiz_core::scoring;

use super::progress::QuizProgress;
use crate::error::QuizError;

/// Which quiz is being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    /// The scheduled questions of one calendar day. Gated and recorded.
    Daily(QuizDate),
    /// Replay of past questions. Scored for display only.
    Practice,
}

impl QuizMode {
    #[must_use]
    pub fn daily_date(&self) -> Option<QuizDate> {
        match self {
            QuizMode::Daily(date) => Some(*date),
            QuizMode::Practice => None,
        }
    }
}

/// What happened when an option was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub selected: OptionId,
    pub correct_id: OptionId,
    pub is_correct: bool,
    pub awarded: u32,
    pub score: u32,
}

/// Result of moving past an answered question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next { index: usize },
    Finished { score: u32 },
}

/// In-memory quiz run over a fixed list of questions.
///
/// Steps through the questions one at a time. Each question accepts exactly
/// one answer; `advance` then moves the cursor or finishes the run.
#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: QuizMode,
    questions: Vec<Question>,
    current: usize,
    score: u32,
    selected: Option<OptionId>,
    presented_at: DateTime<Utc>,
    finished: bool,
}

impl QuizSession {
    /// Start a run with the first question presented at `presented_at`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` if there are no questions.
    pub fn new(
        mode: QuizMode,
        questions: Vec<Question>,
        presented_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        Ok(Self {
            mode,
            questions,
            current: 0,
            score: 0,
            selected: None,
            presented_at,
            finished: false,
        })
    }

    /// Jump forward to a saved position. Positions at or behind the cursor are ignored.
    ///
    /// Indexes past the end land on the last question.
    pub fn resume(&mut self, index: usize, score: u32, presented_at: DateTime<Utc>) {
        let index = index.min(self.questions.len() - 1);
        if index <= self.current || self.finished {
            return;
        }
        self.current = index;
        self.score = score;
        self.selected = None;
        self.presented_at = presented_at;
    }

    #[must_use]
    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.finished {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn selected(&self) -> Option<OptionId> {
        self.selected
    }

    #[must_use]
    pub fn presented_at(&self) -> DateTime<Utc> {
        self.presented_at
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        QuizProgress {
            index: self.current,
            total: self.total(),
            score: self.score,
            is_complete: self.finished,
        }
    }

    /// Pick an option for the current question and score it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` once finished, `QuizError::AlreadyAnswered`
    /// if an option is already selected, and `QuizError::UnknownOption` for an
    /// option the question does not have.
    pub fn answer(
        &mut self,
        option: OptionId,
        answered_at: DateTime<Utc>,
    ) -> Result<AnswerOutcome, QuizError> {
        let question = self.current_question().ok_or(QuizError::Completed)?;
        if self.selected.is_some() {
            return Err(QuizError::AlreadyAnswered);
        }
        if question.option(option).is_none() {
            return Err(QuizError::UnknownOption(option));
        }

        let is_correct = question.is_correct(option);
        let correct_id = question.correct_id;
        let awarded = scoring::award(is_correct, answered_at - self.presented_at);

        self.selected = Some(option);
        self.score = self.score.saturating_add(awarded);

        Ok(AnswerOutcome {
            selected: option,
            correct_id,
            is_correct,
            awarded,
            score: self.score,
        })
    }

    /// Move past the answered question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Completed` once finished and `QuizError::NotAnswered`
    /// if the current question has no selection yet.
    pub fn advance(&mut self, presented_at: DateTime<Utc>) -> Result<Advance, QuizError> {
        if self.finished {
            return Err(QuizError::Completed);
        }
        if self.selected.is_none() {
            return Err(QuizError::NotAnswered);
        }

        if self.is_last() {
            self.finished = true;
            return Ok(Advance::Finished { score: self.score });
        }

        self.current += 1;
        self.selected = None;
        self.presented_at = presented_at;
        Ok(Advance::Next {
            index: self.current,
        })
    }
}
