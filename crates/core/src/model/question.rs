use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::date::QuizDate;
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least {min} options, got {got}")]
    TooFewOptions { min: usize, got: usize },

    #[error("option {0} has no text")]
    EmptyOption(OptionId),

    #[error("option {0} appears more than once")]
    DuplicateOption(OptionId),

    #[error("correct answer {0} is not one of the options")]
    UnknownCorrectOption(OptionId),

    #[error("invalid option id: {0:?}")]
    InvalidOptionId(String),
}

//
// ─── OPTION ID ─────────────────────────────────────────────────────────────────
//

/// Letter identifying an answer option (`a`, `b`, `c`, ...).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OptionId(char);

impl OptionId {
    pub const FIRST: OptionId = OptionId('a');

    /// Parses an option letter. Upper-case letters are folded to lower case.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidOptionId` unless the input is a single ASCII letter.
    pub fn parse(raw: &str) -> Result<Self, QuestionError> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => Ok(Self(ch.to_ascii_lowercase())),
            _ => Err(QuestionError::InvalidOptionId(raw.to_string())),
        }
    }

    /// Option id for the zero-based position (`0 -> a`). `None` past `z`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|i| *i < 26)
            .map(|i| Self(char::from(b'a' + i)))
    }

    #[must_use]
    pub fn as_char(&self) -> char {
        self.0
    }

    /// Upper-case label shown next to the option (`A`, `B`, ...).
    #[must_use]
    pub fn label(&self) -> char {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Debug for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionId({})", self.0)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for OptionId {
    type Error = QuestionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OptionId> for String {
    fn from(value: OptionId) -> Self {
        value.0.to_string()
    }
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub text: String,
}

impl AnswerOption {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Unvalidated question as typed into the editor or parsed from a seed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub options: Vec<AnswerOption>,
    pub correct_id: OptionId,
    pub date: QuizDate,
}

impl QuestionDraft {
    pub const MIN_OPTIONS: usize = 2;

    /// Builds a draft from option texts, lettering them `a`, `b`, `c`, ...
    ///
    /// Options past `z` are dropped.
    #[must_use]
    pub fn lettered<S: Into<String>>(
        text: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        correct_id: OptionId,
        date: QuizDate,
    ) -> Self {
        let options = options
            .into_iter()
            .enumerate()
            .filter_map(|(idx, text)| OptionId::from_index(idx).map(|id| AnswerOption::new(id, text)))
            .collect();
        Self {
            text: text.into(),
            options,
            correct_id,
            date,
        }
    }

    /// Presence-only validation.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionError` found.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if self.options.len() < Self::MIN_OPTIONS {
            return Err(QuestionError::TooFewOptions {
                min: Self::MIN_OPTIONS,
                got: self.options.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.options.len());
        let mut options = Vec::with_capacity(self.options.len());
        for option in self.options {
            if !seen.insert(option.id) {
                return Err(QuestionError::DuplicateOption(option.id));
            }
            let trimmed = option.text.trim();
            if trimmed.is_empty() {
                return Err(QuestionError::EmptyOption(option.id));
            }
            options.push(AnswerOption::new(option.id, trimmed));
        }

        if !seen.contains(&self.correct_id) {
            return Err(QuestionError::UnknownCorrectOption(self.correct_id));
        }

        Ok(ValidatedQuestion {
            text,
            options,
            correct_id: self.correct_id,
            date: self.date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub text: String,
    pub options: Vec<AnswerOption>,
    pub correct_id: OptionId,
    pub date: QuizDate,
}

impl ValidatedQuestion {
    #[must_use]
    pub fn assign_id(self, id: QuestionId) -> Question {
        Question {
            id,
            text: self.text,
            options: self.options,
            correct_id: self.correct_id,
            date: self.date,
        }
    }
}

/// A dated multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<AnswerOption>,
    pub correct_id: OptionId,
    pub date: QuizDate,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, option: OptionId) -> bool {
        self.correct_id == option
    }

    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|opt| opt.id == id)
    }

    /// Back to an editable draft, e.g. to change a single field and re-validate.
    #[must_use]
    pub fn to_draft(&self) -> QuestionDraft {
        QuestionDraft {
            text: self.text.clone(),
            options: self.options.clone(),
            correct_id: self.correct_id,
            date: self.date,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
