//! Bulk import of study questions from the plain-text review format:
//!
//! ```text
//! Q: Which muscle is the prime elbow flexor?
//! Options:
//! A) Triceps brachii
//! B) Biceps brachii
//! C) Deltoid
//! Answer: B
//! ---
//! Q: ...
//! ```
//!
//! `Answer:` is optional; without it a correct option is picked at random.

use std::sync::Arc;

use quiz_core::model::{AnswerOption, OptionId, QuestionDraft, QuizDate};
use rand::Rng;
use storage::repository::QuestionRepository;
use tracing::{info, warn};

use crate::error::ImportError;

pub const BLOCK_SEPARATOR: &str = "---";
pub const DEFAULT_PER_DAY: usize = 10;

/// One question block as read from the text, before scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuestion {
    pub text: String,
    pub options: Vec<AnswerOption>,
    pub answer: Option<OptionId>,
}

impl ParsedQuestion {
    /// Draft for `date`, picking a random correct option when none was given.
    #[must_use]
    pub fn into_draft<R: Rng + ?Sized>(self, date: QuizDate, rng: &mut R) -> QuestionDraft {
        let correct_id = match self.answer {
            Some(id) => id,
            None if self.options.is_empty() => OptionId::FIRST,
            None => self.options[rng.random_range(0..self.options.len())].id,
        };
        QuestionDraft {
            text: self.text,
            options: self.options,
            correct_id,
            date,
        }
    }
}

fn parse_option_line(line: &str) -> Option<AnswerOption> {
    let (letter, rest) = line.split_once(')')?;
    let id = OptionId::parse(letter).ok()?;
    let text = rest.trim();
    (!text.is_empty()).then(|| AnswerOption::new(id, text))
}

fn parse_block(block: &str) -> Option<ParsedQuestion> {
    let after_q = &block[block.find("Q:")? + 2..];
    let options_at = after_q.find("Options:")?;
    let text = after_q[..options_at]
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return None;
    }

    let mut options: Vec<AnswerOption> = Vec::new();
    let mut answer = None;
    for line in after_q[options_at + "Options:".len()..].lines().map(str::trim) {
        if let Some(raw) = line.strip_prefix("Answer:") {
            answer = OptionId::parse(raw).ok();
        } else if let Some(option) = parse_option_line(line) {
            if options.iter().all(|o| o.id != option.id) {
                options.push(option);
            }
        }
    }

    if options.len() < QuestionDraft::MIN_OPTIONS {
        return None;
    }
    let answer = answer.filter(|id| options.iter().any(|o| o.id == *id));
    Some(ParsedQuestion {
        text,
        options,
        answer,
    })
}

/// Parse every well-formed block. Malformed blocks are logged and skipped.
#[must_use]
pub fn parse_study_text(input: &str) -> Vec<ParsedQuestion> {
    input
        .split(BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .enumerate()
        .filter_map(|(idx, block)| {
            let parsed = parse_block(block);
            if parsed.is_none() {
                warn!(block = idx + 1, "skipping malformed question block");
            }
            parsed
        })
        .collect()
}

/// Assign dates in batches of `per_day`, starting at `start`.
///
/// # Errors
///
/// Returns `ImportError::InvalidBatchSize` if `per_day` is zero.
pub fn schedule<R: Rng + ?Sized>(
    questions: Vec<ParsedQuestion>,
    start: QuizDate,
    per_day: usize,
    rng: &mut R,
) -> Result<Vec<QuestionDraft>, ImportError> {
    if per_day == 0 {
        return Err(ImportError::InvalidBatchSize);
    }
    Ok(questions
        .into_iter()
        .enumerate()
        .map(|(idx, q)| {
            let day = u64::try_from(idx / per_day).unwrap_or(u64::MAX);
            q.into_draft(start.days_after(day), rng)
        })
        .collect())
}

/// Summary of an import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub first_date: QuizDate,
    pub last_date: QuizDate,
}

/// Seeds the question bank from study text.
#[derive(Clone)]
pub struct ImportService {
    questions: Arc<dyn QuestionRepository>,
}

impl ImportService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// Parse, schedule and insert every question in `input`.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::NothingParsed` when no block is usable, and
    /// storage or validation errors from the first failing insert.
    pub async fn import(
        &self,
        input: &str,
        start: QuizDate,
        per_day: usize,
    ) -> Result<ImportReport, ImportError> {
        let parsed = parse_study_text(input);
        if parsed.is_empty() {
            return Err(ImportError::NothingParsed);
        }
        info!(count = parsed.len(), "parsed study questions");

        let drafts = schedule(parsed, start, per_day, &mut rand::rng())?;
        let mut last_date = start;
        for draft in &drafts {
            let validated = draft.clone().validate()?;
            last_date = validated.date;
            self.questions.insert_question(&validated).await?;
        }

        info!(inserted = drafts.len(), %start, %last_date, "study questions imported");
        Ok(ImportReport {
            inserted: drafts.len(),
            first_date: start,
            last_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryRepository;

    const SAMPLE: &str = "Q: Which muscle is the prime elbow flexor?
Options:
A) Triceps brachii
B) Biceps brachii
C) Deltoid
Answer: B
---
Q: Normal resting heart
rate range?
Options:
A) 60-100 bpm
B) 30-50 bpm
---
this block has no question marker
---
Q: Only one option
Options:
A) Lonely
";

    fn day(d: u32) -> QuizDate {
        QuizDate::from_ymd(2025, 11, d).unwrap()
    }

    #[test]
    fn parses_blocks_and_skips_malformed_ones() {
        let parsed = parse_study_text(SAMPLE);
        assert_eq!(parsed.len(), 2);

        assert_eq!(parsed[0].text, "Which muscle is the prime elbow flexor?");
        assert_eq!(parsed[0].options.len(), 3);
        assert_eq!(parsed[0].options[1].text, "Biceps brachii");
        assert_eq!(parsed[0].answer, Some(OptionId::parse("b").unwrap()));

        assert_eq!(parsed[1].text, "Normal resting heart rate range?");
        assert_eq!(parsed[1].answer, None);
    }

    #[test]
    fn missing_answer_picks_an_existing_option() {
        let parsed = parse_study_text(SAMPLE).remove(1);
        let ids: Vec<_> = parsed.options.iter().map(|o| o.id).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let draft = parsed.into_draft(day(29), &mut rng);
        assert!(ids.contains(&draft.correct_id));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn schedule_batches_by_day() {
        let one = parse_study_text(SAMPLE).remove(0);
        let questions = vec![one; 25];
        let mut rng = StdRng::seed_from_u64(1);
        let drafts = schedule(questions, day(29), 10, &mut rng).unwrap();

        assert_eq!(drafts[0].date, day(29));
        assert_eq!(drafts[9].date, day(29));
        assert_eq!(drafts[10].date, day(30));
        assert_eq!(drafts[24].date, QuizDate::from_ymd(2025, 12, 1).unwrap());
    }

    #[test]
    fn zero_per_day_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            schedule(Vec::new(), day(29), 0, &mut rng),
            Err(ImportError::InvalidBatchSize)
        ));
    }

    #[tokio::test]
    async fn import_inserts_scheduled_questions() {
        let repo = Arc::new(InMemoryRepository::new());
        let svc = ImportService::new(repo.clone());
        let report = svc.import(SAMPLE, day(29), 1).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.last_date, day(30));
        assert_eq!(repo.questions_on(day(30)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn import_of_garbage_fails() {
        let svc = ImportService::new(Arc::new(InMemoryRepository::new()));
        assert!(matches!(
            svc.import("nothing useful", day(29), 10).await,
            Err(ImportError::NothingParsed)
        ));
    }
}
