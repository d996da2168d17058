use quiz_core::model::{OptionId, Question, QuestionDraft, QuestionId, QuizDate};
use services::DateFolder;

use crate::views::ViewError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRowVm {
    pub id: QuestionId,
    pub text: String,
    pub answer_label: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateFolderVm {
    pub date: QuizDate,
    pub date_label: String,
    pub count_label: String,
    pub is_today: bool,
    pub questions: Vec<QuestionRowVm>,
}

#[must_use]
pub fn map_date_folders(folders: &[DateFolder], today: QuizDate) -> Vec<DateFolderVm> {
    folders
        .iter()
        .map(|folder| {
            let count = folder.questions.len();
            DateFolderVm {
                date: folder.date,
                date_label: folder.date.to_string(),
                count_label: if count == 1 {
                    "1 question".to_string()
                } else {
                    format!("{count} questions")
                },
                is_today: folder.date == today,
                questions: folder
                    .questions
                    .iter()
                    .map(|question| QuestionRowVm {
                        id: question.id,
                        text: question.text.clone(),
                        answer_label: question
                            .option(question.correct_id)
                            .map_or_else(String::new, |opt| {
                                format!("{}) {}", question.correct_id.label(), opt.text)
                            }),
                    })
                    .collect(),
            }
        })
        .collect()
}

/// Editable state of the question form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionFormVm {
    pub editing: Option<QuestionId>,
    pub text: String,
    pub options: Vec<String>,
    pub correct: usize,
    pub date: String,
}

impl QuestionFormVm {
    pub const DEFAULT_OPTIONS: usize = 4;

    #[must_use]
    pub fn blank(date: QuizDate) -> Self {
        Self {
            editing: None,
            text: String::new(),
            options: vec![String::new(); Self::DEFAULT_OPTIONS],
            correct: 0,
            date: date.to_string(),
        }
    }

    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            editing: Some(question.id),
            text: question.text.clone(),
            options: question.options.iter().map(|opt| opt.text.clone()).collect(),
            correct: question
                .options
                .iter()
                .position(|opt| opt.id == question.correct_id)
                .unwrap_or(0),
            date: question.date.to_string(),
        }
    }

    #[must_use]
    pub fn option_label(index: usize) -> char {
        OptionId::from_index(index).map_or('?', |id| id.label())
    }

    pub fn add_option(&mut self) {
        if OptionId::from_index(self.options.len()).is_some() {
            self.options.push(String::new());
        }
    }

    pub fn remove_option(&mut self, index: usize) {
        if self.options.len() <= QuestionDraft::MIN_OPTIONS || index >= self.options.len() {
            return;
        }
        self.options.remove(index);
        if self.correct >= self.options.len() || self.correct > index {
            self.correct = self.correct.saturating_sub(1);
        }
    }

    /// Letters options by position and parses the date.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Invalid` when the date or correct option is malformed.
    pub fn to_draft(&self) -> Result<QuestionDraft, ViewError> {
        let date: QuizDate = self.date.trim().parse().map_err(|_| ViewError::Invalid)?;
        let correct = OptionId::from_index(self.correct)
            .filter(|_| self.correct < self.options.len())
            .ok_or(ViewError::Invalid)?;
        Ok(QuestionDraft::lettered(
            self.text.clone(),
            self.options.iter().cloned(),
            correct,
            date,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AnswerOption;

    fn date(day: u32) -> QuizDate {
        QuizDate::from_ymd(2025, 11, day).unwrap()
    }

    fn question(id: u64, day: u32) -> Question {
        QuestionDraft::lettered("Largest bone?", ["Tibia", "Femur"], OptionId::parse("b").unwrap(), date(day))
            .validate()
            .unwrap()
            .assign_id(QuestionId::new(id))
    }

    #[test]
    fn folders_show_counts_and_answers() {
        let folders = vec![
            DateFolder {
                date: date(29),
                questions: vec![question(1, 29), question(2, 29)],
            },
            DateFolder {
                date: date(28),
                questions: vec![question(3, 28)],
            },
        ];
        let vms = map_date_folders(&folders, date(29));
        assert_eq!(vms[0].date_label, "2025-11-29");
        assert_eq!(vms[0].count_label, "2 questions");
        assert!(vms[0].is_today);
        assert_eq!(vms[1].count_label, "1 question");
        assert_eq!(vms[0].questions[0].answer_label, "B) Femur");
    }

    #[test]
    fn form_round_trips_an_existing_question() {
        let original = question(7, 28);
        let form = QuestionFormVm::from_question(&original);
        assert_eq!(form.correct, 1);
        let draft = form.to_draft().unwrap();
        assert_eq!(draft.date, date(28));
        assert_eq!(draft.options[1], AnswerOption::new(OptionId::parse("b").unwrap(), "Femur"));
        assert_eq!(draft.validate().unwrap().assign_id(original.id), original);
    }

    #[test]
    fn bad_date_is_invalid() {
        let mut form = QuestionFormVm::blank(date(1));
        form.date = "29/11/2025".to_string();
        assert_eq!(form.to_draft(), Err(ViewError::Invalid));
    }

    #[test]
    fn removing_an_option_keeps_the_correct_answer_in_range() {
        let mut form = QuestionFormVm::blank(date(1));
        form.correct = 3;
        form.remove_option(3);
        assert_eq!(form.options.len(), 3);
        assert_eq!(form.correct, 2);
        form.remove_option(0);
        form.remove_option(0);
        assert_eq!(form.options.len(), QuestionDraft::MIN_OPTIONS);
    }
}
