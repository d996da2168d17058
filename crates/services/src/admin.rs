use std::sync::Arc;

use quiz_core::model::{Question, QuestionDraft, QuestionId, QuizDate};
use storage::repository::QuestionRepository;
use tracing::info;

use crate::error::AdminError;

/// Questions sharing a scheduled date, as shown in the editor sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFolder {
    pub date: QuizDate,
    pub questions: Vec<Question>,
}

/// Case-insensitive match on question text or the `YYYY-MM-DD` date.
///
/// A blank query matches everything.
#[must_use]
pub fn matches_query(question: &Question, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    question.text.to_lowercase().contains(&query) || question.date.to_string().contains(&query)
}

/// Group questions by date, newest date first and questions by id.
#[must_use]
pub fn group_by_date(questions: impl IntoIterator<Item = Question>) -> Vec<DateFolder> {
    let mut folders: Vec<DateFolder> = Vec::new();
    let mut sorted: Vec<_> = questions.into_iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
    for question in sorted {
        match folders.last_mut() {
            Some(folder) if folder.date == question.date => folder.questions.push(question),
            _ => folders.push(DateFolder {
                date: question.date,
                questions: vec![question],
            }),
        }
    }
    folders
}

/// Question bank editing for the admin panel.
#[derive(Clone)]
pub struct AdminService {
    questions: Arc<dyn QuestionRepository>,
}

impl AdminService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>) -> Self {
        Self { questions }
    }

    /// # Errors
    ///
    /// Returns `AdminError::Question` for blank fields and `AdminError::Storage`
    /// if the question cannot be saved.
    pub async fn create(&self, draft: QuestionDraft) -> Result<Question, AdminError> {
        let validated = draft.validate()?;
        let question = self.questions.insert_question(&validated).await?;
        info!(id = %question.id, date = %question.date, "question created");
        Ok(question)
    }

    /// Replace the question's content with `draft`.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Question` for blank fields and `AdminError::Storage`
    /// if the id is unknown or the save fails.
    pub async fn update(&self, id: QuestionId, draft: QuestionDraft) -> Result<Question, AdminError> {
        let question = draft.validate()?.assign_id(id);
        self.questions.update_question(&question).await?;
        info!(%id, "question updated");
        Ok(question)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Storage` if the id is unknown or the delete fails.
    pub async fn delete(&self, id: QuestionId) -> Result<(), AdminError> {
        self.questions.delete_question(id).await?;
        info!(%id, "question deleted");
        Ok(())
    }

    /// Move a question to another day, keeping everything else.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` if the id is unknown or the save fails.
    pub async fn reassign_date(&self, id: QuestionId, date: QuizDate) -> Result<Question, AdminError> {
        let mut question = self.questions.get_question(id).await?;
        question.date = date;
        self.questions.update_question(&question).await?;
        info!(%id, %date, "question moved");
        Ok(question)
    }

    /// # Errors
    ///
    /// Returns `AdminError::Storage` if questions cannot be loaded.
    pub async fn get(&self, id: QuestionId) -> Result<Question, AdminError> {
        Ok(self.questions.get_question(id).await?)
    }

    /// Questions matching `query`, grouped into date folders.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` if questions cannot be loaded.
    pub async fn folders(&self, query: &str) -> Result<Vec<DateFolder>, AdminError> {
        let all = self.questions.list_questions().await?;
        Ok(group_by_date(
            all.into_iter().filter(|q| matches_query(q, query)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{OptionId, QuestionError};
    use storage::repository::{InMemoryRepository, StorageError};

    fn day(d: u32) -> QuizDate {
        QuizDate::from_ymd(2025, 11, d).unwrap()
    }

    fn draft(text: &str, d: u32) -> QuestionDraft {
        QuestionDraft::lettered(text, ["Yes", "No"], OptionId::parse("a").unwrap(), day(d))
    }

    fn service() -> AdminService {
        AdminService::new(Arc::new(InMemoryRepository::new()))
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let svc = service();
        let err = svc.create(draft("   ", 29)).await.unwrap_err();
        assert!(matches!(err, AdminError::Question(QuestionError::EmptyText)));
    }

    #[tokio::test]
    async fn folders_group_newest_first_and_filter() {
        let svc = service();
        svc.create(draft("Rotator cuff", 28)).await.unwrap();
        svc.create(draft("Knee ligaments", 29)).await.unwrap();
        svc.create(draft("Shoulder impingement", 29)).await.unwrap();

        let folders = svc.folders("").await.unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].date, day(29));
        assert_eq!(folders[0].questions.len(), 2);

        let knee = svc.folders("KNEE").await.unwrap();
        assert_eq!(knee.len(), 1);
        assert_eq!(knee[0].questions[0].text, "Knee ligaments");

        let by_date = svc.folders("2025-11-28").await.unwrap();
        assert_eq!(by_date.len(), 1);
        assert_eq!(by_date[0].questions[0].text, "Rotator cuff");
    }

    #[tokio::test]
    async fn reassign_moves_between_folders() {
        let svc = service();
        let q = svc.create(draft("Movable", 28)).await.unwrap();
        let moved = svc.reassign_date(q.id, day(30)).await.unwrap();
        assert_eq!(moved.date, day(30));
        assert_eq!(svc.get(q.id).await.unwrap().date, day(30));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let svc = service();
        let q = svc.create(draft("Old", 28)).await.unwrap();
        let updated = svc.update(q.id, draft("New", 28)).await.unwrap();
        assert_eq!(updated.text, "New");

        svc.delete(q.id).await.unwrap();
        assert!(matches!(
            svc.delete(q.id).await,
            Err(AdminError::Storage(StorageError::NotFound))
        ));
    }
}
