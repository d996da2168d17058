use quiz_core::model::{Question, QuestionId, QuizDate, ValidatedQuestion};

use super::SqliteRepository;
use super::mapping::{
    conn_err, map_question_row, options_to_json, question_id_from_i64, question_id_to_i64,
    write_err,
};
use crate::changes::{ChangeKind, Table};
use crate::repository::{QuestionRepository, StorageError};

const SELECT_COLUMNS: &str = "SELECT id, question, options_json, correct_id, date FROM daily_quiz";

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(&self, question: &ValidatedQuestion) -> Result<Question, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO daily_quiz (question, options_json, correct_id, date)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(&question.text)
        .bind(options_to_json(&question.options)?)
        .bind(question.correct_id.to_string())
        .bind(question.date.to_string())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        let id = question_id_from_i64(res.last_insert_rowid())?;
        self.feed.publish(Table::Questions, ChangeKind::Insert);
        Ok(question.clone().assign_id(id))
    }

    async fn update_question(&self, question: &Question) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE daily_quiz
            SET question = ?1, options_json = ?2, correct_id = ?3, date = ?4
            WHERE id = ?5
            ",
        )
        .bind(&question.text)
        .bind(options_to_json(&question.options)?)
        .bind(question.correct_id.to_string())
        .bind(question.date.to_string())
        .bind(question_id_to_i64(question.id)?)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.feed.publish(Table::Questions, ChangeKind::Update);
        Ok(())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM daily_quiz WHERE id = ?1")
            .bind(question_id_to_i64(id)?)
            .execute(&self.pool)
            .await
            .map_err(conn_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        self.feed.publish(Table::Questions, ChangeKind::Delete);
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(question_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn_err)?
            .ok_or(StorageError::NotFound)?;
        map_question_row(&row)
    }

    async fn questions_on(&self, date: QuizDate) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE date = ?1 ORDER BY id ASC"))
            .bind(date.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(conn_err)?;
        rows.iter().map(map_question_row).collect()
    }

    async fn questions_before(&self, date: QuizDate) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE date < ?1 ORDER BY date DESC, id ASC"
        ))
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;
        rows.iter().map(map_question_row).collect()
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY date DESC, id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(conn_err)?;
        rows.iter().map(map_question_row).collect()
    }
}
