use chrono::{DateTime, Utc};
use quiz_core::model::QuizAttempt;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn_err, map_attempt_row, ser, write_err};
use crate::changes::{ChangeKind, Table};
use crate::repository::{AttemptRepository, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO quiz_attempts (score, date, created_at) VALUES (?1, ?2, ?3)")
            .bind(i64::from(attempt.score))
            .bind(attempt.date.to_string())
            .bind(attempt.created_at)
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        self.feed.publish(Table::Attempts, ChangeKind::Insert);
        Ok(())
    }

    async fn list_attempts(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let rows = match since {
            Some(cutoff) => {
                sqlx::query(
                    r"
                    SELECT score, date, created_at FROM quiz_attempts
                    WHERE created_at >= ?1
                    ORDER BY created_at ASC, id ASC
                    ",
                )
                .bind(cutoff)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT score, date, created_at FROM quiz_attempts ORDER BY created_at ASC, id ASC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(conn_err)?;
        rows.iter().map(map_attempt_row).collect()
    }

    async fn count_attempts(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM quiz_attempts")
            .fetch_one(&self.pool)
            .await
            .map_err(conn_err)?;
        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(ser)
    }
}
