use quiz_core::model::{QuizHistoryEntry, UserId};

use super::SqliteRepository;
use super::mapping::{conn_err, map_history_row, write_err};
use crate::changes::{ChangeKind, Table};
use crate::repository::{HistoryRepository, StorageError};

#[async_trait::async_trait]
impl HistoryRepository for SqliteRepository {
    async fn insert_history(&self, entry: &QuizHistoryEntry) -> Result<(), StorageError> {
        // The rollup trigger updates the leaderboard row in the same statement.
        sqlx::query(
            r"
            INSERT INTO quiz_history (user_id, date, score, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(entry.user_id.to_string())
        .bind(entry.date.to_string())
        .bind(i64::from(entry.score))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        self.feed.publish(Table::History, ChangeKind::Insert);
        self.feed.publish(Table::Leaderboard, ChangeKind::Update);
        Ok(())
    }

    async fn history_for(&self, user: UserId) -> Result<Vec<QuizHistoryEntry>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, date, score, created_at FROM quiz_history
            WHERE user_id = ?1
            ORDER BY date ASC
            ",
        )
        .bind(user.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;
        rows.iter().map(map_history_row).collect()
    }
}
