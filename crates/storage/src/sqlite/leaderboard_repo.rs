use quiz_core::model::{LeaderboardEntry, Player, UserId};

use super::SqliteRepository;
use super::mapping::{conn_err, map_leaderboard_row, write_err};
use crate::changes::{ChangeKind, Table};
use crate::repository::{LeaderboardRepository, StorageError};

const SELECT_COLUMNS: &str = r"
    SELECT user_id, username, avatar_url, total_score, games_played, last_played_at
    FROM leaderboard
";

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteRepository {
    async fn register_player(&self, player: &Player) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO leaderboard (user_id, username, avatar_url)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                avatar_url = excluded.avatar_url
            ",
        )
        .bind(player.user_id.to_string())
        .bind(&player.username)
        .bind(player.avatar_url.as_deref())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        self.feed.publish(Table::Leaderboard, ChangeKind::Update);
        Ok(())
    }

    async fn top_entries(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY total_score DESC, username ASC LIMIT ?1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;
        rows.iter().map(map_leaderboard_row).collect()
    }

    async fn entry_for(&self, user: UserId) -> Result<Option<LeaderboardEntry>, StorageError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE user_id = ?1"))
            .bind(user.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn_err)?;
        row.as_ref().map(map_leaderboard_row).transpose()
    }

    async fn list_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} ORDER BY total_score DESC, username ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(conn_err)?;
        rows.iter().map(map_leaderboard_row).collect()
    }
}
