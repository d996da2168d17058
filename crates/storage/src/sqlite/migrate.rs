use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies schema versions that are not yet recorded in `schema_migrations`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: question bank, ledgers, leaderboard and its rollup trigger.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS daily_quiz (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    question TEXT NOT NULL,
                    options_json TEXT NOT NULL,
                    correct_id TEXT NOT NULL,
                    date TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_attempts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    date TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_history (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id TEXT NOT NULL,
                    date TEXT NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    created_at TEXT NOT NULL,
                    UNIQUE (user_id, date)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS leaderboard (
                    user_id TEXT PRIMARY KEY,
                    username TEXT NOT NULL DEFAULT 'Player',
                    avatar_url TEXT,
                    total_score INTEGER NOT NULL DEFAULT 0 CHECK (total_score >= 0),
                    games_played INTEGER NOT NULL DEFAULT 0 CHECK (games_played >= 0),
                    last_played_at TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TRIGGER IF NOT EXISTS quiz_history_rollup
                AFTER INSERT ON quiz_history
                BEGIN
                    INSERT OR IGNORE INTO leaderboard (user_id) VALUES (NEW.user_id);
                    UPDATE leaderboard SET
                        total_score = (
                            SELECT COALESCE(SUM(score), 0) FROM quiz_history WHERE user_id = NEW.user_id
                        ),
                        games_played = (
                            SELECT COUNT(*) FROM quiz_history WHERE user_id = NEW.user_id
                        ),
                        last_played_at = NEW.created_at
                    WHERE user_id = NEW.user_id;
                END;
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_daily_quiz_date ON daily_quiz(date);")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_quiz_attempts_created ON quiz_attempts(created_at);",
        )
        .execute(&mut *tx)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_leaderboard_total ON leaderboard(total_score DESC);",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)")
            .bind(1_i64)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(version = 1, "applied sqlite migration");
    }

    Ok(())
}
