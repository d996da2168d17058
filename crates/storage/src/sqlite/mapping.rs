use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerOption, LeaderboardEntry, OptionId, Question, QuestionId, QuizAttempt, QuizDate,
    QuizHistoryEntry, UserId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Unique-constraint violations become `Conflict`; everything else is a connection error.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

pub(crate) fn conn_err(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    u64::try_from(v)
        .map(QuestionId::new)
        .map_err(|_| StorageError::Serialization("question_id sign overflow".into()))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

pub(crate) fn options_to_json(options: &[AnswerOption]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

fn date_from_row(row: &SqliteRow, column: &str) -> Result<QuizDate, StorageError> {
    row.try_get::<String, _>(column)
        .map_err(ser)?
        .parse::<QuizDate>()
        .map_err(ser)
}

fn user_from_row(row: &SqliteRow) -> Result<UserId, StorageError> {
    row.try_get::<String, _>("user_id")
        .map_err(ser)?
        .parse::<UserId>()
        .map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let options_json: String = row.try_get("options_json").map_err(ser)?;
    let options: Vec<AnswerOption> = serde_json::from_str(&options_json).map_err(ser)?;
    let correct_id = OptionId::parse(&row.try_get::<String, _>("correct_id").map_err(ser)?)
        .map_err(ser)?;
    Ok(Question {
        id: question_id_from_i64(row.try_get("id").map_err(ser)?)?,
        text: row.try_get("question").map_err(ser)?,
        options,
        correct_id,
        date: date_from_row(row, "date")?,
    })
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<QuizAttempt, StorageError> {
    Ok(QuizAttempt {
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        date: date_from_row(row, "date")?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_history_row(row: &SqliteRow) -> Result<QuizHistoryEntry, StorageError> {
    Ok(QuizHistoryEntry {
        user_id: user_from_row(row)?,
        date: date_from_row(row, "date")?,
        score: u32_from_i64("score", row.try_get("score").map_err(ser)?)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

pub(crate) fn map_leaderboard_row(row: &SqliteRow) -> Result<LeaderboardEntry, StorageError> {
    let total: i64 = row.try_get("total_score").map_err(ser)?;
    Ok(LeaderboardEntry {
        user_id: user_from_row(row)?,
        username: row.try_get("username").map_err(ser)?,
        avatar_url: row.try_get("avatar_url").map_err(ser)?,
        total_score: u64::try_from(total)
            .map_err(|_| StorageError::Serialization("total_score sign overflow".into()))?,
        games_played: u32_from_i64("games_played", row.try_get("games_played").map_err(ser)?)?,
        last_played_at: row
            .try_get::<Option<DateTime<Utc>>, _>("last_played_at")
            .map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_ids_reject_negative_rows() {
        assert!(question_id_from_i64(-1).is_err());
        assert_eq!(question_id_from_i64(7).unwrap().value(), 7);
    }

    #[test]
    fn options_serialize_as_letter_objects() {
        let options = vec![
            AnswerOption::new(OptionId::parse("a").unwrap(), "Yes"),
            AnswerOption::new(OptionId::parse("b").unwrap(), "No"),
        ];
        let json = options_to_json(&options).unwrap();
        assert_eq!(json, r#"[{"id":"a","text":"Yes"},{"id":"b","text":"No"}]"#);
    }
}
