use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{
    LeaderboardEntry, Player, Question, QuestionId, QuizAttempt, QuizDate, QuizHistoryEntry,
    UserId, ValidatedQuestion,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::changes::{ChangeFeed, ChangeKind, Table};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint rejected the write.
    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Conflict)
    }
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

/// Dated question bank.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a new question and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn insert_question(&self, question: &ValidatedQuestion) -> Result<Question, StorageError>;

    /// Replace every field of an existing question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn update_question(&self, question: &Question) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown.
    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError>;

    /// Questions scheduled for exactly `date`, by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn questions_on(&self, date: QuizDate) -> Result<Vec<Question>, StorageError>;

    /// Questions dated strictly before `date`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn questions_before(&self, date: QuizDate) -> Result<Vec<Question>, StorageError>;

    /// Every question, date descending then id ascending.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;
}

/// Anonymous attempt ledger.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the attempt cannot be stored.
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<(), StorageError>;

    /// Attempts created at or after `since` (all when `None`), oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_attempts(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<QuizAttempt>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn count_attempts(&self) -> Result<u64, StorageError>;
}

/// Per-user score ledger. At most one row per `(user, date)`.
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Insert a row and recompute the user's leaderboard totals from their history.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the user already has a row for that date.
    async fn insert_history(&self, entry: &QuizHistoryEntry) -> Result<(), StorageError>;

    /// Rows for one user, oldest date first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn history_for(&self, user: UserId) -> Result<Vec<QuizHistoryEntry>, StorageError>;
}

/// Career leaderboard. Totals are derived from history; callers only touch profiles.
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// Create the row or refresh its profile fields. Totals are left alone.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be stored.
    async fn register_player(&self, player: &Player) -> Result<(), StorageError>;

    /// Highest totals first, ties broken by username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn top_entries(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn entry_for(&self, user: UserId) -> Result<Option<LeaderboardEntry>, StorageError>;

    /// Every row, in the same order as `top_entries`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError>;
}

pub(crate) fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> std::cmp::Ordering {
    b.total_score
        .cmp(&a.total_score)
        .then_with(|| a.username.cmp(&b.username))
}

//
// ─── IN-MEMORY ADAPTER ─────────────────────────────────────────────────────────
//

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<BTreeMap<QuestionId, Question>>>,
    next_question_id: Arc<Mutex<u64>>,
    attempts: Arc<Mutex<Vec<QuizAttempt>>>,
    history: Arc<Mutex<HashMap<(UserId, QuizDate), QuizHistoryEntry>>>,
    leaderboard: Arc<Mutex<HashMap<UserId, LeaderboardEntry>>>,
    feed: ChangeFeed,
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository publishing its writes on an existing feed.
    #[must_use]
    pub fn with_feed(feed: ChangeFeed) -> Self {
        Self {
            feed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    fn sorted_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let guard = self.leaderboard.lock().map_err(poisoned)?;
        let mut rows: Vec<_> = guard.values().cloned().collect();
        rows.sort_by(leaderboard_order);
        Ok(rows)
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(&self, question: &ValidatedQuestion) -> Result<Question, StorageError> {
        let id = {
            let mut next = self.next_question_id.lock().map_err(poisoned)?;
            *next += 1;
            QuestionId::new(*next)
        };
        let stored = question.clone().assign_id(id);
        self.questions
            .lock()
            .map_err(poisoned)?
            .insert(id, stored.clone());
        self.feed.publish(Table::Questions, ChangeKind::Insert);
        Ok(stored)
    }

    async fn update_question(&self, question: &Question) -> Result<(), StorageError> {
        {
            let mut guard = self.questions.lock().map_err(poisoned)?;
            let slot = guard.get_mut(&question.id).ok_or(StorageError::NotFound)?;
            *slot = question.clone();
        }
        self.feed.publish(Table::Questions, ChangeKind::Update);
        Ok(())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let removed = self.questions.lock().map_err(poisoned)?.remove(&id);
        if removed.is_none() {
            return Err(StorageError::NotFound);
        }
        self.feed.publish(Table::Questions, ChangeKind::Delete);
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Question, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        guard.get(&id).cloned().ok_or(StorageError::NotFound)
    }

    async fn questions_on(&self, date: QuizDate) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.values().filter(|q| q.date == date).cloned().collect())
    }

    async fn questions_before(&self, date: QuizDate) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        let mut found: Vec<_> = guard.values().filter(|q| q.date < date).cloned().collect();
        found.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        let mut all: Vec<_> = guard.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn record_attempt(&self, attempt: &QuizAttempt) -> Result<(), StorageError> {
        self.attempts.lock().map_err(poisoned)?.push(attempt.clone());
        self.feed.publish(Table::Attempts, ChangeKind::Insert);
        Ok(())
    }

    async fn list_attempts(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<QuizAttempt>, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        let mut found: Vec<_> = guard
            .iter()
            .filter(|a| since.is_none_or(|cutoff| a.created_at >= cutoff))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.created_at);
        Ok(found)
    }

    async fn count_attempts(&self) -> Result<u64, StorageError> {
        let guard = self.attempts.lock().map_err(poisoned)?;
        Ok(guard.len() as u64)
    }
}

#[async_trait]
impl HistoryRepository for InMemoryRepository {
    async fn insert_history(&self, entry: &QuizHistoryEntry) -> Result<(), StorageError> {
        let (total, games) = {
            let mut guard = self.history.lock().map_err(poisoned)?;
            let key = (entry.user_id, entry.date);
            if guard.contains_key(&key) {
                return Err(StorageError::Conflict);
            }
            guard.insert(key, entry.clone());
            guard
                .values()
                .filter(|row| row.user_id == entry.user_id)
                .fold((0_u64, 0_u32), |(total, games), row| {
                    (total + u64::from(row.score), games + 1)
                })
        };

        {
            let mut board = self.leaderboard.lock().map_err(poisoned)?;
            let row = board
                .entry(entry.user_id)
                .or_insert_with(|| LeaderboardEntry {
                    user_id: entry.user_id,
                    username: Player::DEFAULT_USERNAME.to_string(),
                    avatar_url: None,
                    total_score: 0,
                    games_played: 0,
                    last_played_at: None,
                });
            row.total_score = total;
            row.games_played = games;
            row.last_played_at = Some(entry.created_at);
        }

        self.feed.publish(Table::History, ChangeKind::Insert);
        self.feed.publish(Table::Leaderboard, ChangeKind::Update);
        Ok(())
    }

    async fn history_for(&self, user: UserId) -> Result<Vec<QuizHistoryEntry>, StorageError> {
        let guard = self.history.lock().map_err(poisoned)?;
        let mut rows: Vec<_> = guard
            .values()
            .filter(|row| row.user_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.date);
        Ok(rows)
    }
}

#[async_trait]
impl LeaderboardRepository for InMemoryRepository {
    async fn register_player(&self, player: &Player) -> Result<(), StorageError> {
        let kind = {
            let mut board = self.leaderboard.lock().map_err(poisoned)?;
            match board.get_mut(&player.user_id) {
                Some(row) => {
                    row.username.clone_from(&player.username);
                    row.avatar_url.clone_from(&player.avatar_url);
                    ChangeKind::Update
                }
                None => {
                    board.insert(
                        player.user_id,
                        LeaderboardEntry {
                            user_id: player.user_id,
                            username: player.username.clone(),
                            avatar_url: player.avatar_url.clone(),
                            total_score: 0,
                            games_played: 0,
                            last_played_at: None,
                        },
                    );
                    ChangeKind::Insert
                }
            }
        };
        self.feed.publish(Table::Leaderboard, kind);
        Ok(())
    }

    async fn top_entries(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let mut rows = self.sorted_entries()?;
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn entry_for(&self, user: UserId) -> Result<Option<LeaderboardEntry>, StorageError> {
        let board = self.leaderboard.lock().map_err(poisoned)?;
        Ok(board.get(&user).cloned())
    }

    async fn list_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        self.sorted_entries()
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub history: Arc<dyn HistoryRepository>,
    pub leaderboard: Arc<dyn LeaderboardRepository>,
    pub changes: ChangeFeed,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let changes = repo.feed().clone();
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo.clone());
        let attempts: Arc<dyn AttemptRepository> = Arc::new(repo.clone());
        let history: Arc<dyn HistoryRepository> = Arc::new(repo.clone());
        let leaderboard: Arc<dyn LeaderboardRepository> = Arc::new(repo);
        Self {
            questions,
            attempts,
            history,
            leaderboard,
            changes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{OptionId, QuestionDraft};
    use quiz_core::time::fixed_now;

    fn date(day: u32) -> QuizDate {
        QuizDate::from_ymd(2025, 11, day).unwrap()
    }

    fn draft(text: &str, day: u32) -> ValidatedQuestion {
        QuestionDraft::lettered(text, ["Yes", "No"], OptionId::parse("a").unwrap(), date(day))
            .validate()
            .unwrap()
    }

    #[tokio::test]
    async fn questions_are_partitioned_by_date() {
        let repo = InMemoryRepository::new();
        let first = repo.insert_question(&draft("Q1", 28)).await.unwrap();
        repo.insert_question(&draft("Q2", 29)).await.unwrap();
        repo.insert_question(&draft("Q3", 29)).await.unwrap();

        assert_eq!(repo.questions_on(date(29)).await.unwrap().len(), 2);
        let before = repo.questions_before(date(29)).await.unwrap();
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].id, first.id);

        let all = repo.list_questions().await.unwrap();
        assert_eq!(all[0].date, date(29));
        assert_eq!(all[2].id, first.id);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_question_is_not_found() {
        let repo = InMemoryRepository::new();
        let mut q = repo.insert_question(&draft("Q1", 28)).await.unwrap();
        q.text = "Edited".into();
        repo.update_question(&q).await.unwrap();
        assert_eq!(repo.get_question(q.id).await.unwrap().text, "Edited");

        repo.delete_question(q.id).await.unwrap();
        assert!(matches!(
            repo.delete_question(q.id).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.update_question(&q).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn history_insert_rolls_up_leaderboard() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        repo.register_player(&Player::new(user, "Sarah", None))
            .await
            .unwrap();

        repo.insert_history(&QuizHistoryEntry::new(user, date(28), 40_000, fixed_now()))
            .await
            .unwrap();
        repo.insert_history(&QuizHistoryEntry::new(user, date(29), 50_500, fixed_now()))
            .await
            .unwrap();

        let entry = repo.entry_for(user).await.unwrap().unwrap();
        assert_eq!(entry.username, "Sarah");
        assert_eq!(entry.total_score, 90_500);
        assert_eq!(entry.games_played, 2);
    }

    #[tokio::test]
    async fn duplicate_history_is_conflict_and_leaves_totals() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let row = QuizHistoryEntry::new(user, date(29), 50_500, fixed_now());
        repo.insert_history(&row).await.unwrap();

        let err = repo.insert_history(&row).await.unwrap_err();
        assert!(err.is_conflict());
        let entry = repo.entry_for(user).await.unwrap().unwrap();
        assert_eq!(entry.total_score, 50_500);
        assert_eq!(entry.games_played, 1);
        assert_eq!(entry.username, Player::DEFAULT_USERNAME);
    }

    #[tokio::test]
    async fn register_player_keeps_totals() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        repo.insert_history(&QuizHistoryEntry::new(user, date(29), 10_000, fixed_now()))
            .await
            .unwrap();
        repo.register_player(&Player::new(user, "Renamed", Some("https://a/b.png".into())))
            .await
            .unwrap();

        let entry = repo.entry_for(user).await.unwrap().unwrap();
        assert_eq!(entry.username, "Renamed");
        assert_eq!(entry.total_score, 10_000);
    }

    #[tokio::test]
    async fn top_entries_orders_by_total_and_limits() {
        let repo = InMemoryRepository::new();
        for (name, score) in [("low", 1_000), ("high", 30_000), ("mid", 20_000)] {
            let user = UserId::random();
            repo.register_player(&Player::new(user, name, None))
                .await
                .unwrap();
            repo.insert_history(&QuizHistoryEntry::new(user, date(29), score, fixed_now()))
                .await
                .unwrap();
        }

        let top = repo.top_entries(2).await.unwrap();
        let names: Vec<_> = top.iter().map(|e| e.username.as_str()).collect();
        assert_eq!(names, ["high", "mid"]);
        assert_eq!(repo.list_entries().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn writes_publish_changes() {
        let repo = InMemoryRepository::new();
        let mut rx = repo.feed().subscribe();
        repo.insert_history(&QuizHistoryEntry::new(
            UserId::random(),
            date(29),
            10,
            fixed_now(),
        ))
        .await
        .unwrap();

        assert_eq!(rx.recv().await.unwrap().table, Table::History);
        assert_eq!(rx.recv().await.unwrap().table, Table::Leaderboard);
    }

    #[tokio::test]
    async fn attempts_filter_by_cutoff() {
        let repo = InMemoryRepository::new();
        let now = fixed_now();
        repo.record_attempt(&QuizAttempt::new(100, date(1), now - chrono::Duration::days(40)))
            .await
            .unwrap();
        repo.record_attempt(&QuizAttempt::new(200, date(29), now))
            .await
            .unwrap();

        assert_eq!(repo.count_attempts().await.unwrap(), 2);
        let recent = repo
            .list_attempts(Some(now - chrono::Duration::days(30)))
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].score, 200);
    }
}
