use std::sync::Arc;

use quiz_core::model::{LeaderboardEntry, Player, QuizHistoryEntry};
use storage::repository::{HistoryRepository, LeaderboardRepository, StorageError};
use tracing::{debug, info, warn};

use crate::error::LeaderboardError;
use crate::identity::Identity;
use crate::replay_gate::ReplayGate;
use crate::Clock;

/// Number of rows shown on the leaderboard page.
pub const DEFAULT_TOP: u32 = 50;

/// Career total to show for the current player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CareerTotal {
    /// Authoritative total from the leaderboard.
    Remote(u64),
    /// Sum of this device's daily scores, for players without a leaderboard row.
    Local(u64),
}

impl CareerTotal {
    #[must_use]
    pub fn score(&self) -> u64 {
        match self {
            CareerTotal::Remote(score) | CareerTotal::Local(score) => *score,
        }
    }

    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, CareerTotal::Remote(_))
    }
}

/// Result of pushing local daily scores to the per-user ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub uploaded: usize,
    pub already_synced: usize,
    /// Total re-read from the leaderboard after uploading.
    pub total: u64,
}

/// Leaderboard reads and local-to-remote score reconciliation.
#[derive(Clone)]
pub struct LeaderboardService {
    clock: Clock,
    leaderboard: Arc<dyn LeaderboardRepository>,
    history: Arc<dyn HistoryRepository>,
    gate: ReplayGate,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(
        clock: Clock,
        leaderboard: Arc<dyn LeaderboardRepository>,
        history: Arc<dyn HistoryRepository>,
        gate: ReplayGate,
    ) -> Self {
        Self {
            clock,
            leaderboard,
            history,
            gate,
        }
    }

    /// Highest career totals first.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` on repository failures.
    pub async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        Ok(self.leaderboard.top_entries(limit).await?)
    }

    /// Remote total when the player has a leaderboard row, local total otherwise.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` if either source cannot be read.
    pub async fn career_total(&self, identity: &Identity) -> Result<CareerTotal, LeaderboardError> {
        if let Some(user) = identity.user_id() {
            if let Some(entry) = self.leaderboard.entry_for(user).await? {
                return Ok(CareerTotal::Remote(entry.total_score));
            }
        }
        Ok(CareerTotal::Local(self.gate.local_total()?))
    }

    /// Upload every locally recorded daily score for `player`, then re-read the
    /// authoritative total.
    ///
    /// Dates the ledger already has count as synced. Any other failure stops
    /// the upload.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError` on the first non-duplicate storage failure.
    pub async fn reconcile(&self, player: &Player) -> Result<SyncReport, LeaderboardError> {
        self.leaderboard.register_player(player).await?;

        let now = self.clock.now();
        let mut uploaded = 0;
        let mut already_synced = 0;
        for (date, score) in self.gate.history()? {
            let entry = QuizHistoryEntry::new(player.user_id, date, score, now);
            match self.history.insert_history(&entry).await {
                Ok(()) => uploaded += 1,
                Err(StorageError::Conflict) => {
                    debug!(%date, "score already on the ledger");
                    already_synced += 1;
                }
                Err(err) => {
                    warn!(%err, %date, "stopping score sync");
                    return Err(err.into());
                }
            }
        }

        let total = self
            .leaderboard
            .entry_for(player.user_id)
            .await?
            .map_or(0, |entry| entry.total_score);

        info!(
            user = %player.user_id,
            uploaded,
            already_synced,
            total,
            "local scores reconciled"
        );
        Ok(SyncReport {
            uploaded,
            already_synced,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuizDate, UserId};
    use quiz_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;
    use storage::InMemoryLocalStore;

    fn day(d: u32) -> QuizDate {
        QuizDate::from_ymd(2025, 11, d).unwrap()
    }

    fn service(repo: &InMemoryRepository) -> LeaderboardService {
        LeaderboardService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            ReplayGate::new(Arc::new(InMemoryLocalStore::new())),
        )
    }

    #[tokio::test]
    async fn reconcile_twice_counts_each_day_once() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.gate.record_score(day(28), 40_000).unwrap();
        svc.gate.record_score(day(29), 50_500).unwrap();
        let player = Player::new(UserId::random(), "Sarah", None);

        let first = svc.reconcile(&player).await.unwrap();
        assert_eq!(first.uploaded, 2);
        assert_eq!(first.total, 90_500);

        let second = svc.reconcile(&player).await.unwrap();
        assert_eq!(second.uploaded, 0);
        assert_eq!(second.already_synced, 2);
        assert_eq!(second.total, 90_500);
    }

    #[tokio::test]
    async fn reconcile_keeps_scores_played_elsewhere() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let player = Player::new(UserId::random(), "Sarah", None);
        repo.insert_history(&QuizHistoryEntry::new(
            player.user_id,
            day(27),
            20_000,
            fixed_now(),
        ))
        .await
        .unwrap();
        svc.gate.record_score(day(29), 10_000).unwrap();

        let report = svc.reconcile(&player).await.unwrap();
        assert_eq!(report.total, 30_000);
        assert_eq!(
            svc.career_total(&Identity::Authenticated(player)).await.unwrap(),
            CareerTotal::Remote(30_000)
        );
    }

    #[tokio::test]
    async fn anonymous_total_comes_from_the_gate() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.gate.record_score(day(29), 10_100).unwrap();

        let total = svc.career_total(&Identity::Anonymous).await.unwrap();
        assert_eq!(total, CareerTotal::Local(10_100));
        assert!(!total.is_remote());
    }

    #[tokio::test]
    async fn top_is_ordered() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        for (name, score) in [("a", 5), ("b", 50)] {
            let user = UserId::random();
            repo.register_player(&Player::new(user, name, None))
                .await
                .unwrap();
            repo.insert_history(&QuizHistoryEntry::new(user, day(29), score, fixed_now()))
                .await
                .unwrap();
        }
        let top = svc.top(DEFAULT_TOP).await.unwrap();
        assert_eq!(top[0].username, "b");
    }
}
