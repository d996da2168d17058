use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use quiz_core::model::{QuizAttempt, QuizDate};
use quiz_core::scoring::MAX_DAILY_SCORE_HINT;
use storage::repository::{AttemptRepository, LeaderboardRepository};

use crate::error::AnalyticsError;
use crate::Clock;

/// Days covered by the activity chart, today included.
pub const ACTIVITY_DAYS: u64 = 30;

/// Score histogram buckets: label and inclusive lower bound.
pub const SCORE_BUCKETS: [(&str, u64); 5] = [
    ("0-10k", 0),
    ("10k-20k", 10_000),
    ("20k-30k", 20_000),
    ("30k-40k", 30_000),
    ("40k+", 40_000),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPoint {
    pub date: QuizDate,
    /// Chart label such as `Nov 5`.
    pub label: String,
    pub attempts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBucket {
    pub label: &'static str,
    pub count: u64,
}

/// Dashboard figures derived from the attempt ledger and the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsSnapshot {
    pub total_users: u64,
    pub total_attempts: u64,
    pub average_score: u64,
    pub max_score: u64,
    /// Percent of attempts that scored anything.
    pub completion_rate: u8,
    pub activity: Vec<ActivityPoint>,
    pub distribution: Vec<ScoreBucket>,
}

/// Pure aggregation behind `AnalyticsService::snapshot`.
#[must_use]
pub fn summarize(
    usernames: &[String],
    total_attempts: u64,
    attempts: &[QuizAttempt],
    today: QuizDate,
) -> AnalyticsSnapshot {
    let total_users = usernames.iter().collect::<HashSet<_>>().len() as u64;

    let scores: Vec<u64> = attempts.iter().map(|a| u64::from(a.score)).collect();
    let sum: u64 = scores.iter().sum();
    let average_score = if scores.is_empty() {
        0
    } else {
        let n = scores.len() as u64;
        (sum + n / 2) / n
    };
    let max_score = scores
        .iter()
        .copied()
        .max()
        .unwrap_or(0)
        .max(MAX_DAILY_SCORE_HINT);

    let scored = scores.iter().filter(|s| **s > 0).count() as u64;
    let completion_rate = if total_attempts == 0 {
        0
    } else {
        u8::try_from((scored * 100 + total_attempts / 2) / total_attempts).unwrap_or(100)
    };

    let first_day = today.days_before(ACTIVITY_DAYS - 1);
    let mut per_day: BTreeMap<QuizDate, u64> = (0..ACTIVITY_DAYS)
        .map(|offset| (first_day.days_after(offset), 0))
        .collect();
    for attempt in attempts {
        let day = QuizDate::new(attempt.created_at.date_naive());
        if let Some(count) = per_day.get_mut(&day) {
            *count += 1;
        }
    }
    let activity = per_day
        .into_iter()
        .map(|(date, attempts)| ActivityPoint {
            date,
            label: date.short_label(),
            attempts,
        })
        .collect();

    let distribution = SCORE_BUCKETS
        .iter()
        .enumerate()
        .map(|(idx, (label, min))| {
            let max = SCORE_BUCKETS.get(idx + 1).map_or(u64::MAX, |(_, next)| *next);
            ScoreBucket {
                label,
                count: scores.iter().filter(|s| **s >= *min && **s < max).count() as u64,
            }
        })
        .collect();

    AnalyticsSnapshot {
        total_users,
        total_attempts,
        average_score,
        max_score,
        completion_rate,
        activity,
        distribution,
    }
}

/// Read-only aggregate statistics for the admin dashboard.
#[derive(Clone)]
pub struct AnalyticsService {
    clock: Clock,
    attempts: Arc<dyn AttemptRepository>,
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl AnalyticsService {
    #[must_use]
    pub fn new(
        clock: Clock,
        attempts: Arc<dyn AttemptRepository>,
        leaderboard: Arc<dyn LeaderboardRepository>,
    ) -> Self {
        Self {
            clock,
            attempts,
            leaderboard,
        }
    }

    /// # Errors
    ///
    /// Returns `AnalyticsError::Storage` if any source cannot be read.
    pub async fn snapshot(&self) -> Result<AnalyticsSnapshot, AnalyticsError> {
        let today = self.clock.today();
        let usernames: Vec<String> = self
            .leaderboard
            .list_entries()
            .await?
            .into_iter()
            .map(|entry| entry.username)
            .collect();
        let total_attempts = self.attempts.count_attempts().await?;
        let attempts = self.attempts.list_attempts(None).await?;
        tracing::debug!(
            users = usernames.len(),
            total_attempts,
            "analytics sources loaded"
        );
        Ok(summarize(&usernames, total_attempts, &attempts, today))
    }
}
