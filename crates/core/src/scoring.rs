//! Points awarded per answer.
//!
//! A correct answer is worth `BASE_POINTS` plus a speed bonus that starts at
//! `MAX_SPEED_BONUS` the moment the question is shown and loses one point every
//! `BONUS_DECAY_MILLIS`. Wrong answers are worth nothing.

use chrono::Duration;

/// Points for any correct answer.
pub const BASE_POINTS: u32 = 10_000;

/// Bonus for answering instantly.
pub const MAX_SPEED_BONUS: u32 = 100;

/// Milliseconds it takes for the bonus to drop by one point.
pub const BONUS_DECAY_MILLIS: i64 = 100;

/// Lower bound for the score axis on the analytics dashboard (five perfect answers).
pub const MAX_DAILY_SCORE_HINT: u64 = 50_000;

/// Speed bonus for the given time between presenting and answering a question.
///
/// Negative durations (clock adjustments) are treated as an instant answer.
#[must_use]
pub fn speed_bonus(elapsed: Duration) -> u32 {
    let millis = elapsed.num_milliseconds().max(0);
    let decayed = millis / BONUS_DECAY_MILLIS;
    let remaining = i64::from(MAX_SPEED_BONUS) - decayed;
    u32::try_from(remaining.max(0)).unwrap_or(0)
}

/// Points for one answer.
#[must_use]
pub fn award(correct: bool, elapsed: Duration) -> u32 {
    if correct {
        BASE_POINTS + speed_bonus(elapsed)
    } else {
        0
    }
}

/// Scores are shown to players in thousands, rounded down.
#[must_use]
pub fn display_points(score: u64) -> u64 {
    score / 1000
}
