use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Calendar day a quiz is scheduled for.
///
/// Rendered and parsed as `YYYY-MM-DD`, which is also the key used by the
/// local score history and the per-user ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuizDate(NaiveDate);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid quiz date (expected YYYY-MM-DD): {raw}")]
pub struct ParseDateError {
    raw: String,
}

impl QuizDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a date from its parts, returning `None` for impossible days.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    #[must_use]
    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    /// The following calendar day. Saturates at the end of chrono's range.
    #[must_use]
    pub fn succ(&self) -> Self {
        Self(self.0.succ_opt().unwrap_or(self.0))
    }

    /// The previous calendar day. Saturates at the start of chrono's range.
    #[must_use]
    pub fn pred(&self) -> Self {
        Self(self.0.pred_opt().unwrap_or(self.0))
    }

    #[must_use]
    pub fn days_before(&self, days: u64) -> Self {
        Self(self.0.checked_sub_days(Days::new(days)).unwrap_or(self.0))
    }

    #[must_use]
    pub fn days_after(&self, days: u64) -> Self {
        Self(self.0.checked_add_days(Days::new(days)).unwrap_or(self.0))
    }

    /// Short chart label such as `Nov 5`.
    #[must_use]
    pub fn short_label(&self) -> String {
        format!("{} {}", self.0.format("%b"), self.0.day())
    }
}

impl fmt::Debug for QuizDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuizDate({self})")
    }
}

impl fmt::Display for QuizDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for QuizDate {
    type Err = ParseDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| ParseDateError { raw: s.to_string() })
    }
}

impl TryFrom<String> for QuizDate {
    type Error = ParseDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<QuizDate> for String {
    fn from(value: QuizDate) -> Self {
        value.to_string()
    }
}

impl From<NaiveDate> for QuizDate {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_iso_dates() {
        let date: QuizDate = "2025-11-29".parse().unwrap();
        assert_eq!(date.to_string(), "2025-11-29");
        assert_eq!(date, QuizDate::from_ymd(2025, 11, 29).unwrap());
    }

    #[test]
    fn rejects_other_formats() {
        assert!("29/11/2025".parse::<QuizDate>().is_err());
        assert!("2025-02-30".parse::<QuizDate>().is_err());
    }

    #[test]
    fn stepping_crosses_month_boundaries() {
        let date = QuizDate::from_ymd(2025, 11, 30).unwrap();
        assert_eq!(date.succ().to_string(), "2025-12-01");
        assert_eq!(date.succ().pred(), date);
        assert_eq!(date.days_before(30).to_string(), "2025-10-31");
    }

    #[test]
    fn short_label_matches_chart_axis() {
        let date = QuizDate::from_ymd(2025, 11, 5).unwrap();
        assert_eq!(date.short_label(), "Nov 5");
    }

    #[test]
    fn serializes_as_plain_string() {
        let date = QuizDate::from_ymd(2025, 1, 2).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, "\"2025-01-02\"");
        let back: QuizDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }
}
