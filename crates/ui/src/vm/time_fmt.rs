use chrono::{DateTime, Utc};

/// Short date such as `Nov 29, 2025`.
#[must_use]
pub fn format_date(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}
