use chrono::{DateTime, NaiveDate, ParseError, TimeDelta, Utc};
use tokio::time::Instant;

/// Date-only format used by the session token endpoint, both ways.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Formats `at` as `YYYY-MM-DD`, dropping the time of day.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Parses a `YYYY-MM-DD` string into midnight UTC of that day.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

/// Converts an early-refresh margin to a chrono delta, saturating on overflow.
pub fn margin_from_std(margin: std::time::Duration) -> TimeDelta {
    TimeDelta::from_std(margin).unwrap_or(TimeDelta::MAX)
}
