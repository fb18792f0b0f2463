use chrono::{DateTime, NaiveDateTime, Utc};
use exam_core::time::parse_timestamp;

const WARNING_BELOW_SECS: u64 = 10 * 60;
const CRITICAL_BELOW_SECS: u64 = 5 * 60;

/// Colour band for the exam countdown badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownLevel {
    Normal,
    Warning,
    Critical,
}

impl CountdownLevel {
    #[must_use]
    pub fn for_remaining(seconds: u64) -> Self {
        if seconds < CRITICAL_BELOW_SECS {
            Self::Critical
        } else if seconds < WARNING_BELOW_SECS {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Normal => "countdown",
            Self::Warning => "countdown countdown-warning",
            Self::Critical => "countdown countdown-critical",
        }
    }
}

/// `MM:SS`; minutes keep counting past an hour (`95:00`).
#[must_use]
pub fn format_countdown(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Placeholder until the backend has reported a budget.
#[must_use]
pub fn format_countdown_opt(seconds: Option<u64>) -> String {
    seconds.map_or_else(|| "--:--".to_string(), format_countdown)
}

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

#[must_use]
pub fn format_datetime_opt(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(|| "-".to_string(), format_datetime)
}

/// Value for a `datetime-local` input.
#[must_use]
pub fn to_input_value(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M").to_string()
}

/// Parses a `datetime-local` input; seconds are optional.
#[must_use]
pub fn parse_input_value(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .map(|naive| naive.and_utc())
        .or_else(|_| parse_timestamp(raw))
        .ok()
}
