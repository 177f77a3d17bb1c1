//! Habitual core data models.
//!
//! This crate defines the goal and daily task records shared by the
//! storage, planning, lifecycle and resolution layers.

#![warn(missing_docs)]

// Core identities
mod id;

// Goals and their daily tasks
mod goal;

pub use id::GoalId;
pub use goal::{Category, DailyTask, Difficulty, Goal, GoalKind, GoalStatus};

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// Calendar date format used for pinned manual-goal dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A field value that is not one of the accepted forms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {value:?}")]
pub struct ParseError {
    /// Field name
    pub field: &'static str,
    /// Rejected input
    pub value: String,
}

impl ParseError {
    pub(crate) fn invalid(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| ParseError::invalid("date", s))
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Calendar date of `instant` in the reference timezone.
pub fn calendar_date(instant: Time, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// Midnight of `date` in the reference timezone, as a UTC instant.
pub fn start_of_day(date: NaiveDate, offset: FixedOffset) -> Time {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    match offset.from_local_datetime(&midnight).single() {
        Some(local) => local.with_timezone(&Utc),
        // Fixed offsets never produce gaps or folds.
        None => Utc.from_utc_datetime(&midnight),
    }
}
