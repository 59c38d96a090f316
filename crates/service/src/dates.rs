//! Display formatting for timestamps.
//!
//! The data API stores UTC; staff read UK-local times, so everything is
//! rendered in Europe/London (which shifts dates and hours under BST).

use chrono::{DateTime, Utc};
use chrono_tz::Europe::London;

/// "Wednesday 3 February 2010"
pub fn display_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&London).format("%A %-d %B %Y").to_string()
}

/// "Wednesday 3 February 2010 at 10:11am"
pub fn display_datetime(ts: DateTime<Utc>) -> String {
    let local = ts.with_timezone(&London);
    format!(
        "{} at {}",
        local.format("%A %-d %B %Y"),
        local.format("%-I:%M%P")
    )
}

/// "10:33:53"
pub fn display_clock_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&London).format("%H:%M:%S").to_string()
}

/// "23 July"
pub fn display_short_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&London).format("%-d %B").to_string()
}
