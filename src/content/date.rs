//! Timestamp normalization

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Format a timestamp the way an en-US locale string reads
///
/// # Examples
/// ```ignore
/// locale_string(&date, chrono_tz::UTC) // -> "1/15/2024, 10:30:00 AM"
/// ```
pub fn locale_string(date: &DateTime<Utc>, tz: Tz) -> String {
    date.with_timezone(&tz)
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
