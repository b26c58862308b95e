//! Wall-clock timestamp formatting
//!
//! Timestamps travel as naive `YYYY-MM-DD HH:MM:SS` strings, interpreted in
//! a timezone both ends agree on. These helpers keep the format in one place.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Second-resolution wall-clock format.
pub const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Hour-granularity bucket used for rolling file names.
pub const HOUR_BUCKET_FORMAT: &str = "%Y-%m-%d-%H";

/// Render `instant` as a wall-clock string in `tz`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sigil_common::time::format_wall_clock;
///
/// let instant = Utc.with_ymd_and_hms(2024, 3, 9, 16, 5, 7).unwrap();
/// assert_eq!(format_wall_clock(instant, chrono_tz::Asia::Shanghai), "2024-03-10 00:05:07");
/// ```
pub fn format_wall_clock(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(WALL_CLOCK_FORMAT).to_string()
}

/// Parse a wall-clock string interpreted in `tz`.
///
/// Returns `None` for malformed input or for local times that do not exist
/// in `tz` (DST gaps). Ambiguous local times resolve to the earliest match.
pub fn parse_wall_clock(value: &str, tz: Tz) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), WALL_CLOCK_FORMAT).ok()?;
    tz.from_local_datetime(&naive).earliest().map(|local| local.with_timezone(&Utc))
}

/// Hour bucket (`YYYY-MM-DD-HH`) of `instant` in UTC.
pub fn hour_bucket(instant: DateTime<Utc>) -> String {
    instant.format(HOUR_BUCKET_FORMAT).to_string()
}
