//! Time-of-day labels for message bubbles.
//!
//! Timestamps arrive as ISO-8601 strings: RFC 3339 with an offset from the
//! server and from `Date.toISOString()`, or naive local date-times when the
//! backend runs without time-zone support. Naive values are taken as
//! already local, matching how browsers parse them.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Format `timestamp` as a two-digit `HH:MM` in the viewer's `local` offset.
///
/// Returns an empty label when the timestamp is absent or unparseable.
pub fn format_time_of_day(timestamp: Option<&str>, local: UtcOffset) -> String {
    let Some(raw) = timestamp.map(str::trim).filter(|t| !t.is_empty()) else {
        return String::new();
    };

    if let Ok(at) = OffsetDateTime::parse(raw, &Rfc3339) {
        let at = at.to_offset(local);
        return format!("{:02}:{:02}", at.hour(), at.minute());
    }

    let naive = format_description!("[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]");
    match PrimitiveDateTime::parse(raw, naive) {
        Ok(at) => format!("{:02}:{:02}", at.hour(), at.minute()),
        Err(e) => {
            log::debug!("unparseable message timestamp {raw:?}: {e}");
            String::new()
        }
    }
}

/// Viewer offset in effect at `timestamp` rather than now, so a message from
/// before a daylight-saving change keeps the hour it was sent at.
///
/// `minutes_west_at` evaluates `getTimezoneOffset()` for a timestamp and
/// yields NaN when the browser cannot parse it; the current offset is used
/// then, and when there is no timestamp at all.
pub fn offset_at(timestamp: Option<&str>, minutes_west_at: impl Fn(&str) -> f64, minutes_west_now: f64) -> UtcOffset {
    let minutes_west = timestamp
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(minutes_west_at)
        .filter(|m| m.is_finite())
        .unwrap_or(minutes_west_now);
    offset_from_js_minutes(minutes_west)
}

/// Offset from a JavaScript `Date.getTimezoneOffset()` value, which counts
/// minutes west of UTC.
#[allow(clippy::cast_possible_truncation)]
pub fn offset_from_js_minutes(minutes_west: f64) -> UtcOffset {
    if !minutes_west.is_finite() {
        return UtcOffset::UTC;
    }
    let seconds_east = -(minutes_west.round() as i32) * 60;
    UtcOffset::from_whole_seconds(seconds_east).unwrap_or(UtcOffset::UTC)
}
