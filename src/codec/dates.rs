//! Date-time conversions between the form, the backend and list views.
//!
//! The form edits date-times as local `YYYY-MM-DDTHH:mm` strings with no
//! zone. The backend stores UTC instants as ISO-8601. List and detail views
//! show `DD/MM/YYYY HH:mm`. Every function here is total: input that cannot be
//! understood degrades to an empty or pass-through value.

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

/// `DD-MM-YYYY HH:mm`, produced by the backend for list views and always UTC.
static DASHED_UTC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2})-(\d{2})-(\d{4}) (\d{2}):(\d{2})$")
        .unwrap_or_else(|e| unreachable!("invalid dashed date pattern: {e}"))
});

/// `DD/MM/YYYY` with an optional ` HH:mm`, already in display form.
static DISPLAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}/\d{2}/\d{4})(?: \d{2}:\d{2})?$")
        .unwrap_or_else(|e| unreachable!("invalid display date pattern: {e}"))
});

/// Zone-less formats, read in the local offset.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Parses any of the accepted date shapes into a UTC instant.
///
/// Zone-less date-times are read in `offset`. A bare date and the dashed
/// list format are read as UTC.
fn parse_instant(value: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return offset
            .from_local_datetime(&naive)
            .single()
            .map(|local| local.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    parse_dashed_utc(value)
}

fn parse_dashed_utc(value: &str) -> Option<DateTime<Utc>> {
    let captures = DASHED_UTC.captures(value)?;
    let rebuilt = format!(
        "{}-{}-{} {}:{}",
        &captures[3], &captures[2], &captures[1], &captures[4], &captures[5]
    );
    NaiveDateTime::parse_from_str(&rebuilt, "%Y-%m-%d %H:%M")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Converts a form date-time to the ISO-8601 UTC string the backend expects.
///
/// The result always carries milliseconds and a `Z` suffix. Empty or
/// unparseable input yields an empty string.
///
/// ```
/// use chrono::FixedOffset;
/// use rdm::codec::dates::local_to_iso;
///
/// let brt = FixedOffset::west_opt(3 * 3600).unwrap();
/// assert_eq!(local_to_iso("2026-01-17T14:30", brt), "2026-01-17T17:30:00.000Z");
/// assert_eq!(local_to_iso("yesterday", brt), "");
/// ```
#[must_use]
pub fn local_to_iso(value: &str, offset: FixedOffset) -> String {
    if value.trim().is_empty() {
        return String::new();
    }
    parse_instant(value, offset).map_or_else(
        || {
            debug!(value, "Unparseable date, sending empty value");
            String::new()
        },
        |instant| instant.format(ISO_FORMAT).to_string(),
    )
}

/// Converts a backend instant to the local `YYYY-MM-DDTHH:mm` editing form.
///
/// Malformed input yields an empty string.
#[must_use]
pub fn iso_to_local(value: &str, offset: FixedOffset) -> String {
    if value.trim().is_empty() {
        return String::new();
    }
    parse_instant(value, offset).map_or_else(
        || {
            debug!(value, "Unparseable date, leaving field empty");
            String::new()
        },
        |instant| instant.with_timezone(&offset).format(LOCAL_FORMAT).to_string(),
    )
}

/// Formats a date for list and detail views as `DD/MM/YYYY[ HH:mm]`.
///
/// Blank input yields `None`. Text already in display form passes through,
/// and text that is not a date is returned unchanged.
#[must_use]
pub fn format_for_display(value: &str, offset: FixedOffset, with_time: bool) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(captures) = DISPLAY.captures(value) {
        return Some(if with_time {
            value.to_string()
        } else {
            captures[1].to_string()
        });
    }

    let pattern = if with_time { "%d/%m/%Y %H:%M" } else { "%d/%m/%Y" };
    parse_instant(value, offset).map_or_else(
        || Some(value.to_string()),
        |instant| Some(instant.with_timezone(&offset).format(pattern).to_string()),
    )
}
