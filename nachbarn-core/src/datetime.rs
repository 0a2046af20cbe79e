//! Date and time formats used in the table and on the wire.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{NachbarnError, NachbarnResult};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const LENIENT_DATE_FORMATS: &[&str] = &[DATE_FORMAT, "%Y/%m/%d"];
const LENIENT_TIME_FORMATS: &[&str] = &[TIME_FORMAT, "%H:%M:%S", "%H:%M:%S%.f"];
const NAIVE_INSTANT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn format_iso(datetime: NaiveDateTime) -> String {
    datetime.format(ISO_FORMAT).to_string()
}

/// Parse a stored date cell, tolerating slashes and a trailing time part.
pub fn parse_stored_date(cell: &str) -> NachbarnResult<NaiveDate> {
    let cell = cell.trim();

    LENIENT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(cell, fmt).ok())
        .or_else(|| {
            cell.get(..10)
                .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
        })
        .ok_or_else(|| NachbarnError::Parse(format!("invalid date '{}'", cell)))
}

/// Parse a stored time cell that must be exactly `HH:MM`.
pub fn parse_stored_time(cell: &str) -> NachbarnResult<NaiveTime> {
    NaiveTime::parse_from_str(cell, TIME_FORMAT)
        .map_err(|e| NachbarnError::Parse(format!("invalid time '{}': {}", cell, e)))
}

fn parse_lenient_time(cell: &str) -> Option<NaiveTime> {
    LENIENT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(cell, fmt).ok())
}

/// Combine a date cell and a time cell into one timestamp.
///
/// An empty date yields `None`. An empty time means midnight.
pub fn combine_cells(date_cell: &str, time_cell: &str) -> Option<NaiveDateTime> {
    let date_cell = date_cell.trim();
    if date_cell.is_empty() {
        return None;
    }

    let date = LENIENT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_cell, fmt).ok())?;

    let time_cell = time_cell.trim();
    let time = if time_cell.is_empty() {
        NaiveTime::MIN
    } else {
        parse_lenient_time(time_cell)?
    };

    Some(date.and_time(time))
}

/// Parse an instant sent by the calendar widget.
///
/// Offsets are dropped and the wall-clock time is kept.
pub fn parse_instant(value: &str) -> NachbarnResult<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    NAIVE_INSTANT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| NachbarnError::Parse(format!("invalid instant '{}'", value)))
}

/// Serde adapter for `HH:MM` times; seconds are accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_lenient_time(raw.trim())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid time '{}'", raw)))
    }
}
