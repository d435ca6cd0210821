//! Coercion of heterogeneous cells into calendar timestamps.
//!
//! Numbers above [`SERIAL_DATE_FLOOR`] are spreadsheet serial dates. Smaller
//! numbers are read the way a generic timestamp converter reads a bare
//! integer: nanoseconds since the Unix epoch. Text goes through a fixed list
//! of layouts, ISO-8601 first, month-first for slashed dates.

use crate::model::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Numbers strictly above this are serial day counts.
pub const SERIAL_DATE_FLOOR: f64 = 10_000.0;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

static SPREADSHEET_EPOCH: Lazy<NaiveDateTime> = Lazy::new(|| {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("1899-12-30 is a valid date")
});

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d.%m.%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M",
    "%d-%B-%Y %H:%M:%S%.f",
    "%d-%B-%Y %H:%M",
    "%B %d, %Y %H:%M:%S%.f",
    "%B %d, %Y %H:%M",
    "%d %B %Y %H:%M:%S%.f",
    "%d %B %Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Outcome of normalizing one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Timestamp {
    Parsed(NaiveDateTime),
    Unparseable,
}

impl Timestamp {
    pub fn parsed(self) -> Option<NaiveDateTime> {
        match self {
            Timestamp::Parsed(value) => Some(value),
            Timestamp::Unparseable => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, Timestamp::Parsed(_))
    }
}

impl From<Option<NaiveDateTime>> for Timestamp {
    fn from(value: Option<NaiveDateTime>) -> Self {
        value.map_or(Timestamp::Unparseable, Timestamp::Parsed)
    }
}

pub fn normalize(cell: Option<&CellValue>) -> Timestamp {
    match cell {
        None => Timestamp::Unparseable,
        Some(CellValue::Number(number)) => normalize_number(*number),
        Some(CellValue::Text(text)) => normalize_text(text),
        Some(CellValue::Bool(_)) => Timestamp::Unparseable,
    }
}

fn normalize_number(number: f64) -> Timestamp {
    if number > SERIAL_DATE_FLOOR {
        serial_to_datetime(number).into()
    } else {
        epoch_nanos_to_datetime(number).into()
    }
}

fn normalize_text(text: &str) -> Timestamp {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Timestamp::Unparseable;
    }
    parse_text(trimmed).into()
}

/// `serial` days after 1899-12-30, fraction as time of day, microsecond
/// resolution.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let micros = (serial * MICROS_PER_DAY).round();
    if micros.abs() >= i64::MAX as f64 {
        return None;
    }
    SPREADSHEET_EPOCH.checked_add_signed(TimeDelta::microseconds(micros as i64))
}

/// Inverse of [`serial_to_datetime`], used when writing timestamps back out.
pub fn datetime_to_serial(value: &NaiveDateTime) -> f64 {
    let delta = value.signed_duration_since(*SPREADSHEET_EPOCH);
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / MICROS_PER_DAY,
        None => delta.num_seconds() as f64 / 86_400.0,
    }
}

fn epoch_nanos_to_datetime(nanos: f64) -> Option<NaiveDateTime> {
    if !nanos.is_finite() {
        return None;
    }
    Some(DateTime::from_timestamp_nanos(nanos.trunc() as i64).naive_utc())
}

/// A bare four-digit year is January 1st of that year.
fn parse_bare_year(text: &str) -> Option<NaiveDateTime> {
    if text.len() != 4 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text.parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
}

fn parse_text(text: &str) -> Option<NaiveDateTime> {
    if let Some(value) = parse_bare_year(text) {
        return Some(value);
    }
    if let Ok(value) = DateTime::parse_from_rfc3339(text) {
        return Some(value.naive_utc());
    }
    if let Ok(value) = DateTime::parse_from_rfc2822(text) {
        return Some(value.naive_utc());
    }
    DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            DATE_LAYOUTS
                .iter()
                .find_map(|layout| NaiveDate::parse_from_str(text, layout).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
