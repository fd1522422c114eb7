//! Field coercion for the birthday and phone columns.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::model::Cell;

/// Display format of birthdays in the canonical table.
pub const BIRTHDAY_FORMAT: &str = "%d-%m-%Y";

/// Date layouts with a four-digit year, tried in order. Day-first layouts
/// precede their month-first counterparts so `03/05/2010` is 3 May.
const FULL_YEAR_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%m.%d.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

const SHORT_YEAR_FORMATS: &[&str] = &["%d-%m-%y", "%d/%m/%y", "%d.%m.%y", "%d-%b-%y", "%d %b %y"];

/// Largest serial a spreadsheet can hold (9999-12-31).
const MAX_SERIAL: f64 = 2_958_465.0;

/// Converts a spreadsheet serial number into a timestamp using the 1900
/// date system.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..=MAX_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Parses a free-form date string. Accepts ISO, slash, dot and dash
/// layouts, month names, two-digit years, and a trailing time component.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let date_part = strip_time(trimmed);

    FULL_YEAR_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        .find(|date| (1000..=9999).contains(&date.year()))
        .or_else(|| {
            SHORT_YEAR_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(date_part, format).ok())
        })
}

/// Drops a trailing `HH:MM[:SS]` token separated by whitespace or `T`.
fn strip_time(text: &str) -> &str {
    match text.rsplit_once(|c: char| c.is_whitespace() || c == 'T') {
        Some((date, time)) if time.contains(':') => date.trim_end(),
        _ => text,
    }
}

/// Reads a birthday out of a cell, whatever its storage type.
pub fn coerce_birthday(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::DateTime(serial) | Cell::Number(serial) => {
            serial_to_datetime(*serial).map(|moment| moment.date())
        }
        Cell::Text(text) => parse_date(text),
        Cell::Empty | Cell::Bool(_) => None,
    }
}

/// Normalises a phone number: digits only, no leading zeros, prefixed with
/// the country code. A number with no digits stays empty.
pub fn normalize_phone(raw: &str, country_code: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        String::new()
    } else {
        format!("{country_code}{significant}")
    }
}
