//! YEAR / DATE / TIME / DATETIME / TIMESTAMP decoding.

use memchr::memchr;
use time::macros::format_description;
use time::{Date, Duration, Month, PrimitiveDateTime};

use crate::error::{Error, Result};
use crate::field::{Field, FieldType};

use super::utf8;

/// A decoded temporal column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    Year(i32),
    Date(Date),
    /// TIME is an interval: signed, and hours may exceed 24.
    Time(Duration),
    /// DATETIME and TIMESTAMP, without zone.
    DateTime(PrimitiveDateTime),
}

impl Temporal {
    /// Seconds since the Unix epoch, reading the value as UTC.
    ///
    /// YEAR is January 1st of that year, DATE is midnight, TIME is the
    /// interval length. `None` if the value is outside the calendar range.
    pub fn unix_seconds(&self) -> Option<f64> {
        match self {
            Temporal::Year(year) => Date::from_calendar_date(*year, Month::January, 1)
                .ok()
                .map(|date| date.midnight().assume_utc().unix_timestamp() as f64),
            Temporal::Date(date) => Some(date.midnight().assume_utc().unix_timestamp() as f64),
            Temporal::Time(duration) => Some(duration.as_seconds_f64()),
            Temporal::DateTime(datetime) => {
                let utc = datetime.assume_utc();
                Some(utc.unix_timestamp() as f64 + f64::from(utc.nanosecond()) / 1e9)
            }
        }
    }
}

/// Decode a temporal value according to the column's declared type.
///
/// An optional `.fraction` suffix (up to 9 digits) is split off first and
/// applied to TIME, DATETIME and TIMESTAMP values.
pub fn decode_temporal(index: usize, field: &Field, bytes: &[u8]) -> Result<Temporal> {
    let field_type = field.field_type;
    if !field_type.is_temporal() {
        return Err(Error::UnsupportedTemporalType(field_type));
    }

    let text = utf8(bytes)?;
    let (main, fraction) = split_fraction(text)?;

    match field_type {
        FieldType::Year => {
            if fraction.is_some() {
                return Err(Error::Decode(format!("field {}: YEAR with fraction", index)));
            }
            parse_year(main).map(Temporal::Year)
        }
        FieldType::Date | FieldType::NewDate => {
            if fraction.is_some() {
                return Err(Error::Decode(format!("field {}: DATE with fraction", index)));
            }
            Date::parse(main, format_description!("[year]-[month]-[day]"))
                .map(Temporal::Date)
                .map_err(|e| Error::Decode(format!("invalid date: {}", e)))
        }
        FieldType::Time => {
            let (negative, duration) = parse_time(main)?;
            let duration = duration
                .checked_add(fraction.unwrap_or(Duration::ZERO))
                .ok_or_else(|| Error::Decode(format!("time out of range: {}", text)))?;
            Ok(Temporal::Time(if negative { -duration } else { duration }))
        }
        FieldType::DateTime | FieldType::Timestamp => {
            let datetime = PrimitiveDateTime::parse(
                main,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
            .map_err(|e| Error::Decode(format!("invalid datetime: {}", e)))?;
            datetime
                .checked_add(fraction.unwrap_or(Duration::ZERO))
                .map(Temporal::DateTime)
                .ok_or_else(|| Error::Decode("datetime out of range".into()))
        }
        other => Err(Error::UnsupportedTemporalType(other)),
    }
}

/// Split `"12:00:01.25"` into `("12:00:01", Some(250ms))`.
fn split_fraction(text: &str) -> Result<(&str, Option<Duration>)> {
    let Some(dot) = memchr(b'.', text.as_bytes()) else {
        return Ok((text, None));
    };
    let (main, digits) = (&text[..dot], &text[dot + 1..]);
    if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Decode(format!("invalid fractional seconds: {}", digits)));
    }

    let mut nanos: i64 = 0;
    for b in digits.bytes() {
        nanos = nanos * 10 + i64::from(b - b'0');
    }
    for _ in digits.len()..9 {
        nanos *= 10;
    }
    Ok((main, Some(Duration::nanoseconds(nanos))))
}

/// Two-digit years map to 1970-2069 the way the server does.
fn parse_year(text: &str) -> Result<i32> {
    let year: i32 = text
        .parse()
        .map_err(|e| Error::Decode(format!("invalid year: {}", e)))?;
    if year < 0 {
        return Err(Error::Decode(format!("invalid year: {}", text)));
    }
    match text.len() {
        2 if year < 70 => Ok(2000 + year),
        2 => Ok(1900 + year),
        4 => Ok(year),
        _ => Err(Error::Decode(format!("invalid year: {}", text))),
    }
}

/// Parse `[-]H+:MM:SS`. Returns the sign separately so the fraction can be
/// added to the magnitude.
fn parse_time(text: &str) -> Result<(bool, Duration)> {
    let invalid = || Error::Decode(format!("invalid time: {}", text));

    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut parts = rest.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: i64 = seconds.parse().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(invalid());
    }

    let total = hours
        .checked_mul(3600)
        .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
        .ok_or_else(invalid)?;
    Ok((negative, Duration::seconds(total)))
}
