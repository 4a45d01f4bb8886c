// SPDX-FileCopyrightText: 2026 davcal developers
//
// SPDX-License-Identifier: Apache-2.0

//! Conversion between fixed-offset local timestamps, UTC instants and the
//! compact iCalendar date/time forms.

use std::sync::OnceLock;

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::{self, Offset};
use regex::Regex;

use crate::error::IcalError;

/// Offset used when no other is configured.
///
/// Kept at +07:00 for compatibility with documents written by earlier
/// releases, which assumed that offset unconditionally.
pub const DEFAULT_OFFSET: Offset = tz::offset(7);

/// Converts between local wall-clock timestamps at a fixed UTC offset and
/// UTC instants.
///
/// The offset is a single fixed value: local times at any other offset are
/// converted as if they were at this one. It is an explicit configuration
/// value rather than a detected zone so that stored documents keep meaning
/// the same thing regardless of where the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TzConverter {
    offset: Offset,
}

impl Default for TzConverter {
    fn default() -> Self {
        Self::new(DEFAULT_OFFSET)
    }
}

impl TzConverter {
    /// Creates a converter for the given fixed offset.
    #[must_use]
    pub const fn new(offset: Offset) -> Self {
        Self { offset }
    }

    /// Parses an offset specification like `+07:00`, `+0700` or `-0530`.
    ///
    /// # Errors
    ///
    /// Returns [`IcalError::MalformedOffset`] if the text is not a
    /// `±HH[:]MM` offset or is out of range.
    pub fn from_spec(spec: &str) -> Result<Self, IcalError> {
        const RE: &str = r"^([+-])(\d{2}):?(\d{2})$";
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());

        let malformed = || IcalError::MalformedOffset {
            value: spec.to_string(),
        };

        let captures = re.captures(spec).ok_or_else(malformed)?;
        let sign = if &captures[1] == "-" { -1 } else { 1 };
        let hours: i32 = captures[2].parse().map_err(|_| malformed())?;
        let minutes: i32 = captures[3].parse().map_err(|_| malformed())?;
        let seconds = sign * (hours * 3600 + minutes * 60);
        let offset = Offset::from_seconds(seconds).map_err(|_| malformed())?;
        Ok(Self::new(offset))
    }

    /// The fixed offset this converter applies.
    #[must_use]
    pub const fn offset(&self) -> Offset {
        self.offset
    }

    /// The offset rendered as an ISO suffix, e.g. `+07:00`.
    #[must_use]
    pub fn offset_suffix(&self) -> String {
        let seconds = self.offset.seconds();
        let sign = if seconds < 0 { '-' } else { '+' };
        let abs = seconds.abs();
        format!("{sign}{:02}:{:02}", abs / 3600, (abs % 3600) / 60)
    }

    /// Converts a local timestamp string to the UTC instant it names.
    ///
    /// Any trailing offset indicator (`+07:00`, `+0700`, `Z`, ...) is
    /// stripped first: the components are always interpreted at this
    /// converter's offset. A missing time component means midnight.
    ///
    /// # Errors
    ///
    /// Returns [`IcalError::MalformedDate`] if the remaining text is not a
    /// `YYYY-MM-DD[THH:MM[:SS]]` timestamp.
    pub fn to_utc(&self, local: &str) -> Result<Timestamp, IcalError> {
        let bare = strip_offset_suffix(local);
        let malformed = || IcalError::malformed_date(local);

        let (date_part, time_part) = match bare.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (bare, None),
        };

        let mut date = date_part.split('-');
        let year: i16 = next_number(&mut date).ok_or_else(malformed)?;
        let month: i8 = next_number(&mut date).ok_or_else(malformed)?;
        let day: i8 = next_number(&mut date).ok_or_else(malformed)?;

        let (hour, minute, second) = match time_part {
            Some(time) => {
                let mut time = time.split(':');
                let hour: i8 = next_number(&mut time).ok_or_else(malformed)?;
                let minute: i8 = next_number(&mut time).ok_or_else(malformed)?;
                let second: i8 = next_number(&mut time).unwrap_or(0);
                (hour, minute, second)
            }
            None => (0, 0, 0),
        };

        let dt = DateTime::new(year, month, day, hour, minute, second, 0)
            .map_err(|_| malformed())?;
        self.offset.to_timestamp(dt).map_err(|_| malformed())
    }

    /// Renders a UTC instant in the compact iCalendar form, converting back
    /// to a local string at this converter's offset.
    ///
    /// All-day values come back as a bare `YYYY-MM-DD` date; timed values as
    /// `YYYY-MM-DDTHH:MM:SS` suffixed with the offset.
    ///
    /// # Errors
    ///
    /// Returns [`IcalError::MalformedDate`] if the text does not match the
    /// expected compact form.
    pub fn parse_ical_date(&self, ical_date: &str, all_day: bool) -> Result<String, IcalError> {
        let malformed = || IcalError::malformed_date(ical_date);

        if all_day {
            const RE: &str = r"^(\d{4})(\d{2})(\d{2})";
            static REGEX: OnceLock<Regex> = OnceLock::new();
            let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());
            let captures = re.captures(ical_date).ok_or_else(malformed)?;
            return Ok(format!(
                "{}-{}-{}",
                &captures[1], &captures[2], &captures[3]
            ));
        }

        const RE: &str = r"^(\d{4})(\d{2})(\d{2})T(\d{2})(\d{2})(\d{2})";
        static REGEX: OnceLock<Regex> = OnceLock::new();
        let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());
        let captures = re.captures(ical_date).ok_or_else(malformed)?;

        let year: i16 = captures[1].parse().map_err(|_| malformed())?;
        let month: i8 = captures[2].parse().map_err(|_| malformed())?;
        let day: i8 = captures[3].parse().map_err(|_| malformed())?;
        let hour: i8 = captures[4].parse().map_err(|_| malformed())?;
        let minute: i8 = captures[5].parse().map_err(|_| malformed())?;
        let second: i8 = captures[6].parse().map_err(|_| malformed())?;

        let utc = DateTime::new(year, month, day, hour, minute, second, 0)
            .map_err(|_| malformed())?;
        let instant = Offset::UTC.to_timestamp(utc).map_err(|_| malformed())?;
        let local = self.offset.to_datetime(instant);

        Ok(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}",
            local.year(),
            local.month(),
            local.day(),
            local.hour(),
            local.minute(),
            local.second(),
            self.offset_suffix()
        ))
    }
}

/// Renders a UTC instant in the compact iCalendar date or date-time form.
///
/// All-day values become `YYYYMMDD`, timed values `YYYYMMDDTHHMMSSZ`.
/// Subsecond precision is truncated, never rounded.
#[must_use]
pub fn format_ical_date(instant: Timestamp, all_day: bool) -> String {
    let dt = Offset::UTC.to_datetime(instant);
    if all_day {
        format!("{:04}{:02}{:02}", dt.year(), dt.month(), dt.day())
    } else {
        format!(
            "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
            dt.year(),
            dt.month(),
            dt.day(),
            dt.hour(),
            dt.minute(),
            dt.second()
        )
    }
}

/// Renders the date part of a local timestamp string as the compact
/// `YYYYMMDD` form.
///
/// No UTC conversion happens here: all-day values name a calendar date, not
/// an instant, so they must not shift across an offset.
///
/// # Errors
///
/// Returns [`IcalError::MalformedDate`] if the text does not start with a
/// `YYYY-MM-DD` date.
pub fn format_local_date(local: &str) -> Result<String, IcalError> {
    const RE: &str = r"^(\d{4})-(\d{2})-(\d{2})";
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());
    let captures = re
        .captures(local)
        .ok_or_else(|| IcalError::malformed_date(local))?;
    Ok(format!("{}{}{}", &captures[1], &captures[2], &captures[3]))
}

/// Strips a trailing `+HH:MM`, `+HHMM` or `Z` offset indicator, if any.
fn strip_offset_suffix(s: &str) -> &str {
    const RE: &str = r"(?:[+-]\d{2}:\d{2}|[+-]\d{4}|Z)$";
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| Regex::new(RE).unwrap());
    match re.find(s) {
        Some(m) => s.get(..m.start()).unwrap_or(s),
        None => s,
    }
}

fn next_number<'a, T: std::str::FromStr>(parts: &mut impl Iterator<Item = &'a str>) -> Option<T> {
    parts.next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_utc_subtracts_configured_offset() {
        let tz = TzConverter::default();
        let ts = tz.to_utc("2024-03-01T09:00:00").unwrap();
        assert_eq!(ts.to_string(), "2024-03-01T02:00:00Z");
    }

    #[test]
    fn to_utc_normalizes_offset_suffixes() {
        let tz = TzConverter::default();
        let expected = tz.to_utc("2024-03-01T09:00:00").unwrap();
        for src in [
            "2024-03-01T09:00:00+07:00",
            "2024-03-01T09:00:00+0700",
            "2024-03-01T09:00:00Z",
        ] {
            assert_eq!(tz.to_utc(src).unwrap(), expected, "Failed on: {src}");
        }
    }

    #[test]
    fn to_utc_defaults_missing_time_to_midnight() {
        let tz = TzConverter::default();
        let ts = tz.to_utc("2024-03-01").unwrap();
        assert_eq!(ts.to_string(), "2024-02-29T17:00:00Z");
    }

    #[test]
    fn to_utc_rejects_garbage() {
        let tz = TzConverter::default();
        assert!(tz.to_utc("not-a-date").is_err());
        assert!(tz.to_utc("2024-13-99T00:00:00").is_err());
    }

    #[test]
    fn fixed_offset_round_trip() {
        let tz = TzConverter::default();
        let ts = tz.to_utc("2024-03-01T09:00:00").unwrap();
        let compact = format_ical_date(ts, false);
        assert_eq!(compact, "20240301T020000Z");
        let local = tz.parse_ical_date(&compact, false).unwrap();
        assert_eq!(local, "2024-03-01T09:00:00+07:00");
    }

    #[test]
    fn all_day_formats_without_time() {
        let tz = TzConverter::default();
        let ts = tz.to_utc("2024-03-01T00:00:00Z").unwrap();
        assert_eq!(format_ical_date(ts, true), "20240229");
        assert_eq!(tz.parse_ical_date("20240301", true).unwrap(), "2024-03-01");
    }

    #[test]
    fn local_date_formats_without_conversion() {
        assert_eq!(format_local_date("2024-03-01").unwrap(), "20240301");
        assert_eq!(
            format_local_date("2024-03-01T09:00:00").unwrap(),
            "20240301"
        );
        assert!(format_local_date("garbage").is_err());
    }

    #[test]
    fn offset_spec_parsing() {
        assert_eq!(
            TzConverter::from_spec("+07:00").unwrap().offset_suffix(),
            "+07:00"
        );
        assert_eq!(
            TzConverter::from_spec("-0530").unwrap().offset_suffix(),
            "-05:30"
        );
        assert!(TzConverter::from_spec("+7").is_err());
        assert!(TzConverter::from_spec("UTC").is_err());
    }
}
