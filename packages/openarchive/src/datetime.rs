//! Conversion between local wall-clock time and the protocol's UTC granularities.
//!
//! OAI-PMH only admits two datestamp shapes: `YYYY-MM-DD` and
//! `YYYY-MM-DDThh:mm:ssZ`. Everything entering or leaving the responder is
//! checked against them strictly; there is no lenient parsing.
//!
//! # Examples
//! ```
//! use chrono::FixedOffset;
//! use openarchive::datetime::{local_from_utc, utc_from_local};
//!
//! let zone = FixedOffset::east_opt(13 * 3600).unwrap();
//! let utc = utc_from_local("2022-01-01 20:00:00", &zone).unwrap();
//! assert_eq!(utc, "2022-01-01T07:00:00Z");
//! assert_eq!(local_from_utc(&utc, &zone).unwrap(), "2022-01-01 20:00:00");
//! ```

use std::fmt::Display;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::error::{OaiError, Result};

/// strftime format of the second-precision UTC granularity.
pub const UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// strftime format of the date-only granularity.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// strftime format of local wall-clock strings.
pub const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static UTC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static LOCAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$").expect("valid regex")
});

/// Datestamp precision admitted by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// `YYYY-MM-DD`
    Day,
    /// `YYYY-MM-DDThh:mm:ssZ`
    Second,
}

impl Granularity {
    /// The protocol's notation for this granularity.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "YYYY-MM-DD",
            Self::Second => "YYYY-MM-DDThh:mm:ssZ",
        }
    }

    /// Determine which granularity `candidate` is written in.
    ///
    /// Both the shape and the calendar value must be valid, so `2020-02-30`
    /// is rejected.
    #[must_use]
    pub fn detect(candidate: &str) -> Option<Self> {
        if DATE_PATTERN.is_match(candidate) {
            NaiveDate::parse_from_str(candidate, DATE_FORMAT)
                .ok()
                .map(|_| Self::Day)
        } else if UTC_PATTERN.is_match(candidate) {
            NaiveDateTime::parse_from_str(candidate, UTC_FORMAT)
                .ok()
                .map(|_| Self::Second)
        } else {
            None
        }
    }
}

/// Whether `candidate` is written in one of the two supported granularities.
///
/// # Examples
/// ```
/// use openarchive::datetime::is_supported_granularity;
///
/// assert!(is_supported_granularity("2020-01-01"));
/// assert!(is_supported_granularity("2020-01-01T01:00:00Z"));
/// assert!(!is_supported_granularity("2020-01-01T01:00:00+01:00"));
/// ```
#[must_use]
pub fn is_supported_granularity(candidate: &str) -> bool {
    Granularity::detect(candidate).is_some()
}

/// Render an instant with the UTC date-time granularity.
#[must_use]
pub fn format_utc(instant: &DateTime<Utc>) -> String {
    instant.format(UTC_FORMAT).to_string()
}

/// Render a UNIX timestamp (seconds) with the UTC date-time granularity.
///
/// # Examples
/// ```
/// use openarchive::datetime::utc_from_timestamp;
///
/// assert_eq!(utc_from_timestamp(0).unwrap(), "1970-01-01T00:00:00Z");
/// assert_eq!(utc_from_timestamp(60).unwrap(), "1970-01-01T00:01:00Z");
/// ```
pub fn utc_from_timestamp(seconds: i64) -> Result<String> {
    DateTime::from_timestamp(seconds, 0)
        .map(|instant| format_utc(&instant))
        .ok_or_else(|| OaiError::InvalidInputFormat(seconds.to_string()))
}

/// Parse a string written in the UTC date-time granularity.
///
/// Date-only strings are rejected: the reverse conversion needs full precision.
pub fn parse_utc(utc: &str) -> Result<DateTime<Utc>> {
    if !UTC_PATTERN.is_match(utc) {
        return Err(OaiError::InvalidInputFormat(utc.to_string()));
    }

    NaiveDateTime::parse_from_str(utc, UTC_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| OaiError::InvalidInputFormat(utc.to_string()))
}

/// Parse a local wall-clock string (`YYYY-MM-DD hh:mm:ss`, or `YYYY-MM-DD` as midnight).
fn parse_local(local: &str) -> Result<NaiveDateTime> {
    let invalid = || OaiError::InvalidInputFormat(local.to_string());

    if LOCAL_PATTERN.is_match(local) {
        NaiveDateTime::parse_from_str(local, LOCAL_FORMAT).map_err(|_| invalid())
    } else if DATE_PATTERN.is_match(local) {
        NaiveDate::parse_from_str(local, DATE_FORMAT)
            .map_err(|_| invalid())?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(invalid)
    } else {
        Err(invalid())
    }
}

/// Convert a local wall-clock string in `zone` to the UTC date-time granularity.
///
/// Ambiguous wall-clock times (a DST fold) resolve to the earliest instant.
/// Times that do not exist in `zone` (a DST gap) are rejected.
pub fn utc_from_local<Tz: TimeZone>(local: &str, zone: &Tz) -> Result<String> {
    let naive = parse_local(local)?;

    let instant = zone.from_local_datetime(&naive).earliest().ok_or_else(|| {
        OaiError::InvalidInputFormat(format!("{local} does not exist in the local time zone"))
    })?;

    Ok(format_utc(&instant.with_timezone(&Utc)))
}

/// Convert a UTC date-time granularity string to local wall-clock time in `zone`.
pub fn local_from_utc<Tz>(utc: &str, zone: &Tz) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let instant = parse_utc(utc)?;
    Ok(instant
        .with_timezone(zone)
        .format(LOCAL_FORMAT)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn offset_hours(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    #[test]
    fn test_utc_from_local_daylight_saving_offset() {
        let utc = utc_from_local("2022-01-01 20:00:00", &offset_hours(13)).unwrap();
        assert_eq!(utc, "2022-01-01T07:00:00Z");
    }

    #[test]
    fn test_utc_from_local_standard_offset() {
        let utc = utc_from_local("2022-01-01 20:00:00", &offset_hours(12)).unwrap();
        assert_eq!(utc, "2022-01-01T08:00:00Z");
    }

    #[test]
    fn test_utc_from_local_crosses_date_line() {
        let utc = utc_from_local("2022-01-01 05:00:00", &offset_hours(13)).unwrap();
        assert_eq!(utc, "2021-12-31T16:00:00Z");
    }

    #[test]
    fn test_utc_from_local_date_only_is_midnight() {
        let utc = utc_from_local("2022-01-01", &offset_hours(-5)).unwrap();
        assert_eq!(utc, "2022-01-01T05:00:00Z");
    }

    #[test]
    fn test_utc_from_local_rejects_unknown_format() {
        for input in [
            "2022/01/01 20:00:00",
            "2022-01-01T20:00:00Z",
            "2022-01-01 20:00",
            "2022-13-01 20:00:00",
            "",
        ] {
            assert!(
                matches!(
                    utc_from_local(input, &Utc),
                    Err(OaiError::InvalidInputFormat(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_local_from_utc() {
        let local = local_from_utc("2022-01-01T07:00:00Z", &offset_hours(13)).unwrap();
        assert_eq!(local, "2022-01-01 20:00:00");

        let local = local_from_utc("2022-01-01T07:00:00Z", &offset_hours(12)).unwrap();
        assert_eq!(local, "2022-01-01 19:00:00");
    }

    #[test]
    fn test_local_from_utc_rejects_non_utc_formats() {
        for input in ["2022-01-01 07:00:00", "2022-01-01", "2022-01-01T07:00:00+00:00"] {
            assert!(
                matches!(
                    local_from_utc(input, &Utc),
                    Err(OaiError::InvalidInputFormat(_))
                ),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_round_trip_local_utc_local() {
        let zone = offset_hours(13);
        let utc = utc_from_local("2022-01-01 20:00:00", &zone).unwrap();
        assert_eq!(local_from_utc(&utc, &zone).unwrap(), "2022-01-01 20:00:00");
    }

    #[test]
    fn test_is_supported_granularity_invalid() {
        assert!(!is_supported_granularity("2020/01/01"));
        assert!(!is_supported_granularity("2020-01-01T"));
        assert!(!is_supported_granularity("2020-01-1"));
        assert!(!is_supported_granularity("2020-1-01"));
        assert!(!is_supported_granularity("2020/01/01T01:00:00Z"));
        assert!(!is_supported_granularity("2020/01/01T1:00:00Z"));
        assert!(!is_supported_granularity("2020-01-01T1:00:00Z"));
        assert!(!is_supported_granularity("2020-01-01T01:00:0Z"));
        assert!(!is_supported_granularity("2020-01-01T01:00:00"));
        assert!(!is_supported_granularity("2020-01-01T01:00:00+01:00"));
        assert!(!is_supported_granularity("2020-01-01T01:00Z"));
    }

    #[test]
    fn test_is_supported_granularity_valid() {
        assert!(is_supported_granularity("2020-01-01"));
        assert!(is_supported_granularity("2020-01-01T01:00:00Z"));
    }

    #[test]
    fn test_is_supported_granularity_rejects_impossible_values() {
        assert!(!is_supported_granularity("2020-02-30"));
        assert!(!is_supported_granularity("2020-13-01"));
        assert!(!is_supported_granularity("2020-01-01T25:00:00Z"));
    }

    #[test]
    fn test_granularity_detect() {
        assert_eq!(Granularity::detect("2020-01-01"), Some(Granularity::Day));
        assert_eq!(
            Granularity::detect("2020-01-01T01:00:00Z"),
            Some(Granularity::Second)
        );
        assert_eq!(Granularity::detect("yesterday"), None);
        assert_eq!(Granularity::Second.as_str(), crate::config::SUPPORTED_GRANULARITY);
    }

    #[test]
    fn test_utc_from_timestamp() {
        assert_eq!(utc_from_timestamp(0).unwrap(), "1970-01-01T00:00:00Z");
        assert_eq!(utc_from_timestamp(60).unwrap(), "1970-01-01T00:01:00Z");
        assert_eq!(
            utc_from_timestamp(1_640_998_800).unwrap(),
            "2022-01-01T01:00:00Z"
        );
        assert!(utc_from_timestamp(i64::MAX).is_err());
    }

    #[test]
    fn test_utc_from_local_across_auckland_daylight_saving() {
        use chrono_tz::Pacific::Auckland;

        let utc = utc_from_local("2022-01-01 20:00:00", &Auckland).unwrap();
        assert_eq!(utc, "2022-01-01T07:00:00Z");
        assert_eq!(
            local_from_utc(&utc, &Auckland).unwrap(),
            "2022-01-01 20:00:00"
        );

        let utc = utc_from_local("2022-07-01 20:00:00", &Auckland).unwrap();
        assert_eq!(utc, "2022-07-01T08:00:00Z");
    }

    #[test]
    fn test_utc_from_local_fold_resolves_to_earliest_instant() {
        use chrono_tz::Pacific::Auckland;

        // Clocks go back from 03:00 NZDT to 02:00 NZST, so 02:30 happens twice
        let utc = utc_from_local("2022-04-03 02:30:00", &Auckland).unwrap();
        assert_eq!(utc, "2022-04-02T13:30:00Z");
    }

    #[test]
    fn test_utc_from_local_rejects_time_in_gap() {
        use chrono_tz::Pacific::Auckland;

        // Clocks jump from 02:00 NZST to 03:00 NZDT
        assert!(matches!(
            utc_from_local("2022-09-25 02:30:00", &Auckland),
            Err(OaiError::InvalidInputFormat(_))
        ));
    }
}
