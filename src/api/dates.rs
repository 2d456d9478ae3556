//! Calendar-day query parameters. Days are UTC and ranges are half-open.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::ApiError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `[start, end)` bounds on `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBounds {
    pub from: DateTime<Utc>,
    pub before: DateTime<Utc>,
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN))
}

/// Bounds from the start of `first` to the end of `last`. The last representable day has
/// no successor and is rejected.
fn bounds(first: NaiveDate, last: NaiveDate) -> Result<DayBounds, ApiError> {
    let before = last
        .succ_opt()
        .map(midnight)
        .ok_or_else(|| ApiError::bad_request("Invalid date: out of supported range"))?;
    Ok(DayBounds {
        from: midnight(first),
        before,
    })
}

fn require<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ApiError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("{} parameter is required", name))),
    }
}

fn parse_day(raw: &str, name: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ApiError::bad_request(format!("Invalid {} format. Use YYYY-MM-DD", name)))
}

/// One UTC day given as `YYYY-MM-DD`.
pub fn single_day(value: Option<&str>) -> Result<DayBounds, ApiError> {
    let day = parse_day(require(value, "date")?, "date")?;
    bounds(day, day)
}

/// Inclusive range of UTC days. `start_date` after `end_date` is rejected.
pub fn day_range(start: Option<&str>, end: Option<&str>) -> Result<DayBounds, ApiError> {
    let start = parse_day(require(start, "start_date")?, "start_date")?;
    let end = parse_day(require(end, "end_date")?, "end_date")?;
    if start > end {
        return Err(ApiError::bad_request("start_date must not be after end_date"));
    }

    bounds(start, end)
}

/// One UTC day given as `YYYY-MM-DD` or as Unix seconds falling within it.
pub fn day_or_timestamp(value: Option<&str>) -> Result<DayBounds, ApiError> {
    let raw = require(value, "date")?;
    let day = match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(day) => day,
        Err(_) => raw
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|instant| instant.date_naive())
            .ok_or_else(|| {
                ApiError::bad_request("Invalid date format. Use YYYY-MM-DD or Unix timestamp")
            })?,
    };

    bounds(day, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn single_day_covers_24_hours() {
        let bounds = single_day(Some("2024-02-28")).unwrap();
        assert_eq!(bounds.from, at("2024-02-28T00:00:00Z"));
        assert_eq!(bounds.before, at("2024-02-29T00:00:00Z"));
    }

    #[test]
    fn missing_or_bad_date() {
        assert!(single_day(None).is_err());
        assert!(single_day(Some("  ")).is_err());
        assert!(single_day(Some("28/02/2024")).is_err());
    }

    #[test]
    fn range_is_inclusive_of_end_day() {
        let bounds = day_range(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(bounds.from, at("2024-01-01T00:00:00Z"));
        assert_eq!(bounds.before, at("2024-02-01T00:00:00Z"));

        let same = day_range(Some("2024-01-01"), Some("2024-01-01")).unwrap();
        assert_eq!(same.before - same.from, Duration::days(1));
    }

    #[test]
    fn inverted_range_rejected() {
        let err = day_range(Some("2024-02-01"), Some("2024-01-01")).unwrap_err();
        assert_eq!(err.message(), "start_date must not be after end_date");
    }

    #[test]
    fn unix_seconds_select_their_utc_day() {
        // 2024-03-10T15:30:00Z
        let bounds = day_or_timestamp(Some("1710084600")).unwrap();
        assert_eq!(bounds.from, at("2024-03-10T00:00:00Z"));
        assert_eq!(day_or_timestamp(Some("2024-03-10")).unwrap(), bounds);
        assert!(day_or_timestamp(Some("yesterday")).is_err());
    }

    #[test]
    fn last_representable_day_is_rejected() {
        let err = single_day(Some("+262142-12-31")).unwrap_err();
        assert_eq!(err.message(), "Invalid date: out of supported range");

        assert!(day_range(Some("2024-01-01"), Some("+262142-12-31")).is_err());
        assert!(day_or_timestamp(Some("+262142-12-31")).is_err());
        // 8210266833600 falls on +262142-12-31
        assert!(day_or_timestamp(Some("8210266833600")).is_err());
    }

    #[test]
    fn day_before_the_last_still_works() {
        let bounds = single_day(Some("+262142-12-30")).unwrap();
        assert_eq!(bounds.before - bounds.from, Duration::days(1));
    }
}
