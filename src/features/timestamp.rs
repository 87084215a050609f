//! Lenient timestamp parsing for raw order/pickup fields

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

/// How to read an ambiguous numeric date such as `03/04/2022`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateConvention {
    DayFirst,
    MonthFirst,
}

const DAY_FIRST_DATES: [&str; 7] = [
    "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%m-%d-%Y", "%m/%d/%Y",
];

const MONTH_FIRST_DATES: [&str; 7] = [
    "%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y", "%m/%d/%Y", "%m.%d.%Y", "%d-%m-%Y", "%d/%m/%Y",
];

/// Date orderings that only one convention can produce
const STRICT_DAY_FIRST: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];
const STRICT_MONTH_FIRST: [&str; 3] = ["%m-%d-%Y", "%m/%d/%Y", "%m.%d.%Y"];

const TIMES: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// ISO dates followed by a UTC offset; the wall-clock time is kept
const OFFSET_DATETIMES: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Parse a timestamp string; `None` means the value is missing or malformed.
///
/// The date part is tried in convention order, falling back to the other
/// ordering when the preferred one yields an invalid date (e.g. day 13 read
/// as a month). A missing time part means midnight. Values carrying a UTC
/// offset or `Z` keep their local wall-clock time.
pub fn parse_timestamp(value: &str, convention: DateConvention) -> Option<NaiveDateTime> {
    let value = value.trim();
    if is_missing_token(value) {
        return None;
    }
    if let Some(ts) = parse_with_offset(value) {
        return Some(ts);
    }

    let (date_part, time_part) = split_date_time(value);
    let date = parse_date(date_part, convention)?;
    let time = match time_part {
        Some(t) if !t.is_empty() => parse_time(t)?,
        _ => NaiveTime::from_hms_opt(0, 0, 0)?,
    };

    Some(date.and_time(time))
}

/// Parse a whole column with a single date convention.
///
/// The convention comes from the first value whose date only reads one way
/// (a day above 12 in either position); `preferred` applies when every
/// value is ambiguous or ISO ordered.
pub fn parse_timestamps<S: AsRef<str>>(
    values: &[Option<S>],
    preferred: DateConvention,
) -> Vec<Option<NaiveDateTime>> {
    let convention = resolve_convention(values, preferred);
    values
        .iter()
        .map(|v| v.as_ref().and_then(|s| parse_timestamp(s.as_ref(), convention)))
        .collect()
}

/// Date convention implied by the first unambiguous value of a column
pub fn resolve_convention<S: AsRef<str>>(
    values: &[Option<S>],
    preferred: DateConvention,
) -> DateConvention {
    values
        .iter()
        .flatten()
        .find_map(|v| {
            let value: &str = v.as_ref();
            let (date_part, _) = split_date_time(value.trim());
            let day_first = parses_with_any(date_part, &STRICT_DAY_FIRST);
            let month_first = parses_with_any(date_part, &STRICT_MONTH_FIRST);
            match (day_first, month_first) {
                (true, false) => Some(DateConvention::DayFirst),
                (false, true) => Some(DateConvention::MonthFirst),
                _ => None,
            }
        })
        .unwrap_or(preferred)
}

fn parses_with_any(value: &str, formats: &[&str]) -> bool {
    formats
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

fn split_date_time(value: &str) -> (&str, Option<&str>) {
    match value.split_once(|c: char| c == 'T' || c.is_whitespace()) {
        Some((d, t)) => (d, Some(t.trim())),
        None => (value, None),
    }
}

fn parse_with_offset(value: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .or_else(|| value.parse::<DateTime<FixedOffset>>().ok())
        .or_else(|| {
            OFFSET_DATETIMES
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        })
        .map(|ts| ts.naive_local())
}

fn parse_date(value: &str, convention: DateConvention) -> Option<NaiveDate> {
    let formats = match convention {
        DateConvention::DayFirst => &DAY_FIRST_DATES,
        DateConvention::MonthFirst => &MONTH_FIRST_DATES,
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    TIMES
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

fn is_missing_token(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("nat")
        || value.eq_ignore_ascii_case("none")
        || value.eq_ignore_ascii_case("null")
}

/// Minutes between two timestamps, fractional; missing if either side is.
pub fn minutes_between(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Option<f64> {
    let (start, end) = (start?, end?);
    let delta = end.signed_duration_since(start);
    Some(delta.num_milliseconds() as f64 / 60_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_iso_datetime() {
        let ts = parse_timestamp("2024-01-01 10:00", DateConvention::DayFirst).unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.month(), 1);
    }

    #[test]
    fn test_day_first_ambiguous() {
        let ts = parse_timestamp("03-04-2022 11:30:00", DateConvention::DayFirst).unwrap();
        assert_eq!(ts.day(), 3);
        assert_eq!(ts.month(), 4);

        let ts = parse_timestamp("03-04-2022 11:30:00", DateConvention::MonthFirst).unwrap();
        assert_eq!(ts.day(), 4);
        assert_eq!(ts.month(), 3);
    }

    #[test]
    fn test_unambiguous_day_falls_back() {
        let ts = parse_timestamp("19-03-2022 08:15", DateConvention::MonthFirst).unwrap();
        assert_eq!(ts.day(), 19);
        assert_eq!(ts.month(), 3);
    }

    #[test]
    fn test_date_only_is_midnight() {
        let ts = parse_timestamp("2022-03-19", DateConvention::DayFirst).unwrap();
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.minute(), 0);
    }

    #[test]
    fn test_t_separator_and_fraction() {
        let ts = parse_timestamp("2024-01-01T10:15:30.250", DateConvention::DayFirst).unwrap();
        assert_eq!(ts.second(), 30);
        assert_eq!(ts.minute(), 15);
    }

    #[test]
    fn test_missing_and_malformed() {
        assert!(parse_timestamp("", DateConvention::DayFirst).is_none());
        assert!(parse_timestamp("NaN", DateConvention::DayFirst).is_none());
        assert!(parse_timestamp("19-03-2022 nan", DateConvention::DayFirst).is_none());
        assert!(parse_timestamp("not a date", DateConvention::DayFirst).is_none());
        assert!(parse_timestamp("2024-13-45 10:00", DateConvention::DayFirst).is_none());
    }

    #[test]
    fn test_offset_and_utc_suffix() {
        let ts = parse_timestamp("2024-01-01T10:00:00Z", DateConvention::DayFirst).unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.day(), 1);

        let ts = parse_timestamp("2024-01-01 10:00:00+05:30", DateConvention::DayFirst).unwrap();
        assert_eq!(ts.hour(), 10);
        assert_eq!(ts.minute(), 0);

        let ts = parse_timestamp("2024-01-06T23:15:00-0800", DateConvention::MonthFirst).unwrap();
        assert_eq!(ts.hour(), 23);
        assert_eq!(ts.day(), 6);
    }

    #[test]
    fn test_column_convention_from_first_unambiguous_value() {
        let values = [Some("13-03-2022 10:00"), Some("12-03-2022 10:00"), Some("11-03-2022 10:00")];
        assert_eq!(
            resolve_convention(&values, DateConvention::MonthFirst),
            DateConvention::DayFirst
        );

        let parsed = parse_timestamps(&values, DateConvention::MonthFirst);
        let days: Vec<u32> = parsed.iter().map(|ts| ts.unwrap().day()).collect();
        let months: Vec<u32> = parsed.iter().map(|ts| ts.unwrap().month()).collect();
        assert_eq!(days, vec![13, 12, 11]);
        assert_eq!(months, vec![3, 3, 3]);
    }

    #[test]
    fn test_column_convention_defaults_when_ambiguous() {
        let values = [None, Some("2022-03-04"), Some("03/04/2022")];
        assert_eq!(
            resolve_convention(&values, DateConvention::MonthFirst),
            DateConvention::MonthFirst
        );

        let values = [Some("04/25/2022"), Some("03/04/2022")];
        assert_eq!(
            resolve_convention(&values, DateConvention::DayFirst),
            DateConvention::MonthFirst
        );
        let parsed = parse_timestamps(&values, DateConvention::DayFirst);
        assert_eq!(parsed[1].unwrap().month(), 3);
        assert_eq!(parsed[1].unwrap().day(), 4);
    }

    #[test]
    fn test_minutes_between() {
        let a = parse_timestamp("2024-01-01 10:00", DateConvention::DayFirst);
        let b = parse_timestamp("2024-01-01 10:15", DateConvention::DayFirst);
        assert_eq!(minutes_between(a, b), Some(15.0));
        assert_eq!(minutes_between(a, None), None);
    }

    #[test]
    fn test_minutes_between_fractional_and_negative() {
        let a = parse_timestamp("2024-01-01 10:00:00", DateConvention::DayFirst);
        let b = parse_timestamp("2024-01-01 10:00:30", DateConvention::DayFirst);
        assert_eq!(minutes_between(a, b), Some(0.5));
        assert_eq!(minutes_between(b, a), Some(-0.5));
    }
}
