//! Timestamp parsing for the date formats sources display.
//!
//! Sources show dates in their own local time zone and formats, sometimes as
//! relative phrases ("2 hours ago") and sometimes without a year. Everything
//! here resolves to unix seconds.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Format of year-less release stamps, e.g. `01-02 13:45`.
pub const MONTH_DAY_FORMAT: &str = "%m-%d %H:%M";

static RELATIVE_AGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(min|mins|minute|minutes|hour|hours|day|days)\s+ago$")
        .expect("valid relative time regex")
});

/// Interprets `naive` in `tz` and returns unix seconds.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
pub fn local_to_unix(naive: NaiveDateTime, tz: Tz) -> Result<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| Error::parse(format!("'{naive}' does not exist in {tz}")))
}

/// Parses a date-time `text` with a chrono `format` in the time zone `tz`.
pub fn parse_datetime(text: &str, format: &str, tz: Tz) -> Result<i64> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), format)
        .map_err(|e| Error::parse(format!("Invalid date '{text}' for '{format}': {e}")))?;
    local_to_unix(naive, tz)
}

/// Parses a date-only `text` with a chrono `format`, at midnight in `tz`.
pub fn parse_date(text: &str, format: &str, tz: Tz) -> Result<i64> {
    let date = NaiveDate::parse_from_str(text.trim(), format)
        .map_err(|e| Error::parse(format!("Invalid date '{text}' for '{format}': {e}")))?;
    local_to_unix(date.and_time(chrono::NaiveTime::MIN), tz)
}

/// Rewrites a relative phrase into an absolute `MM-DD HH:mm` stamp computed
/// against `now`. Returns `None` if `text` is not a relative phrase.
///
/// Understood phrases: `N min(s)/minute(s)/hour(s)/day(s) ago`, `today`,
/// `yesterday` (case-insensitive).
///
/// # Examples
///
/// ```rust
/// use chrono::TimeZone;
/// use shiori::dates::relative_to_month_day;
///
/// let now = chrono_tz::Asia::Hong_Kong.with_ymd_and_hms(2018, 1, 2, 10, 30, 0).unwrap();
/// assert_eq!(relative_to_month_day("3 hours ago", now).as_deref(), Some("01-02 07:30"));
/// assert_eq!(relative_to_month_day("Yesterday", now).as_deref(), Some("01-01 10:30"));
/// assert_eq!(relative_to_month_day("12-28 09:00", now), None);
/// ```
pub fn relative_to_month_day(text: &str, now: DateTime<Tz>) -> Option<String> {
    let text = text.trim();

    let moment = if text.eq_ignore_ascii_case("today") {
        now
    } else if text.eq_ignore_ascii_case("yesterday") {
        now - Duration::days(1)
    } else {
        let caps = RELATIVE_AGO.captures(text)?;
        let amount: i64 = caps[1].parse().ok()?;
        let unit = caps[2].to_ascii_lowercase();
        let delta = if unit.starts_with("min") {
            Duration::minutes(amount)
        } else if unit.starts_with("hour") {
            Duration::hours(amount)
        } else {
            Duration::days(amount)
        };
        now - delta
    };

    Some(moment.format(MONTH_DAY_FORMAT).to_string())
}

/// Resolves an `MM-DD HH:mm` stamp in the latest year no later than `year`
/// in which that day exists, returning the year used and the timestamp.
///
/// Only `02-29` ever moves, back to the previous leap year.
pub fn month_day_on_or_before(stamp: &str, year: i32, tz: Tz) -> Result<(i32, i64)> {
    let with_leap_year = format!("2000-{}", stamp.trim());
    let template = NaiveDateTime::parse_from_str(&with_leap_year, &format!("%Y-{MONTH_DAY_FORMAT}"))
        .map_err(|e| Error::parse(format!("Invalid date '{stamp}' for '{MONTH_DAY_FORMAT}': {e}")))?;

    // Leap years are at most eight years apart.
    let (year, date) = (year - 8..=year)
        .rev()
        .find_map(|y| NaiveDate::from_ymd_opt(y, template.month(), template.day()).map(|d| (y, d)))
        .ok_or_else(|| Error::parse(format!("'{stamp}' does not exist on or before {year}")))?;

    Ok((year, local_to_unix(date.and_time(template.time()), tz)?))
}

/// Assigns years to year-less release stamps.
///
/// `stamps` are `MM-DD HH:mm` values in the order the source displays them,
/// newest first. The walk starts in `seed_year` (the year of the series'
/// last update). Each stamp is resolved in the current year; if that puts it
/// later than its predecessor, the list has crossed a year boundary, so the
/// current year is decremented and the stamp resolved again. A `02-29`
/// stamp falls back to the nearest earlier leap year. Each step only looks
/// at the previous resolved timestamp.
///
/// # Examples
///
/// ```rust
/// use shiori::dates::infer_years;
///
/// let tz = chrono_tz::Asia::Hong_Kong;
/// let stamps = ["01-02 10:00", "12-28 10:00", "12-20 10:00"];
/// let resolved = infer_years(&stamps, 2018, tz).unwrap();
///
/// let years: Vec<i32> = resolved
///     .iter()
///     .map(|&ts| {
///         use chrono::Datelike;
///         chrono::DateTime::from_timestamp(ts, 0).unwrap().with_timezone(&tz).year()
///     })
///     .collect();
/// assert_eq!(years, vec![2018, 2017, 2017]);
/// ```
pub fn infer_years<S: AsRef<str>>(stamps: &[S], seed_year: i32, tz: Tz) -> Result<Vec<i64>> {
    let (_, _, resolved) = stamps.iter().try_fold(
        (seed_year, None::<i64>, Vec::with_capacity(stamps.len())),
        |(year, previous, mut resolved), stamp| {
            let stamp = stamp.as_ref();
            let (mut year, mut timestamp) = month_day_on_or_before(stamp, year, tz)?;

            if previous.is_some_and(|prev| timestamp > prev) {
                (year, timestamp) = month_day_on_or_before(stamp, year - 1, tz)?;
            }

            resolved.push(timestamp);
            Ok::<_, Error>((year, Some(timestamp), resolved))
        },
    )?;

    Ok(resolved)
}

/// Year of a unix timestamp as seen in `tz`.
pub fn year_in(timestamp: i64, tz: Tz) -> Result<i32> {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&tz).year())
        .ok_or_else(|| Error::parse(format!("Timestamp {timestamp} out of range")))
}

/// Parses an RSS `pubDate`.
///
/// Accepts RFC 2822 (`Sat, 03 Mar 2018 12:00:00 +0000`). Feeds that omit the
/// offset or use a long weekday form are read in `fallback_tz` with the
/// formats `%A, %d %b %Y, %H:%M:%S` or `%Y-%m-%d %H:%M:%S`.
pub fn parse_pub_date(text: &str, fallback_tz: Tz) -> Result<i64> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Ok(dt.timestamp());
    }

    ["%A, %d %b %Y, %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%a, %d %b %Y %H:%M:%S"]
        .iter()
        .find_map(|format| parse_datetime(text, format, fallback_tz).ok())
        .ok_or_else(|| Error::parse(format!("Unrecognised pubDate '{text}'")))
}
