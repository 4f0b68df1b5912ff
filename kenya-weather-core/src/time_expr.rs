//! Time references in free-text weather queries.
//!
//! [`extract_time`] turns phrases like "at 3 PM", "in 2 hours" or "tomorrow
//! morning" into a concrete instant relative to a caller-supplied `now`.
//! It never reads the wall clock.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime};
use regex::Regex;

struct TimePatterns {
    clock_12h: Regex,
    clock_24h: Regex,
    noon: Regex,
    hours_from_now: Regex,
    an_hour_from_now: Regex,
    minutes_from_now: Regex,
    tomorrow: Regex,
    tonight: Regex,
    evening: Regex,
    afternoon: Regex,
    morning: Regex,
}

static TIME_PATTERNS: LazyLock<TimePatterns> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).expect("Invalid time regex");

    TimePatterns {
        // "3 PM", "3pm", "10:30am", "7 p.m."
        clock_12h: re(r"(?i)\b(\d{1,2})(?::([0-5]\d))?\s*([ap])\.?\s?m\b"),
        // "15:00"
        clock_24h: re(r"\b([01]?\d|2[0-3]):([0-5]\d)\b"),
        noon: re(r"(?i)\b(?:noon|midday|adhuhuri)\b"),
        hours_from_now: re(r"(?i)\b(?:in|next)\s+(\d{1,3})\s+(?:hours?|hrs?)\b"),
        an_hour_from_now: re(r"(?i)\bin\s+an?\s+hour\b"),
        minutes_from_now: re(r"(?i)\b(?:in|next)\s+(\d{1,4})\s+(?:minutes?|mins?)\b"),
        tomorrow: re(r"(?i)\b(?:tomorrow|kesho)\b"),
        tonight: re(r"(?i)\b(?:tonight|night|usiku)\b"),
        evening: re(r"(?i)\b(?:evening|jioni)\b"),
        afternoon: re(r"(?i)\b(?:afternoon|alasiri)\b"),
        morning: re(r"(?i)\b(?:morning|asubuhi)\b"),
    }
});

/// Hour of day each named period stands for.
const MORNING_HOUR: u32 = 9;
const AFTERNOON_HOUR: u32 = 14;
const EVENING_HOUR: u32 = 18;
const TONIGHT_HOUR: u32 = 20;
const TOMORROW_HOUR: u32 = MORNING_HOUR;

/// Resolve the time a query refers to, or `None` when it names no time.
///
/// Clock times are checked first, then numeric offsets, then named periods.
/// A clock time that has already passed today rolls over to tomorrow unless
/// the query says "tomorrow" itself. Named periods land on `now`'s date.
pub fn extract_time(query: &str, now: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    let tp = &*TIME_PATTERNS;
    let says_tomorrow = tp.tomorrow.is_match(query);

    if let Some(time) = clock_time(query) {
        return if says_tomorrow {
            on_date(now.date_naive().succ_opt()?, time, now.offset())
        } else {
            let candidate = on_date(now.date_naive(), time, now.offset())?;
            Some(if candidate < *now {
                candidate + Duration::days(1)
            } else {
                candidate
            })
        };
    }

    if let Some(offset) = relative_offset(query) {
        return Some(*now + offset);
    }

    let period_hour = if tp.tonight.is_match(query) {
        Some(TONIGHT_HOUR)
    } else if tp.evening.is_match(query) {
        Some(EVENING_HOUR)
    } else if tp.afternoon.is_match(query) {
        Some(AFTERNOON_HOUR)
    } else if tp.morning.is_match(query) {
        Some(MORNING_HOUR)
    } else {
        None
    };

    let (date, hour) = match (says_tomorrow, period_hour) {
        (true, hour) => (now.date_naive().succ_opt()?, hour.unwrap_or(TOMORROW_HOUR)),
        (false, Some(hour)) => (now.date_naive(), hour),
        (false, None) => return None,
    };

    on_date(date, NaiveTime::from_hms_opt(hour, 0, 0)?, now.offset())
}

/// First valid explicit clock reading in the query.
fn clock_time(query: &str) -> Option<NaiveTime> {
    let tp = &*TIME_PATTERNS;

    let twelve_hour = tp.clock_12h.captures_iter(query).find_map(|caps| {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let is_pm = caps.get(3)?.as_str().eq_ignore_ascii_case("p");
        let hour = match (hour, is_pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        NaiveTime::from_hms_opt(hour, minute, 0)
    });
    if twelve_hour.is_some() {
        return twelve_hour;
    }

    let twenty_four_hour = tp.clock_24h.captures_iter(query).find_map(|caps| {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)
    });
    if twenty_four_hour.is_some() {
        return twenty_four_hour;
    }

    if tp.noon.is_match(query) {
        return NaiveTime::from_hms_opt(12, 0, 0);
    }

    None
}

fn relative_offset(query: &str) -> Option<Duration> {
    let tp = &*TIME_PATTERNS;

    if let Some(caps) = tp.hours_from_now.captures(query) {
        let hours: i64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(Duration::hours(hours));
    }
    if tp.an_hour_from_now.is_match(query) {
        return Some(Duration::hours(1));
    }
    if let Some(caps) = tp.minutes_from_now.captures(query) {
        let minutes: i64 = caps.get(1)?.as_str().parse().ok()?;
        return Some(Duration::minutes(minutes));
    }

    None
}

fn on_date(date: NaiveDate, time: NaiveTime, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    date.and_time(time).and_local_timezone(*offset).single()
}
