//! Due-date parsing and urgency classification.
//!
//! Portal due cells carry local wall-clock times in a handful of formats
//! (`2024/05/10 23:55`, `2024-05-10T23:55`, `May 10, 2024 11:55 pm`),
//! often wrapped in other text. A bare date (`2024/05/10`) means 00:00 of that day. Everything here works on naive local times;
//! callers pass `now` in the same frame.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

static NUMERIC_DUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})(?:\s*\([^)]*\))?[\sT]+(午前|午後)?\s*(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp][Mm])?",
    )
    .expect("numeric due-date regex")
});

static ENGLISH_DUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([A-Za-z]{3})[a-z]*\.?\s+(\d{1,2}),\s*(\d{4})\s+(\d{1,2}):(\d{2})(?::(\d{2}))?\s*([AaPp][Mm])?",
    )
    .expect("english due-date regex")
});

static DATE_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})[/\-](\d{1,2})[/\-](\d{1,2})").expect("date-only regex")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// First date-time found in `text`, or `None`.
pub fn parse_due(text: &str) -> Option<NaiveDateTime> {
    if let Some(c) = NUMERIC_DUE.captures(text) {
        let pm = c.get(4).map(|m| m.as_str() == "午後")
            .or_else(|| c.get(8).map(|m| m.as_str().eq_ignore_ascii_case("pm")));
        return build(
            c[1].parse().ok()?,
            c[2].parse().ok()?,
            c[3].parse().ok()?,
            c[5].parse().ok()?,
            c[6].parse().ok()?,
            c.get(7).map_or(Some(0), |m| m.as_str().parse().ok())?,
            pm,
        );
    }
    if let Some(c) = ENGLISH_DUE.captures(text) {
        let month = c[1].to_ascii_lowercase();
        let month = MONTHS.iter().position(|m| *m == month)? as u32 + 1;
        return build(
            c[3].parse().ok()?,
            month,
            c[2].parse().ok()?,
            c[4].parse().ok()?,
            c[5].parse().ok()?,
            c.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?,
            c.get(7).map(|m| m.as_str().eq_ignore_ascii_case("pm")),
        );
    }
    let c = DATE_ONLY.captures(text)?;
    build(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?, 0, 0, 0, None)
}

fn build(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, pm: Option<bool>) -> Option<NaiveDateTime> {
    let h = match pm {
        Some(true) if h < 12 => h + 12,
        Some(false) if h == 12 => 0,
        _ => h,
    };
    let date = NaiveDate::from_ymd_opt(y, mo, d)?;
    let time = NaiveTime::from_hms_opt(h, mi, s)?;
    Some(date.and_time(time))
}

/// True when `text` parses to a moment before `now`. Unparsable text is never expired.
pub fn is_expired(text: &str, now: NaiveDateTime) -> bool {
    parse_due(text).is_some_and(|due| due < now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    /// Less than 24 hours left (or already past).
    Urgent,
    /// Less than 5 days.
    Warning,
    /// Less than 14 days.
    Safe,
    FarFuture,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Urgent => "URGENT",
            Urgency::Warning => "SOON",
            Urgency::Safe => "OK",
            Urgency::FarFuture => "LATER",
        }
    }
}

pub fn classify(due: NaiveDateTime, now: NaiveDateTime) -> Urgency {
    let left = due - now;
    if left < Duration::hours(24) {
        Urgency::Urgent
    } else if left < Duration::days(5) {
        Urgency::Warning
    } else if left < Duration::days(14) {
        Urgency::Safe
    } else {
        Urgency::FarFuture
    }
}

/// `"{days}d {hours}h left"`, whole units rounded down.
pub fn time_left(due: NaiveDateTime, now: NaiveDateTime) -> String {
    let hours = (due - now).num_hours();
    format!("{}d {}h left", hours / 24, hours % 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn parses_portal_formats() {
        assert_eq!(parse_due("2024/05/10 23:55"), Some(at(2024, 5, 10, 23, 55)));
        assert_eq!(parse_due("2024-5-1 9:05"), Some(at(2024, 5, 1, 9, 5)));
        assert_eq!(parse_due("2024-05-10T23:55:00"), Some(at(2024, 5, 10, 23, 55)));
        assert_eq!(parse_due(" 締切: 2024/05/10 (金) 23:55 "), Some(at(2024, 5, 10, 23, 55)));
        assert_eq!(parse_due("2024/05/10 午後 1:30"), Some(at(2024, 5, 10, 13, 30)));
        assert_eq!(parse_due("May 10, 2024 11:55 pm"), Some(at(2024, 5, 10, 23, 55)));
        assert_eq!(parse_due("Dec 1, 2024 12:00 am"), Some(at(2024, 12, 1, 0, 0)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_due(""), None);
        assert_eq!(parse_due("no due date"), None);
        assert_eq!(parse_due("2024/13/40 10:00"), None);
        assert_eq!(parse_due("2024/13/40"), None);
    }

    #[test]
    fn bare_date_is_start_of_day() {
        assert_eq!(parse_due("2024/05/10"), Some(at(2024, 5, 10, 0, 0)));
        assert_eq!(parse_due("締切: 2024-5-9"), Some(at(2024, 5, 9, 0, 0)));
        assert!(is_expired("2024/05/10", at(2024, 5, 10, 0, 1)));
        assert!(!is_expired("2024/05/10", at(2024, 5, 9, 23, 59)));
    }

    #[test]
    fn expiry() {
        let now = at(2024, 4, 1, 12, 0);
        assert!(!is_expired("2099/01/01 10:00", now));
        assert!(is_expired("2020/01/01 10:00", now));
        assert!(!is_expired("sometime", now));
    }

    #[test]
    fn urgency_bands() {
        let now = at(2024, 4, 1, 0, 0);
        assert_eq!(classify(at(2024, 4, 1, 23, 0), now), Urgency::Urgent);
        assert_eq!(classify(at(2024, 4, 3, 0, 0), now), Urgency::Warning);
        assert_eq!(classify(at(2024, 4, 10, 0, 0), now), Urgency::Safe);
        assert_eq!(classify(at(2024, 5, 1, 0, 0), now), Urgency::FarFuture);
    }

    #[test]
    fn time_left_format() {
        let now = at(2024, 4, 1, 0, 0);
        assert_eq!(time_left(at(2024, 4, 3, 5, 30), now), "2d 5h left");
        assert_eq!(time_left(at(2024, 4, 1, 0, 59), now), "0d 0h left");
    }
}
