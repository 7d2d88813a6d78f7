//! Date and time expression scanning.
//!
//! Relative expressions resolve against the extractor's clock. Day-level
//! expressions normalize to midnight UTC of that day; clock times land on
//! the reference date. Unresolvable mentions ("asap") are still tagged,
//! just without a normalized value.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use regex::Regex;

use bl_protocol::{Entity, EntityKind, NormalizedValue, Span};

static RE_RELATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:day after tomorrow|tomorrow|today|tonight|yesterday|next week|next month|as soon as possible|asap|right away|immediately)\b",
    )
    .unwrap()
});

static RE_WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:(?:next|this)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .unwrap()
});

static RE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin\s+(\d{1,3})\s+(minute|hour|day|week)s?\b").unwrap());

static RE_ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());

// Day-first, the dominant convention in the markets this assistant serves.
static RE_SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

static RE_MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\b(?:\s+(\d{4}))?",
    )
    .unwrap()
});

static RE_AMPM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?::([0-5]\d))?\s*(am|pm)\b").unwrap());

// Hour range is constrained in the pattern so "25:99" never matches.
static RE_24H: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").unwrap());

pub(super) fn scan(text: &str, now: DateTime<Utc>, out: &mut Vec<Entity>) {
    scan_relative(text, now, out);
    scan_weekdays(text, now, out);
    scan_offsets(text, now, out);
    scan_dates(text, now, out);
    scan_clock_times(text, now, out);
}

fn scan_relative(text: &str, now: DateTime<Utc>, out: &mut Vec<Entity>) {
    for m in RE_RELATIVE.find_iter(text) {
        let days = match m.as_str().to_ascii_lowercase().as_str() {
            "today" | "tonight" => Some(0),
            "tomorrow" => Some(1),
            "day after tomorrow" => Some(2),
            "yesterday" => Some(-1),
            "next week" => Some(7),
            "next month" => Some(30),
            // "asap" and friends are urgency markers, not anchors.
            _ => None,
        };
        let mut entity =
            Entity::new(EntityKind::DateTime, m.as_str(), Span::new(m.start(), m.end()));
        if let Some(days) = days {
            entity = entity.with_normalized(NormalizedValue::Timestamp {
                at: day_start(now, days),
            });
        }
        out.push(entity);
    }
}

fn scan_weekdays(text: &str, now: DateTime<Utc>, out: &mut Vec<Entity>) {
    for caps in RE_WEEKDAY.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let target = match caps[1].to_ascii_lowercase().as_str() {
            "monday" => Weekday::Mon,
            "tuesday" => Weekday::Tue,
            "wednesday" => Weekday::Wed,
            "thursday" => Weekday::Thu,
            "friday" => Weekday::Fri,
            "saturday" => Weekday::Sat,
            _ => Weekday::Sun,
        };
        // Next occurrence, never today.
        let mut ahead = (target.num_days_from_monday() as i64
            - now.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
        if ahead == 0 {
            ahead = 7;
        }
        out.push(
            Entity::new(EntityKind::DateTime, m.as_str(), Span::new(m.start(), m.end()))
                .with_normalized(NormalizedValue::Timestamp {
                    at: day_start(now, ahead),
                }),
        );
    }
}

fn scan_offsets(text: &str, now: DateTime<Utc>, out: &mut Vec<Entity>) {
    for caps in RE_OFFSET.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let Ok(n) = caps[1].parse::<i64>() else { continue };
        let delta = match caps[2].to_ascii_lowercase().as_str() {
            "minute" => Duration::minutes(n),
            "hour" => Duration::hours(n),
            "day" => Duration::days(n),
            _ => Duration::weeks(n),
        };
        out.push(
            Entity::new(EntityKind::DateTime, m.as_str(), Span::new(m.start(), m.end()))
                .with_normalized(NormalizedValue::Timestamp { at: now + delta }),
        );
    }
}

fn scan_dates(text: &str, now: DateTime<Utc>, out: &mut Vec<Entity>) {
    for caps in RE_ISO_DATE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let (y, mo, d) = (parse_num(&caps[1]), parse_num(&caps[2]), parse_num(&caps[3]));
        out.push(date_entity(m, y as i32, mo, d));
    }
    for caps in RE_SLASH_DATE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let (d, mo, y) = (parse_num(&caps[1]), parse_num(&caps[2]), parse_num(&caps[3]));
        out.push(date_entity(m, y as i32, mo, d));
    }
    for caps in RE_MONTH_DATE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let d = parse_num(&caps[1]);
        let mo = month_number(&caps[2]);
        let y = caps
            .get(3)
            .map_or(now.year(), |g| parse_num(g.as_str()) as i32);
        out.push(date_entity(m, y, mo, d));
    }
}

fn scan_clock_times(text: &str, now: DateTime<Utc>, out: &mut Vec<Entity>) {
    for caps in RE_AMPM.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let hour = parse_num(&caps[1]);
        if !(1..=12).contains(&hour) {
            continue;
        }
        let minute = caps.get(2).map_or(0, |g| parse_num(g.as_str()));
        let hour = match caps[3].to_ascii_lowercase().as_str() {
            "pm" => hour % 12 + 12,
            _ => hour % 12,
        };
        out.push(clock_entity(m, now, hour, minute));
    }
    for caps in RE_24H.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push(clock_entity(m, now, parse_num(&caps[1]), parse_num(&caps[2])));
    }
}

/// Midnight UTC of the reference date shifted by whole days.
fn day_start(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(now.date_naive() + Duration::days(days)).and_time(NaiveTime::MIN))
}

/// Tag a calendar date; mentions that fail calendar validation stay
/// unnormalized rather than being dropped.
fn date_entity(m: regex::Match<'_>, year: i32, month: u32, day: u32) -> Entity {
    let mut entity = Entity::new(EntityKind::DateTime, m.as_str(), Span::new(m.start(), m.end()));
    if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
        entity = entity.with_normalized(NormalizedValue::Timestamp {
            at: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
        });
    }
    entity
}

fn clock_entity(m: regex::Match<'_>, now: DateTime<Utc>, hour: u32, minute: u32) -> Entity {
    let mut entity = Entity::new(EntityKind::DateTime, m.as_str(), Span::new(m.start(), m.end()));
    if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
        entity = entity.with_normalized(NormalizedValue::Timestamp {
            at: Utc.from_utc_datetime(&now.date_naive().and_time(time)),
        });
    }
    entity
}

/// Parse digits already vetted by a regex; the fallback is unreachable.
fn parse_num(digits: &str) -> u32 {
    digits.parse().unwrap_or(0)
}

fn month_number(name: &str) -> u32 {
    match name.to_ascii_lowercase().get(..3) {
        Some("jan") => 1,
        Some("feb") => 2,
        Some("mar") => 3,
        Some("apr") => 4,
        Some("may") => 5,
        Some("jun") => 6,
        Some("jul") => 7,
        Some("aug") => 8,
        Some("sep") => 9,
        Some("oct") => 10,
        Some("nov") => 11,
        _ => 12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Thursday morning.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 12, 9, 30, 0).unwrap()
    }

    fn entities(text: &str) -> Vec<Entity> {
        let mut out = Vec::new();
        scan(text, now(), &mut out);
        out
    }

    fn timestamp(e: &Entity) -> DateTime<Utc> {
        match e.normalized {
            Some(NormalizedValue::Timestamp { at }) => at,
            ref other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn tomorrow_resolves_to_next_midnight() {
        let out = entities("cancel my booking for tomorrow");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "tomorrow");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn day_after_tomorrow_wins_over_inner_tomorrow() {
        let out = entities("come the day after tomorrow please");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "day after tomorrow");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn yesterday_goes_backwards() {
        let out = entities("the technician came yesterday");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 11, 0, 0, 0).unwrap());
    }

    #[test]
    fn weekday_resolves_to_next_occurrence() {
        // Reference is Thursday; Monday is four days out.
        let out = entities("book a slot on monday");
        assert_eq!(out[0].text, "monday");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap());

        // "next friday" is tomorrow from a Thursday.
        let out = entities("see you next friday");
        assert_eq!(out[0].text, "next friday");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 13, 0, 0, 0).unwrap());
    }

    #[test]
    fn same_weekday_lands_a_week_out() {
        let out = entities("reschedule to thursday");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn offset_keeps_time_of_day() {
        let out = entities("send someone in 3 days");
        assert_eq!(out[0].text, "in 3 days");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 15, 9, 30, 0).unwrap());
    }

    #[test]
    fn iso_and_slash_dates_parse() {
        let out = entities("on 2026-04-01 or 15/01/2026");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap());
        // Day-first.
        assert_eq!(timestamp(&out[1]), Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn month_name_dates_default_to_reference_year() {
        let out = entities("book for the 5th of April");
        assert_eq!(out[0].text, "5th of April");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 4, 5, 0, 0, 0).unwrap());

        let out = entities("come on 20 jan 2027");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2027, 1, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn invalid_calendar_date_stays_unnormalized() {
        let out = entities("ref 2026-99-99 noted");
        assert_eq!(out.len(), 1);
        assert!(out[0].normalized.is_none());
    }

    #[test]
    fn clock_times_land_on_reference_date() {
        let out = entities("slot at 5 pm works");
        assert_eq!(out[0].text, "5 pm");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 12, 17, 0, 0).unwrap());

        let out = entities("anytime before 17:30");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 12, 17, 30, 0).unwrap());
    }

    #[test]
    fn twelve_am_is_midnight() {
        let out = entities("delivery at 12 am");
        assert_eq!(timestamp(&out[0]), Utc.with_ymd_and_hms(2026, 3, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn urgency_markers_are_tagged_without_anchor() {
        let out = entities("need a plumber asap");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text, "asap");
        assert!(out[0].normalized.is_none());
    }

    #[test]
    fn plain_verbs_do_not_match() {
        assert!(entities("I am happy to wait").is_empty());
        assert!(entities("may I ask something").is_empty());
    }
}
