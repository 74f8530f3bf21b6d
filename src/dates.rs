//! Date/time utilities: parsing, formatting, calendar math, and the
//! recurrence expander.
//!
//! Every parser here degrades to `None` instead of erroring — dates routinely
//! arrive from partially-typed user input, and callers are expected to check
//! before use. All calendar comparisons work on naive wall-clock values; only
//! `is_today` consults the local clock.

use chrono::{Datelike, Days, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use std::cmp::Ordering;

use crate::constants::DEFAULT_MAX_OCCURRENCES;
use crate::event::{Event, Frequency};

/// Parse an ISO-8601 date or date-time string.
///
/// Accepts RFC 3339 (offset is dropped after converting to UTC), offset-less
/// `YYYY-MM-DDTHH:MM[:SS[.fff]]`, and bare `YYYY-MM-DD` (midnight). Returns
/// `None` for anything else; never panics.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Canonical ISO-8601 serialization used for generated instance dates.
pub fn format_iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// `YYYY-MM-DD`, for date input fields.
pub fn format_input_date(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `HH:MM`, for time input fields.
pub fn format_input_time(dt: NaiveDateTime) -> String {
    dt.format("%H:%M").to_string()
}

/// Long display form, e.g. "March 5, 2024".
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Short display form with time, e.g. "Mar 5, 2024 2:30 PM".
pub fn format_date_time(dt: NaiveDateTime) -> String {
    dt.format("%b %-d, %Y %-I:%M %p").to_string()
}

pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Whether `date` is today on the local clock.
pub fn is_today(date: NaiveDate) -> bool {
    date == Local::now().date_naive()
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(date)
}

/// Most recent `week_start` on or before `date`.
pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset =
        (date.weekday().num_days_from_sunday() + 7 - week_start.num_days_from_sunday()) % 7;
    date - Duration::days(i64::from(offset))
}

/// Day before the next `week_start` strictly after `date`.
pub fn end_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    start_of_week(date, week_start) + Duration::days(6)
}

/// Shift a date by whole calendar months, clamping the day-of-month when the
/// target month is shorter (Jan 31 + 1 month = Feb 29 in a leap year).
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// The dates filling the month grid for `month_date`: full weeks covering the
/// month, leading/trailing days from adjacent months included. The result is
/// always a multiple of 7 long and starts on `week_start`.
pub fn calendar_days(month_date: NaiveDate, week_start: Weekday) -> Vec<NaiveDate> {
    let grid_start = start_of_week(start_of_month(month_date), week_start);
    let grid_end = end_of_week(end_of_month(month_date), week_start);

    let mut days = Vec::new();
    let mut day = grid_start;
    while day <= grid_end {
        days.push(day);
        day += Duration::days(1);
    }
    days
}

/// Human-readable relative label for a date: "Today", "Tomorrow", "In 3
/// days", "2 days ago", falling back to the long display form beyond a week.
pub fn relative_date_text(date: NaiveDate, today: NaiveDate) -> String {
    let diff = (date - today).num_days();
    match diff {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        2..=7 => format!("In {} days", diff),
        -7..=-2 => format!("{} days ago", -diff),
        _ => format_display_date(date),
    }
}

/// Whether `s` is an `HH:MM` wall-clock time.
pub fn is_valid_time(s: &str) -> bool {
    NaiveTime::parse_from_str(s, "%H:%M").is_ok()
}

/// Combine a date string and an optional `HH:MM` time string into one value.
/// A missing time means midnight.
pub fn combine_date_and_time(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    match time {
        Some(t) if !t.trim().is_empty() => parse_date(&format!("{}T{}:00", date, t)),
        _ => parse_date(&format!("{}T00:00:00", date)),
    }
}

/// Materialize a recurring event's instances within `[range_start, range_end]`
/// (inclusive).
///
/// An event without a rule (or whose own start does not parse) comes back as
/// a single-element list, unchanged. Otherwise generation starts from the
/// event's start and steps by `interval` units of the rule's frequency,
/// stopping at the rule's `end_date` (the query's `range_end` when the rule
/// has none), at `range_end`, or at the occurrence cap, whichever comes
/// first. Steps landing before `range_start` are skipped but still consume
/// their ordinal, so instance ids are stable regardless of the queried range.
///
/// Each instance carries `id = "<parent>_<ordinal>"`, `is_recurring = true`,
/// and `original_id` pointing at the parent. An unrecognized frequency stops
/// generation immediately, returning whatever was produced so far. Pure and
/// bounded; nothing here is persisted.
pub fn generate_recurring_events(
    event: &Event,
    range_start: NaiveDateTime,
    range_end: NaiveDateTime,
) -> Vec<Event> {
    let Some(rule) = &event.recurring else {
        return vec![event.clone()];
    };
    let Some(base) = parse_date(&event.date_time) else {
        return vec![event.clone()];
    };

    let cap = rule
        .occurrences
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_MAX_OCCURRENCES);
    let rule_end = rule
        .end_date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(range_end);

    let mut instances = Vec::new();
    let mut current = base;
    let mut ordinal = 0usize;

    while current <= rule_end && current <= range_end && ordinal < cap {
        if current >= range_start {
            let mut instance = event.clone();
            instance.id = format!("{}_{}", event.id, ordinal);
            instance.date_time = format_iso(current);
            instance.is_recurring = true;
            instance.original_id = Some(event.id.clone());
            instances.push(instance);
        }

        ordinal += 1;

        let next = match rule.frequency {
            Frequency::Daily => current.checked_add_signed(Duration::days(i64::from(rule.interval))),
            Frequency::Weekly => {
                current.checked_add_signed(Duration::weeks(i64::from(rule.interval)))
            }
            Frequency::Monthly => current.checked_add_months(Months::new(rule.interval)),
            Frequency::Yearly => current.checked_add_months(Months::new(rule.interval * 12)),
            Frequency::Unrecognized => None,
        };
        match next {
            Some(dt) => current = dt,
            None => break,
        }
    }

    instances
}

/// Stable ascending sort by parsed start time. Events whose `date_time` does
/// not parse land after all parsable ones, keeping their relative input order.
pub fn sort_events_by_date(events: &[Event]) -> Vec<Event> {
    let mut sorted: Vec<Event> = events.to_vec();
    sorted.sort_by(|a, b| match (a.start(), b.start()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RecurrenceRule;

    fn make_event(id: &str, date_time: &str) -> Event {
        serde_json::from_str(&format!(
            r#"{{"id": "{}", "title": "Test", "dateTime": "{}"}}"#,
            id, date_time
        ))
        .expect("Should deserialize")
    }

    fn dt(s: &str) -> NaiveDateTime {
        parse_date(s).expect("Should parse")
    }

    #[test]
    fn test_parse_date_accepts_common_iso_shapes() {
        assert_eq!(parse_date("2024-01-01T10:00"), Some(dt("2024-01-01T10:00:00")));
        assert_eq!(parse_date("2024-01-01T10:00:30"), Some(dt("2024-01-01T10:00:30")));
        assert_eq!(parse_date("2024-01-01"), Some(dt("2024-01-01T00:00:00")));
        // RFC 3339 offsets normalize to UTC
        assert_eq!(
            parse_date("2024-01-01T10:00:00+02:00"),
            Some(dt("2024-01-01T08:00:00"))
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-45"), None);
    }

    #[test]
    fn test_input_date_round_trips_to_same_day() {
        for s in ["2024-01-01T10:00", "2024-02-29", "1999-12-31T23:59:59"] {
            let parsed = parse_date(s).expect("Should parse");
            let reparsed = parse_date(&format_input_date(parsed)).expect("Should reparse");
            assert_eq!(reparsed.date(), parsed.date(), "round-trip day for {}", s);
        }
    }

    #[test]
    fn test_calendar_days_is_full_weeks_from_week_start() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let days = calendar_days(feb, Weekday::Sun);

        assert_eq!(days.len() % 7, 0);
        assert_eq!(days.first().unwrap().weekday(), Weekday::Sun);
        assert_eq!(days.last().unwrap().weekday(), Weekday::Sat);
        // Feb 2024 starts on a Thursday, so the grid reaches back into January
        assert_eq!(*days.first().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 28).unwrap());
        assert!(days.contains(&NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }

    #[test]
    fn test_calendar_days_honors_monday_week_start() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let days = calendar_days(feb, Weekday::Mon);

        assert_eq!(days.len() % 7, 0);
        assert_eq!(days.first().unwrap().weekday(), Weekday::Mon);
        assert_eq!(days.last().unwrap().weekday(), Weekday::Sun);
        assert_eq!(*days.first().unwrap(), NaiveDate::from_ymd_opt(2024, 1, 29).unwrap());
    }

    #[test]
    fn test_shift_months_clamps_day_of_month() {
        let jan31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(shift_months(jan31, 1), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(shift_months(jan31, -1), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        let mar15 = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(shift_months(mar15, 1), NaiveDate::from_ymd_opt(2024, 4, 15).unwrap());
    }

    #[test]
    fn test_non_recurring_event_expands_to_itself() {
        let event = make_event("e1", "2024-01-01T09:00");
        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2024-12-31T23:59"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], event);
    }

    #[test]
    fn test_weekly_rule_generates_capped_instances() {
        let mut event = make_event("e1", "2024-01-01T09:00");
        event.recurring = Some(RecurrenceRule {
            occurrences: Some(3),
            ..RecurrenceRule::new(Frequency::Weekly)
        });

        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2024-12-31T23:59"));

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].date_time, "2024-01-01T09:00:00");
        assert_eq!(out[1].date_time, "2024-01-08T09:00:00");
        assert_eq!(out[2].date_time, "2024-01-15T09:00:00");
        for (i, instance) in out.iter().enumerate() {
            assert!(instance.is_recurring);
            assert_eq!(instance.original_id.as_deref(), Some("e1"));
            assert_eq!(instance.id, format!("e1_{}", i));
        }
    }

    #[test]
    fn test_expansion_stops_at_default_cap() {
        let mut event = make_event("e1", "2024-01-01T09:00");
        event.recurring = Some(RecurrenceRule::new(Frequency::Daily));

        // Range is wide open; only the occurrence cap can terminate this.
        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2099-12-31T23:59"));
        assert_eq!(out.len(), DEFAULT_MAX_OCCURRENCES);
    }

    #[test]
    fn test_expansion_respects_rule_end_date() {
        let mut event = make_event("e1", "2024-01-01T09:00");
        event.recurring = Some(RecurrenceRule {
            end_date: Some("2024-01-04".to_string()),
            ..RecurrenceRule::new(Frequency::Daily)
        });

        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2024-12-31T23:59"));
        // Jan 1, 2, 3 — Jan 4's 09:00 is past the end date's midnight bound
        assert_eq!(out.len(), 3);
        assert_eq!(out.last().unwrap().date_time, "2024-01-03T09:00:00");
    }

    #[test]
    fn test_instances_before_range_start_skip_but_keep_ordinals() {
        let mut event = make_event("e1", "2024-01-01T09:00");
        event.recurring = Some(RecurrenceRule {
            occurrences: Some(5),
            ..RecurrenceRule::new(Frequency::Daily)
        });

        let out = generate_recurring_events(&event, dt("2024-01-03T00:00"), dt("2024-12-31T23:59"));

        assert_eq!(out.len(), 3);
        // Ordinals 0 and 1 were consumed by the skipped Jan 1 and Jan 2 steps
        assert_eq!(out[0].id, "e1_2");
        assert_eq!(out[0].date_time, "2024-01-03T09:00:00");
    }

    #[test]
    fn test_unrecognized_frequency_truncates_generation() {
        let mut event = make_event("e1", "2024-01-01T09:00");
        event.recurring = Some(serde_json::from_str(r#"{"type": "hourly"}"#).expect("Should deserialize"));

        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2024-12-31T23:59"));
        // The base date is emitted, then the unknown step ends generation.
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "e1_0");
        assert!(out[0].is_recurring);
    }

    #[test]
    fn test_monthly_rule_clamps_short_months() {
        let mut event = make_event("e1", "2024-01-31T09:00");
        event.recurring = Some(RecurrenceRule {
            occurrences: Some(2),
            ..RecurrenceRule::new(Frequency::Monthly)
        });

        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2024-12-31T23:59"));
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].date_time, "2024-02-29T09:00:00");
    }

    #[test]
    fn test_yearly_rule_steps_whole_years() {
        let mut event = make_event("e1", "2024-03-10T12:00");
        event.recurring = Some(RecurrenceRule {
            occurrences: Some(3),
            ..RecurrenceRule::new(Frequency::Yearly)
        });

        let out = generate_recurring_events(&event, dt("2024-01-01T00:00"), dt("2030-12-31T23:59"));
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].date_time, "2026-03-10T12:00:00");
    }

    #[test]
    fn test_sort_is_stable_and_puts_unparsable_last() {
        let events = vec![
            make_event("b", "2024-02-01T10:00"),
            make_event("x", "never"),
            make_event("a", "2024-01-01T10:00"),
            make_event("y", "also never"),
        ];

        let sorted = sort_events_by_date(&events);
        let ids: Vec<&str> = sorted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "x", "y"]);

        // Idempotent: sorting the sorted list changes nothing
        let resorted = sort_events_by_date(&sorted);
        assert_eq!(resorted, sorted);
    }

    #[test]
    fn test_relative_date_text() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(relative_date_text(today, today), "Today");
        assert_eq!(relative_date_text(today + Duration::days(1), today), "Tomorrow");
        assert_eq!(relative_date_text(today - Duration::days(1), today), "Yesterday");
        assert_eq!(relative_date_text(today + Duration::days(3), today), "In 3 days");
        assert_eq!(relative_date_text(today - Duration::days(5), today), "5 days ago");
        assert_eq!(relative_date_text(today + Duration::days(30), today), "July 10, 2024");
    }

    #[test]
    fn test_combine_date_and_time() {
        assert_eq!(
            combine_date_and_time("2024-01-01", Some("14:30")),
            Some(dt("2024-01-01T14:30:00"))
        );
        assert_eq!(
            combine_date_and_time("2024-01-01", None),
            Some(dt("2024-01-01T00:00:00"))
        );
        assert_eq!(combine_date_and_time("nope", Some("14:30")), None);
    }

    #[test]
    fn test_is_valid_time() {
        assert!(is_valid_time("09:30"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("9:61"));
        assert!(!is_valid_time(""));
    }
}
