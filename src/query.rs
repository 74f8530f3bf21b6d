//! Derived views over the event list.
//!
//! Pure functions, recomputed on demand from whatever slice the caller holds.
//! Filters key on each event's own `date_time` only — recurrence expansion is
//! the caller's job (`dates::generate_recurring_events`), not automatic here.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

use crate::constants::DEFAULT_CATEGORY;
use crate::dates::{parse_date, sort_events_by_date};
use crate::event::{Event, EventDraft};

/// Events whose start falls on `date`.
pub fn events_for_date(events: &[Event], date: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.start().is_some_and(|dt| dt.date() == date))
        .cloned()
        .collect()
}

/// Events whose start falls within `[start, end]`, inclusive on both ends.
pub fn events_for_range(events: &[Event], start: NaiveDateTime, end: NaiveDateTime) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.start().is_some_and(|dt| dt >= start && dt <= end))
        .cloned()
        .collect()
}

/// The next `limit` events at or after `now`, ascending.
pub fn upcoming_events(events: &[Event], now: NaiveDateTime, limit: usize) -> Vec<Event> {
    let mut upcoming: Vec<Event> = events
        .iter()
        .filter(|e| e.start().is_some_and(|dt| dt >= now))
        .cloned()
        .collect();
    upcoming = sort_events_by_date(&upcoming);
    upcoming.truncate(limit);
    upcoming
}

/// Group events by category label, input order preserved within each group.
/// Events without a label fall under `"general"`.
pub fn group_by_category(events: &[Event]) -> BTreeMap<String, Vec<Event>> {
    let mut groups: BTreeMap<String, Vec<Event>> = BTreeMap::new();
    for event in events {
        let category = if event.category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            event.category.clone()
        };
        groups.entry(category).or_default().push(event.clone());
    }
    groups
}

/// Events with exactly the given category label.
pub fn filter_by_category(events: &[Event], category: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.category == category)
        .cloned()
        .collect()
}

/// Case-insensitive substring match over title, description, and location.
/// A blank query returns the full list unfiltered.
pub fn search(events: &[Event], query: &str) -> Vec<Event> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return events.to_vec();
    }

    events
        .iter()
        .filter(|e| {
            e.title.to_lowercase().contains(&term)
                || e.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&term))
                || e.location
                    .as_deref()
                    .is_some_and(|l| l.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

/// Field-level validation report for UI-side pre-checks. The store performs
/// its own authoritative validation on mutation; this only collects every
/// problem at once for form feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_event_fields(draft: &EventDraft) -> ValidationReport {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push("Title is required".to_string());
    }

    let start = if draft.date_time.trim().is_empty() {
        errors.push("Date and time is required".to_string());
        None
    } else {
        let parsed = parse_date(&draft.date_time);
        if parsed.is_none() {
            errors.push("Invalid date and time".to_string());
        }
        parsed
    };

    if let (Some(start), Some(end)) = (start, draft.end_date_time.as_deref().and_then(parse_date)) {
        if end < start {
            errors.push("End time must be after start time".to_string());
        }
    }

    ValidationReport { errors }
}
