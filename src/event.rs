//! Calendar event types.
//!
//! `Event` is the persisted entity; `EventDraft` carries caller-supplied
//! fields into the store, which fills in the id and audit timestamps.
//! Recurring events stay single entries in the event list — their instances
//! are materialized on demand by `dates::generate_recurring_events` and are
//! never written back to storage.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CATEGORY, DEFAULT_EVENT_COLOR};
use crate::dates::parse_date;

/// A single calendar event.
///
/// `date_time` and `end_date_time` are kept as ISO-8601 text rather than
/// parsed values: a loaded list may contain entries whose dates no longer
/// parse, and those must survive the round-trip (they sort after all
/// parsable events, see `dates::sort_events_by_date`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Start of the event, canonical ISO-8601 text.
    pub date_time: String,
    /// Optional end; when both ends parse, `end_date_time >= date_time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    /// Absent means the event occurs exactly once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring: Option<RecurrenceRule>,
    /// Reminder offsets in minutes before the event. Opaque pass-through.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reminders: Vec<i64>,
    /// Set only on materialized recurrence instances.
    #[serde(default)]
    pub is_recurring: bool,
    /// Back-reference to the parent event on materialized instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    /// Set by the store at creation, immutable afterwards.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Refreshed by the store on every successful update.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Parsed start time, `None` when `date_time` is malformed.
    pub fn start(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date_time)
    }

    /// Parsed end time, `None` when absent or malformed.
    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end_date_time.as_deref().and_then(parse_date)
    }
}

/// How often a recurring event repeats.
///
/// `Unrecognized` absorbs any other value found in stored data; expansion
/// stops as soon as it steps with an unrecognized frequency, keeping whatever
/// instances were generated before that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    #[serde(other)]
    Unrecognized,
}

/// Recurrence rule attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    #[serde(rename = "type")]
    pub frequency: Frequency,
    /// Step between occurrences, in units of `frequency`.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Inclusive upper bound on generated occurrence dates (ISO-8601 text).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Cap on the number of generated occurrences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<usize>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        RecurrenceRule {
            frequency,
            interval: 1,
            end_date: None,
            occurrences: None,
        }
    }
}

/// Caller-supplied fields for creating an event.
///
/// Everything the store owns (`id`, `created_at`, `updated_at`) is absent by
/// construction. Unset optional fields fall back to the documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub date_time: String,
    pub end_date_time: Option<String>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub is_all_day: bool,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub recurring: Option<RecurrenceRule>,
    pub reminders: Vec<i64>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date_time: impl Into<String>) -> Self {
        EventDraft {
            title: title.into(),
            date_time: date_time.into(),
            ..EventDraft::default()
        }
    }
}

/// Partial update applied over an existing event.
///
/// Outer `None` means "leave the field alone"; for nullable fields the inner
/// option distinguishes setting a value from clearing it.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub date_time: Option<String>,
    pub end_date_time: Option<Option<String>>,
    pub color: Option<String>,
    pub category: Option<String>,
    pub is_all_day: Option<bool>,
    pub location: Option<Option<String>>,
    pub attendees: Option<Vec<String>>,
    pub recurring: Option<Option<RecurrenceRule>>,
    pub reminders: Option<Vec<i64>>,
}

impl EventPatch {
    /// Produce the merged event without touching the original.
    pub(crate) fn apply_to(&self, event: &Event) -> Event {
        let mut merged = event.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(date_time) = &self.date_time {
            merged.date_time = date_time.clone();
        }
        if let Some(end_date_time) = &self.end_date_time {
            merged.end_date_time = end_date_time.clone();
        }
        if let Some(color) = &self.color {
            merged.color = color.clone();
        }
        if let Some(category) = &self.category {
            merged.category = category.clone();
        }
        if let Some(is_all_day) = self.is_all_day {
            merged.is_all_day = is_all_day;
        }
        if let Some(location) = &self.location {
            merged.location = location.clone();
        }
        if let Some(attendees) = &self.attendees {
            merged.attendees = attendees.clone();
        }
        if let Some(recurring) = &self.recurring {
            merged.recurring = recurring.clone();
        }
        if let Some(reminders) = &self.reminders {
            merged.reminders = reminders.clone();
        }
        merged
    }
}

fn default_color() -> String {
    DEFAULT_EVENT_COLOR.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_interval() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_with_defaults() {
        let json = r#"{
            "id": "abc",
            "title": "Standup",
            "dateTime": "2024-01-01T10:00"
        }"#;

        let event: Event = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(event.color, DEFAULT_EVENT_COLOR);
        assert_eq!(event.category, DEFAULT_CATEGORY);
        assert!(!event.is_recurring);
        assert!(event.recurring.is_none());
    }

    #[test]
    fn test_unknown_recurrence_type_maps_to_unrecognized() {
        let json = r#"{"type": "fortnightly", "interval": 2}"#;
        let rule: RecurrenceRule = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(rule.frequency, Frequency::Unrecognized);
        assert_eq!(rule.interval, 2);
    }

    #[test]
    fn test_recurrence_interval_defaults_to_one() {
        let json = r#"{"type": "weekly"}"#;
        let rule: RecurrenceRule = serde_json::from_str(json).expect("Should deserialize");
        assert_eq!(rule.interval, 1);
    }

    #[test]
    fn test_patch_clears_nullable_field() {
        let event: Event = serde_json::from_str(
            r#"{"id": "e1", "title": "Call", "dateTime": "2024-01-01T10:00", "location": "Room 4"}"#,
        )
        .expect("Should deserialize");

        let patch = EventPatch {
            location: Some(None),
            ..EventPatch::default()
        };
        let merged = patch.apply_to(&event);
        assert_eq!(merged.location, None);
        assert_eq!(merged.title, "Call");
    }
}
