//! The event store: authoritative in-memory event list plus the current
//! calendar selection, persisted write-through via the storage adapter.
//!
//! Every mutation validates before touching the list and never partially
//! applies. Persistence happens after each successful mutation; a refused
//! write surfaces as a `Storage` error but deliberately does not roll the
//! in-memory change back — in-session availability wins over durability.

use chrono::{Local, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::constants::{DEFAULT_CATEGORY, DEFAULT_EVENT_COLOR};
use crate::dates::{parse_date, shift_months};
use crate::error::{DatebookError, DatebookResult};
use crate::event::{Event, EventDraft, EventPatch};
use crate::prefs::ViewMode;
use crate::storage::{StorageAdapter, StorageBackend};

pub struct CalendarStore<B: StorageBackend> {
    adapter: StorageAdapter<B>,
    events: Vec<Event>,
    current_date: NaiveDate,
    selected_date: Option<NaiveDate>,
    view_mode: ViewMode,
}

impl<B: StorageBackend> CalendarStore<B> {
    /// Hydrate the store from storage. An absent or undecodable event list
    /// degrades to empty; the selection starts at today in grid mode.
    pub fn load(adapter: StorageAdapter<B>) -> Self {
        let events = adapter.load_events();
        debug!(count = events.len(), "hydrated event list");
        CalendarStore {
            adapter,
            events,
            current_date: Local::now().date_naive(),
            selected_date: None,
            view_mode: ViewMode::default(),
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Create a new event from caller-supplied fields.
    ///
    /// Assigns a fresh id and audit timestamps, appends, and persists. Fails
    /// with `Validation` on a blank title or a missing/unparsable start.
    pub fn create_event(&mut self, draft: EventDraft) -> DatebookResult<Event> {
        validate(&draft.title, &draft.date_time, draft.end_date_time.as_deref())?;

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            date_time: draft.date_time,
            end_date_time: draft.end_date_time,
            color: draft.color.unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string()),
            category: draft.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            is_all_day: draft.is_all_day,
            location: draft.location,
            attendees: draft.attendees,
            recurring: draft.recurring,
            reminders: draft.reminders,
            is_recurring: false,
            original_id: None,
            created_at: now,
            updated_at: now,
        };

        self.events.push(event.clone());
        self.persist()?;
        Ok(event)
    }

    /// Merge `patch` over the event with `id`, re-validate, refresh
    /// `updated_at`, and replace the entry in place. List order is unchanged.
    pub fn update_event(&mut self, id: &str, patch: &EventPatch) -> DatebookResult<Event> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DatebookError::NotFound(id.to_string()))?;

        let mut merged = patch.apply_to(&self.events[index]);
        validate(&merged.title, &merged.date_time, merged.end_date_time.as_deref())?;
        merged.updated_at = Utc::now();

        self.events[index] = merged.clone();
        self.persist()?;
        Ok(merged)
    }

    /// Remove the event with `id`, returning it.
    pub fn delete_event(&mut self, id: &str) -> DatebookResult<Event> {
        let index = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| DatebookError::NotFound(id.to_string()))?;

        let removed = self.events.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Clone the event with `id` under a new id, titled `"<title> (Copy)"`,
    /// at the provided times (or the original's when not given). Runs through
    /// the same validation path as `create_event`.
    pub fn duplicate_event(
        &mut self,
        id: &str,
        date_time: Option<String>,
        end_date_time: Option<String>,
    ) -> DatebookResult<Event> {
        let source = self
            .event(id)
            .ok_or_else(|| DatebookError::NotFound(id.to_string()))?;

        let draft = EventDraft {
            title: format!("{} (Copy)", source.title),
            description: source.description.clone(),
            date_time: date_time.unwrap_or_else(|| source.date_time.clone()),
            end_date_time: end_date_time.or_else(|| source.end_date_time.clone()),
            color: Some(source.color.clone()),
            category: Some(source.category.clone()),
            is_all_day: source.is_all_day,
            location: source.location.clone(),
            attendees: source.attendees.clone(),
            recurring: source.recurring.clone(),
            reminders: source.reminders.clone(),
        };
        self.create_event(draft)
    }

    // Selection state. These mutate only the selection, never the event list,
    // and never touch storage.

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_current_date(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    pub fn set_selected_date(&mut self, date: Option<NaiveDate>) {
        self.selected_date = date;
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// Advance the displayed month by one, preserving the day-of-month where
    /// the target month has it.
    pub fn next_month(&mut self) {
        self.current_date = shift_months(self.current_date, 1);
    }

    pub fn prev_month(&mut self) {
        self.current_date = shift_months(self.current_date, -1);
    }

    /// Access to the adapter for preference reads/writes and import/export.
    pub fn adapter_mut(&mut self) -> &mut StorageAdapter<B> {
        &mut self.adapter
    }

    pub fn adapter(&self) -> &StorageAdapter<B> {
        &self.adapter
    }

    fn persist(&mut self) -> DatebookResult<()> {
        self.adapter.save_events(&self.events)
    }
}

/// Shared validation for create, update, and duplicate.
fn validate(title: &str, date_time: &str, end_date_time: Option<&str>) -> DatebookResult<()> {
    if title.trim().is_empty() {
        return Err(DatebookError::Validation(
            "event title is required".to_string(),
        ));
    }

    if date_time.trim().is_empty() {
        return Err(DatebookError::Validation(
            "event date and time is required".to_string(),
        ));
    }

    let Some(start) = parse_date(date_time) else {
        return Err(DatebookError::Validation(format!(
            "invalid event date: '{}'",
            date_time
        )));
    };

    if let Some(end) = end_date_time.and_then(parse_date) {
        if end < start {
            return Err(DatebookError::Validation(
                "end time must be after start time".to_string(),
            ));
        }
    }

    Ok(())
}
