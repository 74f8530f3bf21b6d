//! Core library for the datebook event calendar.
//!
//! Everything the calendar UI needs short of rendering:
//! - `event` — the `Event` entity and recurrence rules
//! - `dates` — parsing, formatting, calendar math, recurrence expansion
//! - `store` — the authoritative event list and calendar selection
//! - `storage` — typed persistence over a key-value backend, import/export
//! - `query` — derived views (per-day, range, upcoming, grouped, search)
//! - `prefs` — persisted preferences (theme, view mode, settings)
//!
//! The host environment supplies the raw key-value primitive by implementing
//! `storage::StorageBackend`; `storage::MemoryStore` serves tests and
//! headless use.

pub mod constants;
pub mod dates;
pub mod error;
pub mod event;
pub mod prefs;
pub mod query;
pub mod storage;
pub mod store;

pub use error::{DatebookError, DatebookResult};
pub use event::{Event, EventDraft, EventPatch, Frequency, RecurrenceRule};
pub use prefs::{Settings, Theme, TimeFormat, ViewMode};
pub use storage::{ExportDocument, MemoryStore, StorageAdapter, StorageBackend};
pub use store::CalendarStore;
