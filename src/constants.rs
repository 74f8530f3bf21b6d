//! Shared constants.

/// Cap on generated recurrence instances when a rule gives no explicit count.
pub const DEFAULT_MAX_OCCURRENCES: usize = 100;

/// Display color assigned to events created without one.
pub const DEFAULT_EVENT_COLOR: &str = "#3b82f6";

/// Category assigned to events created without one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Default number of events returned by the upcoming-events view.
pub const UPCOMING_LIMIT: usize = 5;
