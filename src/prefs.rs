//! Persisted preference types: theme, view mode, and the settings bundle.
//!
//! Each preference is an independently-keyed storage entry with an explicit
//! default used when the stored value is absent or unparsable. Defaults live
//! here, not in the storage adapter, so the adapter stays reusable.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Calendar display mode: month grid or flat chronological list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Clock format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

/// Application settings bundle, persisted as a single storage entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub notifications: bool,
    /// Default event duration in minutes.
    pub default_event_duration: u32,
    /// First day of the week, 0 = Sunday .. 6 = Saturday.
    pub week_start_day: u8,
    pub time_format: TimeFormat,
    pub default_view: ViewMode,
    pub auto_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            notifications: true,
            default_event_duration: 60,
            week_start_day: 0,
            time_format: TimeFormat::TwelveHour,
            default_view: ViewMode::Grid,
            auto_save: true,
        }
    }
}

impl Settings {
    /// The configured week start as a chrono weekday. Out-of-range stored
    /// values wrap rather than fail.
    pub fn week_start(&self) -> Weekday {
        match self.week_start_day % 7 {
            1 => Weekday::Mon,
            2 => Weekday::Tue,
            3 => Weekday::Wed,
            4 => Weekday::Thu,
            5 => Weekday::Fri,
            6 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }
}
