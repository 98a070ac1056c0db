//! Client-side storage: the page's two persisted choices.
//!
//! A flat JSON object with the keys `interval` (0..=3) and `selectedDate`.
//! Every change is written through immediately.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use tradeterm_core::domain::Interval;

pub const INTERVAL_KEY: &str = "interval";
pub const SELECTED_DATE_KEY: &str = "selectedDate";

/// Values read back from storage. Absent or unusable keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoredChoices {
    #[serde(rename = "interval", skip_serializing_if = "Option::is_none")]
    pub interval: Option<usize>,
    #[serde(rename = "selectedDate", skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<NaiveDate>,
}

impl StoredChoices {
    /// Stored interval, or the default button when missing or out of range.
    /// A stored `0` is the "1 min" button and is kept, not treated as unset.
    pub fn interval_or_default(&self) -> Interval {
        self.interval
            .and_then(Interval::from_index)
            .unwrap_or_default()
    }

    /// Stored date, or today when missing. A date after today is clamped to today.
    pub fn date_or_today(&self, today: NaiveDate) -> NaiveDate {
        match self.selected_date {
            Some(d) if d <= today => d,
            _ => today,
        }
    }
}

/// Accepts `2026-10-19` as well as a full timestamp such as `2026-10-19T07:30:00.000Z`.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

fn parse_interval(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|v| v as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Load stored choices. Returns defaults if the file is missing or corrupt.
pub fn load(path: &Path) -> StoredChoices {
    let Ok(content) = std::fs::read_to_string(path) else {
        return StoredChoices::default();
    };
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&content) else {
        warn!(path = %path.display(), "storage file is not a JSON object, using defaults");
        return StoredChoices::default();
    };
    StoredChoices {
        interval: map.get(INTERVAL_KEY).and_then(parse_interval),
        selected_date: map.get(SELECTED_DATE_KEY).and_then(parse_date),
    }
}

/// Save stored choices. Creates parent directories if needed.
pub fn save(path: &Path, choices: &StoredChoices) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(choices)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Write-through storage handle owned by the app.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    choices: StoredChoices,
}

impl Storage {
    pub fn open(path: PathBuf) -> Self {
        let choices = load(&path);
        Self { path, choices }
    }

    pub fn choices(&self) -> &StoredChoices {
        &self.choices
    }

    pub fn set_interval(&mut self, interval: Interval) {
        self.choices.interval = Some(interval.index());
        self.flush();
    }

    pub fn set_selected_date(&mut self, date: NaiveDate) {
        self.choices.selected_date = Some(date);
        self.flush();
    }

    fn flush(&self) {
        if let Err(e) = save(&self.path, &self.choices) {
            warn!(path = %self.path.display(), error = %e, "failed to write storage");
        }
    }
}
