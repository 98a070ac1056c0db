//! Chart/playback interval selected by the four interval buttons.

use serde::{Deserialize, Serialize};

/// Candle interval. The button index (0..=3) is what gets persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    OneMinute,
    #[default]
    FiveMinutes,
    FifteenMinutes,
    OneHour,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::OneMinute,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::OneHour,
    ];

    pub fn index(self) -> usize {
        match self {
            Interval::OneMinute => 0,
            Interval::FiveMinutes => 1,
            Interval::FifteenMinutes => 2,
            Interval::OneHour => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            Interval::OneMinute => "1 min",
            Interval::FiveMinutes => "5 min",
            Interval::FifteenMinutes => "15 min",
            Interval::OneHour => "1 hour",
        }
    }

    /// Value of the `interval` query parameter on the candles endpoint.
    pub fn api_name(self) -> &'static str {
        match self {
            Interval::OneMinute => "1min",
            Interval::FiveMinutes => "5min",
            Interval::FifteenMinutes => "15min",
            Interval::OneHour => "hour",
        }
    }
}
