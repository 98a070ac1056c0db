//! Candle: intraday market data unit for the chart and backtest views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle for one interval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl Candle {
    /// Basic OHLC sanity check: high >= low and both bracket open/close.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }
}

/// Session summary over a candle slice: (last close, high, low).
pub fn session_summary(candles: &[Candle]) -> Option<(f64, f64, f64)> {
    let last = candles.last()?.close;
    let high = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    Some((last, high, low))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(minute: u32, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: Utc.with_ymd_and_hms(2026, 10, 19, 10, minute, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 100,
        }
    }

    #[test]
    fn sane_candle() {
        assert!(candle(0, 10.0, 11.0, 9.0, 10.5).is_sane());
        assert!(!candle(0, 10.0, 9.0, 11.0, 10.5).is_sane());
    }

    #[test]
    fn summary_over_session() {
        let candles = vec![
            candle(0, 10.0, 11.0, 9.5, 10.5),
            candle(1, 10.5, 12.0, 10.0, 11.8),
            candle(2, 11.8, 11.9, 9.0, 9.2),
        ];
        assert_eq!(session_summary(&candles), Some((9.2, 12.0, 9.0)));
        assert_eq!(session_summary(&[]), None);
    }
}
