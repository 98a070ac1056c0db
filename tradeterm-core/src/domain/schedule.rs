//! Exchange trading schedule as returned by the broker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Schedule response: `{exchanges: [{exchange, days: [{isTradingDay, ...}]}]}`.
///
/// Every field is optional on the wire; a schedule that lacks exchanges or
/// days simply carries no answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradingSchedule {
    #[serde(default)]
    pub exchanges: Vec<ExchangeSchedule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeSchedule {
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub days: Vec<TradingDay>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradingDay {
    /// Day as sent by the server (plain date or full timestamp).
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub is_trading_day: Option<bool>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl TradingSchedule {
    /// Single-day schedule, mostly for fakes and tests.
    pub fn single(exchange: &str, date: NaiveDate, is_trading_day: bool) -> Self {
        Self {
            exchanges: vec![ExchangeSchedule {
                exchange: exchange.to_string(),
                days: vec![TradingDay {
                    date: Some(date.format("%Y-%m-%d").to_string()),
                    is_trading_day: Some(is_trading_day),
                    start_time: None,
                    end_time: None,
                }],
            }],
        }
    }

    /// Flag of the first day of the first exchange, if the response has one.
    pub fn first_day_flag(&self) -> Option<bool> {
        self.exchanges
            .first()
            .and_then(|e| e.days.first())
            .and_then(|d| d.is_trading_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_shape() {
        let json = r#"{"exchanges":[{"exchange":"MOEX","days":[{"date":"2026-10-19","isTradingDay":false,"startTime":"07:00","endTime":"15:40"}]}]}"#;
        let s: TradingSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(s.first_day_flag(), Some(false));
        assert_eq!(s.exchanges[0].days[0].start_time.as_deref(), Some("07:00"));
    }

    #[test]
    fn timestamp_dates_accepted() {
        let json = r#"{"exchanges":[{"exchange":"MOEX","days":[{"date":"2026-10-19T00:00:00Z","isTradingDay":false}]}]}"#;
        let s: TradingSchedule = serde_json::from_str(json).unwrap();
        assert_eq!(s.first_day_flag(), Some(false));
    }

    #[test]
    fn minimal_wire_shape() {
        let s: TradingSchedule =
            serde_json::from_str(r#"{"exchanges":[{"days":[{"isTradingDay":true}]}]}"#).unwrap();
        assert_eq!(s.first_day_flag(), Some(true));
    }

    #[test]
    fn empty_shapes_have_no_flag() {
        for json in [
            r#"{}"#,
            r#"{"exchanges":[]}"#,
            r#"{"exchanges":[{"days":[]}]}"#,
            r#"{"exchanges":[{"days":[{}]}]}"#,
        ] {
            let s: TradingSchedule = serde_json::from_str(json).unwrap();
            assert_eq!(s.first_day_flag(), None, "{json}");
        }
    }
}
