use serde::{Deserialize, Serialize};

/// Instrument metadata as returned by the broker's instrument lookup.
///
/// Loaded once per page visit and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub figi: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub lot: Option<u32>,
}

impl Instrument {
    /// Create new instrument
    pub fn new(figi: &str, ticker: &str, name: &str, exchange: &str) -> Self {
        Self {
            figi: figi.to_string(),
            ticker: ticker.to_string(),
            name: name.to_string(),
            exchange: exchange.to_string(),
            currency: None,
            lot: None,
        }
    }

    /// A lookup result is only usable when it carries a ticker.
    pub fn is_resolved(&self) -> bool {
        !self.ticker.trim().is_empty()
    }

    /// Page title: `Name (TICKER)`, with a backtest suffix.
    pub fn title(&self, backtest: bool) -> String {
        let mut title = format!("{} ({})", self.name, self.ticker);
        if backtest {
            title.push_str(". Backtest.");
        }
        title
    }
}

/// One row of the instrument listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentSummary {
    pub figi: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub name: String,
}

impl InstrumentSummary {
    /// Case-insensitive match against ticker, name or FIGI.
    pub fn matches(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.ticker.to_lowercase().contains(&q)
            || self.name.to_lowercase().contains(&q)
            || self.figi.to_lowercase().contains(&q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_live_and_backtest() {
        let inst = Instrument::new("BBG000B9XRY4", "AAPL", "Apple", "SPB");
        assert_eq!(inst.title(false), "Apple (AAPL)");
        assert_eq!(inst.title(true), "Apple (AAPL). Backtest.");
    }

    #[test]
    fn blank_ticker_is_unresolved() {
        let inst = Instrument::new("BBG000B9XRY4", "  ", "Apple", "SPB");
        assert!(!inst.is_resolved());
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let inst: Instrument =
            serde_json::from_str(r#"{"figi":"BBG004730N88","ticker":"SBER","name":"Sberbank","exchange":"MOEX"}"#)
                .unwrap();
        assert_eq!(inst.ticker, "SBER");
        assert!(inst.lot.is_none());
    }

    #[test]
    fn missing_ticker_deserializes_as_empty() {
        let inst: Instrument = serde_json::from_str(r#"{"figi":"X"}"#).unwrap();
        assert!(!inst.is_resolved());
    }

    #[test]
    fn summary_matching() {
        let s = InstrumentSummary {
            figi: "BBG004730N88".into(),
            ticker: "SBER".into(),
            name: "Sberbank".into(),
        };
        assert!(s.matches("sber"));
        assert!(s.matches("BANK"));
        assert!(s.matches("n88"));
        assert!(s.matches(""));
        assert!(!s.matches("gazp"));
    }
}
