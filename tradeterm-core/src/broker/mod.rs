//! Broker API trait and structured error types.
//!
//! The BrokerApi trait abstracts over the broker server so the terminal can
//! run against the HTTP implementation or an in-memory fake in tests.

pub mod http;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Candle, Instrument, InstrumentSummary, Interval, RobotLog, RobotRef, TradingSchedule};

pub use http::HttpBroker;

/// Structured error types for broker calls.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker unreachable: {0}")]
    Unreachable(String),

    #[error("broker returned HTTP {status} for {path}")]
    Status { status: u16, path: String },

    #[error("malformed broker response: {0}")]
    Malformed(String),

    #[error("invalid broker URI: {0}")]
    InvalidUri(String),

    #[error("broker error: {0}")]
    Other(String),
}

/// Calls the terminal makes against the broker server.
///
/// Implementations are blocking; the TUI calls them from its worker thread.
pub trait BrokerApi: Send + Sync {
    /// Look up one instrument by FIGI. `Ok(None)` when the server has no such instrument.
    fn get_instrument(&self, figi: &str) -> Result<Option<Instrument>, BrokerError>;

    /// All instruments offered by the broker (the listing page).
    fn list_instruments(&self) -> Result<Vec<InstrumentSummary>, BrokerError>;

    /// Trading schedule of `exchange` for the single day `date`.
    fn get_trading_schedules(
        &self,
        exchange: &str,
        date: NaiveDate,
    ) -> Result<Option<TradingSchedule>, BrokerError>;

    /// Logs of robot `name` for an account/instrument on the day starting at `timestamp_ms`.
    fn get_robot_logs(
        &self,
        name: &str,
        account_id: &str,
        figi: &str,
        timestamp_ms: i64,
    ) -> Result<Vec<RobotLog>, BrokerError>;

    /// Intraday candles of one instrument for one day.
    fn get_candles(
        &self,
        figi: &str,
        interval: Interval,
        date: NaiveDate,
    ) -> Result<Vec<Candle>, BrokerError>;

    /// Start an automated trading session. `date` selects backtest playback when it is in the past.
    fn start_robot(&self, robot: &RobotRef, date: NaiveDate) -> Result<(), BrokerError>;

    fn stop_robot(&self, robot: &RobotRef) -> Result<(), BrokerError>;
}
