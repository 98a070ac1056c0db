//! tradeterm core: domain types, calendar rules, view-state derivation,
//! broker API and configuration for the instrument terminal.
//!
//! - Domain types (instrument, interval, trading schedule, candles, robot logs)
//! - Calendar rules for the date picker (weekdays only, nothing after today)
//! - Backtest/live derivation and content view selection
//! - Trading-day resolution against the schedule service
//! - `BrokerApi` trait with a blocking HTTP implementation

pub mod broker;
pub mod calendar;
pub mod config;
pub mod domain;
pub mod resolver;
pub mod view;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use broker::{BrokerApi, BrokerError, HttpBroker};
pub use calendar::{Clock, FixedClock, SystemClock};
pub use config::TerminalConfig;
pub use resolver::{resolve_trading_day, Resolution};
pub use view::{content_view, is_backtest, ContentView, PageView};
