//! Domain types for the instrument terminal

pub mod candle;
pub mod instrument;
pub mod interval;
pub mod robot;
pub mod schedule;

pub use candle::{session_summary, Candle};
pub use instrument::{Instrument, InstrumentSummary};
pub use interval::Interval;
pub use robot::{RobotLog, RobotRef};
pub use schedule::{ExchangeSchedule, TradingDay, TradingSchedule};
