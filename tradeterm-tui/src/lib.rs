//! tradeterm TUI: instrument page for a broker terminal.
//!
//! Provides:
//! - Instrument page with date picker and interval buttons
//! - Live chart for today, candle playback for past days
//! - Robot start/stop and the robot's log for the selected day
//! - Instrument listing as the fallback route

pub mod app;
pub mod date_picker;
pub mod input;
pub mod page;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::{AppState, Overlay, Route};
pub use worker::{spawn_worker, WorkerCommand, WorkerResponse};

#[cfg(test)]
mod test_helpers;
