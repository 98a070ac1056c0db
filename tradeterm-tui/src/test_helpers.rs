//! Test helpers for building an `AppState` without a terminal or worker.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use tradeterm_core::FixedClock;

use crate::app::AppState;
use crate::persistence::Storage;
use crate::worker::WorkerCommand;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// App pinned to `today`, with storage in a fresh temp dir. The receiver
/// collects every command the app sends to the worker.
pub fn test_app(today: NaiveDate) -> (AppState, TempDir, Receiver<WorkerCommand>) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::open(dir.path().join("storage.json"));
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let app = AppState::new(
        cmd_tx,
        resp_rx,
        Arc::new(FixedClock(today)),
        storage,
        "RandomExample".into(),
        "acc".into(),
    );
    (app, dir, cmd_rx)
}

/// Everything sent to the worker so far.
pub fn drain(rx: &Receiver<WorkerCommand>) -> Vec<WorkerCommand> {
    rx.try_iter().collect()
}
