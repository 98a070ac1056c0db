//! Instrument page driven end to end: real worker thread, in-memory broker.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tempfile::TempDir;

use tradeterm_core::domain::{Instrument, Interval, TradingSchedule};
use tradeterm_core::testing::{sample_candles, sample_instrument, FakeBroker};
use tradeterm_core::view::ContentView;
use tradeterm_core::FixedClock;
use tradeterm_tui::persistence::{self, Storage};
use tradeterm_tui::{spawn_worker, AppState, Route, WorkerCommand};

const FIGI: &str = "BBG004730N88";

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn today() -> NaiveDate {
    d(2026, 10, 19)
}

struct Harness {
    app: AppState,
    broker: Arc<FakeBroker>,
    dir: TempDir,
    worker: Option<JoinHandle<()>>,
}

impl Harness {
    fn new(broker: FakeBroker) -> Self {
        Self::with_storage(broker, None)
    }

    fn with_storage(broker: FakeBroker, stored: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        if let Some(json) = stored {
            std::fs::write(&path, json).unwrap();
        }
        let broker = Arc::new(broker);
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let worker = spawn_worker(broker.clone(), cmd_rx, resp_tx).unwrap();
        let app = AppState::new(
            cmd_tx,
            resp_rx,
            Arc::new(FixedClock(today())),
            Storage::open(path),
            "RandomExample".into(),
            "acc-1".into(),
        );
        Self {
            app,
            broker,
            dir,
            worker: Some(worker),
        }
    }

    /// Apply worker responses until `done` holds.
    fn pump_until(&mut self, done: impl Fn(&AppState) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !done(&self.app) {
            let left = deadline.saturating_duration_since(Instant::now());
            assert!(!left.is_zero(), "timed out waiting for page state");
            if let Ok(resp) = self.app.worker_rx.recv_timeout(left) {
                self.app.apply(resp);
            }
        }
    }

    fn settle(&mut self) {
        self.pump_until(|app| app.page.as_ref().map_or(true, |p| !p.in_progress));
    }

    fn storage_path(&self) -> std::path::PathBuf {
        self.dir.path().join("storage.json")
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = self.app.worker_tx.send(WorkerCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[test]
fn unknown_figi_redirects_to_listing() {
    let mut h = Harness::new(FakeBroker::new().with_instrument(sample_instrument()));
    h.app.open_instrument("UNKNOWN");
    h.pump_until(|app| app.route() == Route::Instruments && !app.listing.loading);
    assert_eq!(h.app.listing.instruments.len(), 1);
    assert_eq!(h.broker.schedule_calls(), 0);
}

#[test]
fn instrument_without_ticker_redirects() {
    let mut h = Harness::new(
        FakeBroker::new().with_instrument(Instrument::new("F0", "", "No ticker", "MOEX")),
    );
    h.app.open_instrument("F0");
    h.pump_until(|app| app.route() == Route::Instruments);
}

#[test]
fn closed_exchange_today() {
    let broker = FakeBroker::new().with_instrument(sample_instrument());
    broker.set_schedule(Ok(Some(TradingSchedule::single("MOEX", today(), false))));
    let mut h = Harness::new(broker);
    h.app.open_instrument(FIGI);
    h.settle();

    let page = h.app.page.as_ref().unwrap();
    assert_eq!(page.content(), ContentView::MarketClosed);
    assert_eq!(page.title().unwrap(), "Sberbank (SBER)");
    assert_eq!(h.broker.schedule_calls(), 1);
    assert!(h.broker.candle_calls().is_empty());
}

#[test]
fn schedule_failure_still_shows_chart() {
    let broker = FakeBroker::new().with_instrument(sample_instrument());
    broker.set_schedule(Err(tradeterm_core::BrokerError::Unreachable("down".into())));
    broker.set_candles(sample_candles(today(), 4));
    let mut h = Harness::new(broker);
    h.app.open_instrument(FIGI);
    h.pump_until(|app| app.page.as_ref().is_some_and(|p| p.candles.len() == 4));
    assert_eq!(h.app.page.as_ref().unwrap().content(), ContentView::Chart);
}

#[test]
fn stored_past_date_opens_backtest_without_schedule_call() {
    let friday = d(2026, 10, 16);
    let broker = FakeBroker::new().with_instrument(sample_instrument());
    broker.set_candles(sample_candles(friday, 6));
    let mut h = Harness::with_storage(
        broker,
        Some(r#"{"interval":2,"selectedDate":"2026-10-16"}"#),
    );
    h.app.open_instrument(FIGI);
    h.pump_until(|app| app.page.as_ref().is_some_and(|p| p.candles.len() == 6));

    let page = h.app.page.as_ref().unwrap();
    assert!(page.is_backtest);
    assert_eq!(page.interval, Interval::FifteenMinutes);
    assert_eq!(page.content(), ContentView::Backtest);
    assert_eq!(page.title().unwrap(), "Sberbank (SBER). Backtest.");
    assert_eq!(h.broker.schedule_calls(), 0);
    assert_eq!(
        h.broker.candle_calls(),
        vec![(FIGI.to_string(), Interval::FifteenMinutes, friday)]
    );
}

#[test]
fn switching_back_to_today_queries_schedule() {
    let broker = FakeBroker::new().with_instrument(sample_instrument());
    broker.set_trading_day(today(), true);
    let mut h = Harness::with_storage(broker, Some(r#"{"selectedDate":"2026-10-16"}"#));
    h.app.open_instrument(FIGI);
    h.settle();
    assert_eq!(h.broker.schedule_calls(), 0);

    assert!(h.app.change_date(today()));
    h.settle();
    let page = h.app.page.as_ref().unwrap();
    assert!(!page.is_backtest);
    assert_eq!(page.content(), ContentView::Chart);
    assert_eq!(h.broker.schedule_dates(), vec![today()]);
    assert_eq!(
        persistence::load(&h.storage_path()).selected_date,
        Some(today())
    );
}

#[test]
fn robot_session_locks_controls() {
    let mut h = Harness::new(FakeBroker::new().with_instrument(sample_instrument()));
    h.app.open_instrument(FIGI);
    h.settle();

    h.app.toggle_robot();
    h.pump_until(|app| app.robot_running());
    let started = h.broker.started_robots();
    assert_eq!(started.len(), 1);
    assert_eq!(started[0].0.account_id, "acc-1");
    assert_eq!(started[0].1, today());

    assert!(!h.app.select_interval(Interval::OneHour));
    assert!(!h.app.change_date(d(2026, 10, 16)));

    h.app.toggle_robot();
    h.pump_until(|app| !app.robot_running());
    assert!(h.app.select_interval(Interval::OneHour));
    assert_eq!(persistence::load(&h.storage_path()).interval, Some(3));
}

#[test]
fn robot_session_outlives_page_visit() {
    let mut h = Harness::new(FakeBroker::new().with_instrument(sample_instrument()));
    h.app.open_instrument(FIGI);
    h.settle();
    h.app.toggle_robot();
    h.pump_until(|app| app.robot_running());

    h.app.open_listing();
    h.pump_until(|app| !app.listing.loading);
    h.app.open_instrument(FIGI);
    h.pump_until(|app| app.page.as_ref().is_some_and(|p| p.instrument.is_some()));
    h.settle();

    assert!(h.app.controls_locked());
    assert!(!h.app.change_date(d(2026, 10, 16)));
    assert!(h.broker.stopped_robots().is_empty());
}

#[test]
fn robot_failure_lands_in_error_history() {
    let broker = FakeBroker::new().with_instrument(sample_instrument());
    broker.fail_robot_calls(true);
    let mut h = Harness::new(broker);
    h.app.open_instrument(FIGI);
    h.settle();

    h.app.toggle_robot();
    h.pump_until(|app| !app.error_history.is_empty());
    assert!(!h.app.robot_running());
}

#[test]
fn robot_logs_follow_selected_date() {
    let mut h = Harness::new(FakeBroker::new().with_instrument(sample_instrument()));
    h.app.open_instrument(FIGI);
    h.settle();
    h.app.change_date(d(2026, 10, 16));
    h.settle();

    let calls = h.broker.log_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].1, "acc-1");
    assert_eq!(
        calls[1].3,
        tradeterm_core::calendar::local_midnight_ms(d(2026, 10, 16))
    );
}
