//! Application state: single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.
//! Page transitions (instrument load, date and interval changes, robot
//! control) live in `page.rs`.

use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use tradeterm_core::domain::{Candle, Instrument, InstrumentSummary, Interval, RobotLog};
use tradeterm_core::view::{content_view, is_backtest, ContentView};
use tradeterm_core::Clock;

use crate::date_picker::DatePickerState;
use crate::persistence::Storage;
use crate::worker::{WorkerCommand, WorkerResponse};

pub const ERROR_HISTORY_CAP: usize = 50;

/// Where the app currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Instrument listing (also the redirect target for unknown FIGIs).
    Instruments,
    /// Instrument page for a FIGI.
    Instrument(String),
}

/// Modal layer drawn over the current screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    DatePicker(DatePickerState),
    ErrorHistory,
    Help,
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Robot,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Robot => "BOT",
            ErrorCategory::Other => "ERR",
        }
    }
}

/// Backtest playback cursor over the day's candles.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    /// Number of candles revealed so far.
    pub cursor: usize,
    pub playing: bool,
    pub last_step: Option<Instant>,
}

/// Instrument page state. Exists only while the route is an instrument page.
#[derive(Debug, Clone)]
pub struct PageState {
    pub figi: String,
    /// `None` until the lookup answers.
    pub instrument: Option<Instrument>,
    pub interval: Interval,
    pub selected_date: NaiveDate,
    pub is_backtest: bool,
    /// `None` until the first trading-day resolution arrives.
    pub is_trading_day: Option<bool>,
    pub in_progress: bool,
    pub robot_logs: Vec<RobotLog>,
    pub candles: Vec<Candle>,
    pub playback: Playback,
    pub last_refresh: Option<Instant>,
}

impl PageState {
    pub fn new(figi: &str, interval: Interval, selected_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            figi: figi.to_string(),
            instrument: None,
            interval,
            selected_date,
            is_backtest: is_backtest(selected_date, today),
            is_trading_day: None,
            in_progress: true,
            robot_logs: Vec::new(),
            candles: Vec::new(),
            playback: Playback::default(),
            last_refresh: None,
        }
    }

    pub fn content(&self) -> ContentView {
        content_view(self.is_trading_day, self.is_backtest)
    }

    /// Page title, once the instrument is known.
    pub fn title(&self) -> Option<String> {
        self.instrument.as_ref().map(|i| i.title(self.is_backtest))
    }

    /// Candles the content region should draw: all of them live, the
    /// revealed prefix in a backtest.
    pub fn visible_candles(&self) -> &[Candle] {
        if self.is_backtest {
            let n = self.playback.cursor.min(self.candles.len());
            &self.candles[..n]
        } else {
            &self.candles
        }
    }

    pub(crate) fn reset_candles(&mut self) {
        self.candles.clear();
        self.playback = Playback::default();
        self.last_refresh = None;
    }

    pub fn toggle_play(&mut self) {
        if self.playback.cursor >= self.candles.len() {
            self.playback.cursor = 0;
        }
        self.playback.playing = !self.playback.playing;
        self.playback.last_step = None;
    }

    pub fn step(&mut self, delta: i64) {
        let len = self.candles.len() as i64;
        let next = (self.playback.cursor as i64 + delta).clamp(0, len);
        self.playback.cursor = next as usize;
        self.playback.playing = false;
    }

    pub fn restart(&mut self) {
        self.playback.cursor = 0;
        self.playback.playing = true;
        self.playback.last_step = None;
    }

    /// Reveal one more candle; stops at the end of the day.
    pub(crate) fn advance_playback(&mut self) {
        if self.playback.cursor < self.candles.len() {
            self.playback.cursor += 1;
        }
        if self.playback.cursor >= self.candles.len() {
            self.playback.playing = false;
        }
    }
}

/// Instrument listing state.
#[derive(Debug, Clone, Default)]
pub struct ListingState {
    pub instruments: Vec<InstrumentSummary>,
    pub filter: String,
    pub filter_active: bool,
    pub cursor: usize,
    pub loading: bool,
}

impl ListingState {
    pub fn filtered(&self) -> Vec<&InstrumentSummary> {
        self.instruments
            .iter()
            .filter(|i| i.matches(&self.filter))
            .collect()
    }

    pub fn selected(&self) -> Option<&InstrumentSummary> {
        self.filtered().get(self.cursor).copied()
    }

    pub fn move_cursor(&mut self, delta: i64) {
        let len = self.filtered().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as i64 + delta).clamp(0, len as i64 - 1);
        self.cursor = next as usize;
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.filtered().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

/// Top-level application state.
pub struct AppState {
    pub running: bool,
    pub page: Option<PageState>,
    pub listing: ListingState,
    pub overlay: Overlay,
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    /// FIGIs with a robot session confirmed running. Outlives page visits.
    pub running_robots: HashSet<String>,
    pub clock: Arc<dyn Clock>,
    pub storage: Storage,
    pub robot_name: String,
    pub account_id: String,
    pub spinner_frame: usize,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        clock: Arc<dyn Clock>,
        storage: Storage,
        robot_name: String,
        account_id: String,
    ) -> Self {
        Self {
            running: true,
            page: None,
            listing: ListingState::default(),
            overlay: Overlay::None,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            worker_tx,
            worker_rx,
            running_robots: HashSet::new(),
            clock,
            storage,
            robot_name,
            account_id,
            spinner_frame: 0,
        }
    }

    pub fn route(&self) -> Route {
        match &self.page {
            Some(page) => Route::Instrument(page.figi.clone()),
            None => Route::Instruments,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Whether a robot session runs for the instrument on screen.
    pub fn robot_running(&self) -> bool {
        self.page
            .as_ref()
            .is_some_and(|p| self.running_robots.contains(&p.figi))
    }

    /// Date and interval controls are locked while a robot session runs.
    pub fn controls_locked(&self) -> bool {
        self.robot_running()
    }

    pub(crate) fn send(&self, cmd: WorkerCommand) {
        if self.worker_tx.send(cmd).is_err() {
            warn!("worker channel closed, command dropped");
        }
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{day, test_app};
    use tradeterm_core::testing::sample_candles;

    #[test]
    fn error_history_caps_at_50() {
        let (mut app, _dir, _rx) = test_app(day(2026, 10, 19));
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
        assert_eq!(
            app.status_message.as_ref().map(|(_, l)| *l),
            Some(StatusLevel::Error)
        );
    }

    #[test]
    fn route_follows_page() {
        let (mut app, _dir, _rx) = test_app(day(2026, 10, 19));
        assert_eq!(app.route(), Route::Instruments);
        app.page = Some(PageState::new("F1", Interval::default(), day(2026, 10, 19), day(2026, 10, 19)));
        assert_eq!(app.route(), Route::Instrument("F1".into()));
    }

    #[test]
    fn playback_reveals_prefix() {
        let date = day(2026, 10, 16);
        let mut page = PageState::new("F1", Interval::OneMinute, date, day(2026, 10, 19));
        page.candles = sample_candles(date, 4);
        assert!(page.visible_candles().is_empty());

        page.step(2);
        assert_eq!(page.visible_candles().len(), 2);
        page.step(10);
        assert_eq!(page.visible_candles().len(), 4);
        page.step(-10);
        assert_eq!(page.visible_candles().len(), 0);

        page.restart();
        assert!(page.playback.playing);
        for _ in 0..4 {
            page.advance_playback();
        }
        assert_eq!(page.playback.cursor, 4);
        assert!(!page.playback.playing);
    }

    #[test]
    fn live_page_shows_every_candle() {
        let today = day(2026, 10, 19);
        let mut page = PageState::new("F1", Interval::OneMinute, today, today);
        page.candles = sample_candles(today, 3);
        assert_eq!(page.visible_candles().len(), 3);
    }

    #[test]
    fn listing_filter_and_cursor() {
        let mut listing = ListingState {
            instruments: vec![
                InstrumentSummary {
                    figi: "F1".into(),
                    ticker: "SBER".into(),
                    name: "Sberbank".into(),
                },
                InstrumentSummary {
                    figi: "F2".into(),
                    ticker: "GAZP".into(),
                    name: "Gazprom".into(),
                },
            ],
            ..Default::default()
        };
        listing.move_cursor(5);
        assert_eq!(listing.selected().map(|i| i.figi.as_str()), Some("F2"));

        listing.filter = "sber".into();
        listing.clamp_cursor();
        assert_eq!(listing.selected().map(|i| i.figi.as_str()), Some("F1"));

        listing.filter = "nothing".into();
        listing.clamp_cursor();
        assert!(listing.selected().is_none());
    }
}
