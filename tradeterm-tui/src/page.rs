//! Page controller: route changes, worker responses and user actions
//! applied to `AppState`.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use tradeterm_core::calendar::{format_display, is_selectable};
use tradeterm_core::domain::{Instrument, Interval, RobotRef};
use tradeterm_core::view::{is_backtest, ContentView};

use crate::app::{AppState, Overlay, PageState};
use crate::date_picker::DatePickerState;
use crate::worker::{WorkerCommand, WorkerResponse};

/// Live chart reload period.
pub const LIVE_REFRESH: Duration = Duration::from_secs(5);
/// Backtest playback speed: one candle per step.
pub const PLAYBACK_STEP: Duration = Duration::from_millis(400);

impl AppState {
    fn robot_ref(&self, figi: &str) -> RobotRef {
        RobotRef {
            name: self.robot_name.clone(),
            account_id: self.account_id.clone(),
            figi: figi.to_string(),
        }
    }

    /// Show the instrument listing and (re)load it.
    pub fn open_listing(&mut self) {
        self.page = None;
        self.overlay = Overlay::None;
        self.listing.loading = true;
        self.send(WorkerCommand::ListInstruments);
    }

    /// Enter the instrument page for `figi`. A blank FIGI lands on the listing.
    pub fn open_instrument(&mut self, figi: &str) {
        let figi = figi.trim();
        if figi.is_empty() {
            warn!("no instrument given, showing listing");
            self.open_listing();
            return;
        }

        let today = self.today();
        let choices = self.storage.choices();
        let interval = choices.interval_or_default();
        let date = choices.date_or_today(today);

        info!(%figi, %date, interval = interval.label(), "opening instrument page");
        self.page = Some(PageState::new(figi, interval, date, today));
        self.overlay = Overlay::None;
        self.send(WorkerCommand::LoadInstrument {
            figi: figi.to_string(),
        });
        self.send(WorkerCommand::LoadRobotLogs {
            robot: self.robot_ref(figi),
            date,
        });
    }

    /// Apply one worker response. Responses for a page that is no longer
    /// shown are dropped.
    pub fn apply(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::InstrumentLoaded { figi, instrument } => {
                if !self.is_current(&figi) {
                    return;
                }
                match instrument.filter(|i| i.is_resolved()) {
                    Some(instrument) => self.instrument_ready(instrument),
                    None => {
                        warn!(%figi, "instrument not found, redirecting to listing");
                        self.open_listing();
                        self.set_warning(format!("Instrument {figi} not found"));
                    }
                }
            }
            WorkerResponse::InstrumentsListed { instruments } => {
                self.listing.instruments = instruments;
                self.listing.loading = false;
                self.listing.clamp_cursor();
            }
            WorkerResponse::TradingDayResolved {
                figi,
                date,
                resolution,
            } => {
                let Some(page) = self.page.as_mut().filter(|p| p.figi == figi) else {
                    return;
                };
                debug!(%figi, %date, ?resolution, "trading day resolved");
                page.is_trading_day = Some(resolution.is_trading_day());
                page.in_progress = false;
                self.request_candles();
            }
            WorkerResponse::RobotLogsLoaded { figi, date, logs } => {
                if let Some(page) = self
                    .page
                    .as_mut()
                    .filter(|p| p.figi == figi && p.selected_date == date)
                {
                    page.robot_logs = logs;
                }
            }
            WorkerResponse::CandlesLoaded {
                figi,
                interval,
                date,
                candles,
            } => {
                let Some(page) = self.page.as_mut().filter(|p| {
                    p.figi == figi && p.interval == interval && p.selected_date == date
                }) else {
                    debug!(%figi, %date, "stale candles dropped");
                    return;
                };
                let len = candles.len();
                page.candles = candles;
                if page.is_backtest {
                    page.playback.cursor = page.playback.cursor.min(len);
                }
            }
            WorkerResponse::RobotStateChanged { figi, started } => {
                let name = self.robot_name.clone();
                if started {
                    self.running_robots.insert(figi.clone());
                    self.set_status(format!("Robot {name} started on {figi}"));
                } else {
                    self.running_robots.remove(&figi);
                    self.set_status(format!("Robot {name} stopped on {figi}"));
                }
            }
            // `in_progress` is cleared only by the trading-day resolution.
            WorkerResponse::Error {
                category,
                message,
                context,
            } => self.push_error(category, message, context),
        }
    }

    fn is_current(&self, figi: &str) -> bool {
        self.page.as_ref().is_some_and(|p| p.figi == figi)
    }

    fn instrument_ready(&mut self, instrument: Instrument) {
        let today = self.today();
        let Some(page) = self.page.as_mut() else {
            return;
        };
        info!(figi = %instrument.figi, ticker = %instrument.ticker, "instrument loaded");
        let cmd = WorkerCommand::ResolveTradingDay {
            figi: page.figi.clone(),
            exchange: instrument.exchange.clone(),
            date: page.selected_date,
            today,
        };
        page.instrument = Some(instrument);
        self.send(cmd);
    }

    /// Ask for candles of the page's (interval, date) once the day is known to trade.
    fn request_candles(&self) {
        let Some(page) = self.page.as_ref() else {
            return;
        };
        if page.instrument.is_none() || page.is_trading_day != Some(true) {
            return;
        }
        let cmd = WorkerCommand::LoadCandles {
            figi: page.figi.clone(),
            interval: page.interval,
            date: page.selected_date,
        };
        self.send(cmd);
    }

    /// Change the selected date. Ignored while the robot runs and for dates
    /// the picker would not offer. Returns whether the date changed.
    pub fn change_date(&mut self, date: NaiveDate) -> bool {
        let today = self.today();
        if self.controls_locked() {
            return false;
        }
        let Some(page) = self.page.as_mut() else {
            return false;
        };
        if !is_selectable(date, today) {
            return false;
        }

        page.selected_date = date;
        page.is_backtest = is_backtest(date, today);
        page.robot_logs.clear();
        page.reset_candles();
        self.storage.set_selected_date(date);
        info!(figi = %page.figi, %date, backtest = page.is_backtest, "date changed");

        let mut cmds = vec![WorkerCommand::LoadRobotLogs {
            robot: RobotRef {
                name: self.robot_name.clone(),
                account_id: self.account_id.clone(),
                figi: page.figi.clone(),
            },
            date,
        }];
        if let Some(instrument) = &page.instrument {
            page.in_progress = true;
            cmds.push(WorkerCommand::ResolveTradingDay {
                figi: page.figi.clone(),
                exchange: instrument.exchange.clone(),
                date,
                today,
            });
        }
        for cmd in cmds {
            self.send(cmd);
        }
        true
    }

    /// Select interval button `interval`. Ignored while the robot runs.
    pub fn select_interval(&mut self, interval: Interval) -> bool {
        if self.controls_locked() {
            return false;
        }
        let Some(page) = self.page.as_mut() else {
            return false;
        };
        if page.interval != interval {
            page.interval = interval;
            page.reset_candles();
            self.request_candles();
        }
        self.storage.set_interval(interval);
        true
    }

    /// Cycle through the interval buttons.
    pub fn cycle_interval(&mut self, forward: bool) {
        let Some(current) = self.page.as_ref().map(|p| p.interval.index()) else {
            return;
        };
        let n = Interval::ALL.len();
        let next = if forward { (current + 1) % n } else { (current + n - 1) % n };
        if let Some(interval) = Interval::from_index(next) {
            if !self.select_interval(interval) {
                self.set_warning("Stop the robot to change the interval");
            }
        }
    }

    /// Open the date picker on the selected date.
    pub fn open_date_picker(&mut self) {
        let today = self.today();
        if self.controls_locked() {
            self.set_warning("Stop the robot to change the date");
            return;
        }
        let Some(page) = self.page.as_ref() else {
            return;
        };
        self.overlay = Overlay::DatePicker(DatePickerState::open(page.selected_date, today));
    }

    /// Confirm the date picker's cursor.
    pub fn confirm_date_picker(&mut self) {
        let Overlay::DatePicker(picker) = &self.overlay else {
            return;
        };
        let date = picker.cursor;
        self.overlay = Overlay::None;
        if self.change_date(date) {
            self.set_status(format!("Date {}", format_display(date)));
        }
    }

    /// Start the robot, or stop it if it is running.
    pub fn toggle_robot(&mut self) {
        let Some(page) = self.page.as_ref() else {
            return;
        };
        if page.instrument.is_none() {
            return;
        }
        let robot = self.robot_ref(&page.figi);
        let cmd = if self.running_robots.contains(&page.figi) {
            WorkerCommand::StopRobot { robot }
        } else {
            WorkerCommand::StartRobot {
                robot,
                date: page.selected_date,
            }
        };
        self.send(cmd);
    }

    /// Periodic work: live chart refresh and backtest playback.
    pub fn tick(&mut self, now: Instant) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        let Some(page) = self.page.as_mut() else {
            return;
        };
        match page.content() {
            ContentView::Chart => match page.last_refresh {
                None => page.last_refresh = Some(now),
                Some(last) if now.saturating_duration_since(last) >= LIVE_REFRESH => {
                    page.last_refresh = Some(now);
                    self.request_candles();
                }
                Some(_) => {}
            },
            ContentView::Backtest if page.playback.playing => match page.playback.last_step {
                None => page.playback.last_step = Some(now),
                Some(last) if now.saturating_duration_since(last) >= PLAYBACK_STEP => {
                    page.playback.last_step = Some(now);
                    page.advance_playback();
                }
                Some(_) => {}
            },
            _ => {}
        }
    }
}
