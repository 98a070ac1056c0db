//! Background worker thread: every broker call runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Commands
//! are fire-and-forget: nothing in flight is cancelled or de-duplicated, and
//! responses are applied by the main thread in arrival order.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use tracing::{info, warn};

use tradeterm_core::broker::BrokerApi;
use tradeterm_core::calendar::local_midnight_ms;
use tradeterm_core::domain::{Candle, Instrument, InstrumentSummary, Interval, RobotLog, RobotRef};
use tradeterm_core::{resolve_trading_day, Resolution};

use crate::app::ErrorCategory;

/// Commands sent from the TUI to the worker.
#[derive(Debug, Clone)]
pub enum WorkerCommand {
    LoadInstrument {
        figi: String,
    },
    ListInstruments,
    ResolveTradingDay {
        figi: String,
        exchange: String,
        date: NaiveDate,
        today: NaiveDate,
    },
    LoadRobotLogs {
        robot: RobotRef,
        date: NaiveDate,
    },
    LoadCandles {
        figi: String,
        interval: Interval,
        date: NaiveDate,
    },
    StartRobot {
        robot: RobotRef,
        date: NaiveDate,
    },
    StopRobot {
        robot: RobotRef,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    /// `None` covers "not found", "no ticker" and a failed lookup alike.
    InstrumentLoaded {
        figi: String,
        instrument: Option<Instrument>,
    },
    InstrumentsListed {
        instruments: Vec<InstrumentSummary>,
    },
    TradingDayResolved {
        figi: String,
        date: NaiveDate,
        resolution: Resolution,
    },
    RobotLogsLoaded {
        figi: String,
        date: NaiveDate,
        logs: Vec<RobotLog>,
    },
    CandlesLoaded {
        figi: String,
        interval: Interval,
        date: NaiveDate,
        candles: Vec<Candle>,
    },
    RobotStateChanged {
        figi: String,
        started: bool,
    },
    Error {
        category: ErrorCategory,
        message: String,
        context: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    api: Arc<dyn BrokerApi>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tradeterm-worker".into())
        .spawn(move || worker_loop(api.as_ref(), rx, tx))
}

fn worker_loop(api: &dyn BrokerApi, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                if let Some(resp) = handle_command(api, cmd) {
                    if tx.send(resp).is_err() {
                        break;
                    }
                }
            }
        }
    }
    info!("worker stopped");
}

/// Run one command against the broker. Public so tests can drive it synchronously.
pub fn handle_command(api: &dyn BrokerApi, cmd: WorkerCommand) -> Option<WorkerResponse> {
    let resp = match cmd {
        WorkerCommand::LoadInstrument { figi } => {
            let instrument = match api.get_instrument(&figi) {
                Ok(found) => found,
                Err(e) => {
                    warn!(%figi, error = %e, "instrument lookup failed");
                    None
                }
            };
            WorkerResponse::InstrumentLoaded { figi, instrument }
        }
        WorkerCommand::ListInstruments => match api.list_instruments() {
            Ok(instruments) => WorkerResponse::InstrumentsListed { instruments },
            Err(e) => error(ErrorCategory::Network, e, "instrument listing"),
        },
        WorkerCommand::ResolveTradingDay {
            figi,
            exchange,
            date,
            today,
        } => {
            let resolution = resolve_trading_day(api, &exchange, date, today);
            WorkerResponse::TradingDayResolved {
                figi,
                date,
                resolution,
            }
        }
        WorkerCommand::LoadRobotLogs { robot, date } => {
            match api.get_robot_logs(&robot.name, &robot.account_id, &robot.figi, local_midnight_ms(date)) {
                Ok(logs) => WorkerResponse::RobotLogsLoaded {
                    figi: robot.figi,
                    date,
                    logs,
                },
                Err(e) => {
                    warn!(figi = %robot.figi, %date, error = %e, "robot logs unavailable");
                    return None;
                }
            }
        }
        WorkerCommand::LoadCandles {
            figi,
            interval,
            date,
        } => match api.get_candles(&figi, interval, date) {
            Ok(mut candles) => {
                let received = candles.len();
                candles.retain(Candle::is_sane);
                if candles.len() < received {
                    warn!(%figi, %date, dropped = received - candles.len(), "dropped malformed candles");
                }
                WorkerResponse::CandlesLoaded {
                    figi,
                    interval,
                    date,
                    candles,
                }
            }
            Err(e) => error(ErrorCategory::Data, e, &format!("candles {figi} {date}")),
        },
        WorkerCommand::StartRobot { robot, date } => match api.start_robot(&robot, date) {
            Ok(()) => {
                info!(figi = %robot.figi, robot = %robot.name, %date, "robot started");
                WorkerResponse::RobotStateChanged {
                    figi: robot.figi,
                    started: true,
                }
            }
            Err(e) => error(ErrorCategory::Robot, e, &format!("start {}", robot.name)),
        },
        WorkerCommand::StopRobot { robot } => match api.stop_robot(&robot) {
            Ok(()) => {
                info!(figi = %robot.figi, robot = %robot.name, "robot stopped");
                WorkerResponse::RobotStateChanged {
                    figi: robot.figi,
                    started: false,
                }
            }
            Err(e) => error(ErrorCategory::Robot, e, &format!("stop {}", robot.name)),
        },
        WorkerCommand::Shutdown => return None,
    };
    Some(resp)
}

fn error(category: ErrorCategory, e: impl std::fmt::Display, context: &str) -> WorkerResponse {
    warn!(error = %e, context, "worker command failed");
    WorkerResponse::Error {
        category,
        message: e.to_string(),
        context: context.to_string(),
    }
}
