//! In-memory broker for tests (enabled by the `testing` feature).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::broker::{BrokerApi, BrokerError};
use crate::domain::{Candle, Instrument, InstrumentSummary, Interval, RobotLog, RobotRef, TradingSchedule};

#[derive(Debug, Clone)]
enum ScheduleReply {
    Schedule(Option<TradingSchedule>),
    Fail(String),
}

#[derive(Debug, Default)]
struct Calls {
    instrument: Vec<String>,
    schedule: Vec<(String, NaiveDate)>,
    logs: Vec<(String, String, String, i64)>,
    candles: Vec<(String, Interval, NaiveDate)>,
    started: Vec<(RobotRef, NaiveDate)>,
    stopped: Vec<RobotRef>,
}

/// Scriptable `BrokerApi` that records every call.
///
/// Unknown FIGIs resolve to `None`; the schedule reply defaults to "no data".
pub struct FakeBroker {
    instruments: Mutex<HashMap<String, Instrument>>,
    schedule: Mutex<ScheduleReply>,
    schedule_by_date: Mutex<HashMap<NaiveDate, bool>>,
    candles: Mutex<Vec<Candle>>,
    logs: Mutex<Vec<RobotLog>>,
    fail_robot: Mutex<bool>,
    calls: Mutex<Calls>,
}

impl Default for FakeBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBroker {
    pub fn new() -> Self {
        Self {
            instruments: Mutex::new(HashMap::new()),
            schedule: Mutex::new(ScheduleReply::Schedule(None)),
            schedule_by_date: Mutex::new(HashMap::new()),
            candles: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
            fail_robot: Mutex::new(false),
            calls: Mutex::new(Calls::default()),
        }
    }

    pub fn with_instrument(self, instrument: Instrument) -> Self {
        self.instruments
            .lock()
            .unwrap()
            .insert(instrument.figi.clone(), instrument);
        self
    }

    /// Reply for every schedule call without a per-date override.
    pub fn set_schedule(&self, reply: Result<Option<TradingSchedule>, BrokerError>) {
        *self.schedule.lock().unwrap() = match reply {
            Ok(s) => ScheduleReply::Schedule(s),
            Err(e) => ScheduleReply::Fail(e.to_string()),
        };
    }

    pub fn set_trading_day(&self, date: NaiveDate, is_trading_day: bool) {
        self.schedule_by_date
            .lock()
            .unwrap()
            .insert(date, is_trading_day);
    }

    pub fn set_candles(&self, candles: Vec<Candle>) {
        *self.candles.lock().unwrap() = candles;
    }

    pub fn set_logs(&self, logs: Vec<RobotLog>) {
        *self.logs.lock().unwrap() = logs;
    }

    pub fn fail_robot_calls(&self, fail: bool) {
        *self.fail_robot.lock().unwrap() = fail;
    }

    pub fn instrument_calls(&self) -> usize {
        self.calls.lock().unwrap().instrument.len()
    }

    pub fn schedule_calls(&self) -> usize {
        self.calls.lock().unwrap().schedule.len()
    }

    pub fn schedule_dates(&self) -> Vec<NaiveDate> {
        self.calls.lock().unwrap().schedule.iter().map(|(_, d)| *d).collect()
    }

    pub fn log_calls(&self) -> Vec<(String, String, String, i64)> {
        self.calls.lock().unwrap().logs.clone()
    }

    pub fn candle_calls(&self) -> Vec<(String, Interval, NaiveDate)> {
        self.calls.lock().unwrap().candles.clone()
    }

    pub fn started_robots(&self) -> Vec<(RobotRef, NaiveDate)> {
        self.calls.lock().unwrap().started.clone()
    }

    pub fn stopped_robots(&self) -> Vec<RobotRef> {
        self.calls.lock().unwrap().stopped.clone()
    }
}

impl BrokerApi for FakeBroker {
    fn get_instrument(&self, figi: &str) -> Result<Option<Instrument>, BrokerError> {
        self.calls.lock().unwrap().instrument.push(figi.to_string());
        Ok(self.instruments.lock().unwrap().get(figi).cloned())
    }

    fn list_instruments(&self) -> Result<Vec<InstrumentSummary>, BrokerError> {
        let mut list: Vec<InstrumentSummary> = self
            .instruments
            .lock()
            .unwrap()
            .values()
            .map(|i| InstrumentSummary {
                figi: i.figi.clone(),
                ticker: i.ticker.clone(),
                name: i.name.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(list)
    }

    fn get_trading_schedules(
        &self,
        exchange: &str,
        date: NaiveDate,
    ) -> Result<Option<TradingSchedule>, BrokerError> {
        self.calls
            .lock()
            .unwrap()
            .schedule
            .push((exchange.to_string(), date));
        if let Some(flag) = self.schedule_by_date.lock().unwrap().get(&date) {
            return Ok(Some(TradingSchedule::single(exchange, date, *flag)));
        }
        match &*self.schedule.lock().unwrap() {
            ScheduleReply::Schedule(s) => Ok(s.clone()),
            ScheduleReply::Fail(msg) => Err(BrokerError::Unreachable(msg.clone())),
        }
    }

    fn get_robot_logs(
        &self,
        name: &str,
        account_id: &str,
        figi: &str,
        timestamp_ms: i64,
    ) -> Result<Vec<RobotLog>, BrokerError> {
        self.calls.lock().unwrap().logs.push((
            name.to_string(),
            account_id.to_string(),
            figi.to_string(),
            timestamp_ms,
        ));
        Ok(self.logs.lock().unwrap().clone())
    }

    fn get_candles(
        &self,
        figi: &str,
        interval: Interval,
        date: NaiveDate,
    ) -> Result<Vec<Candle>, BrokerError> {
        self.calls
            .lock()
            .unwrap()
            .candles
            .push((figi.to_string(), interval, date));
        Ok(self.candles.lock().unwrap().clone())
    }

    fn start_robot(&self, robot: &RobotRef, date: NaiveDate) -> Result<(), BrokerError> {
        if *self.fail_robot.lock().unwrap() {
            return Err(BrokerError::Status {
                status: 500,
                path: "/robots/start".into(),
            });
        }
        self.calls.lock().unwrap().started.push((robot.clone(), date));
        Ok(())
    }

    fn stop_robot(&self, robot: &RobotRef) -> Result<(), BrokerError> {
        if *self.fail_robot.lock().unwrap() {
            return Err(BrokerError::Status {
                status: 500,
                path: "/robots/stop".into(),
            });
        }
        self.calls.lock().unwrap().stopped.push(robot.clone());
        Ok(())
    }
}

/// Sample instrument used across tests.
pub fn sample_instrument() -> Instrument {
    Instrument::new("BBG004730N88", "SBER", "Sberbank", "MOEX")
}

/// `n` one-minute candles starting at 10:00 UTC on `date`, closing 100, 101, ...
pub fn sample_candles(date: NaiveDate, n: usize) -> Vec<Candle> {
    let start = Utc.from_utc_datetime(&date.and_hms_opt(10, 0, 0).unwrap_or_default());
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            Candle {
                time: start + chrono::Duration::minutes(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            }
        })
        .collect()
}
