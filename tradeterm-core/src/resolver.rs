//! Trading-day resolution.
//!
//! Past days are assumed to have traded (historical data decides what the
//! backtest shows). Today and later days are asked of the schedule service;
//! anything short of a usable answer counts as a trading day.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::broker::BrokerApi;
use crate::view::needs_schedule_query;

/// How the trading-day flag was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Date before today: assumed open, no call made.
    AssumedPast,
    /// The schedule service answered.
    Reported(bool),
    /// The call failed or the answer had no usable day entry.
    Fallback,
}

impl Resolution {
    pub fn is_trading_day(self) -> bool {
        match self {
            Resolution::Reported(flag) => flag,
            Resolution::AssumedPast | Resolution::Fallback => true,
        }
    }
}

pub fn resolve_trading_day(
    api: &dyn BrokerApi,
    exchange: &str,
    date: NaiveDate,
    today: NaiveDate,
) -> Resolution {
    if !needs_schedule_query(date, today) {
        return Resolution::AssumedPast;
    }

    match api.get_trading_schedules(exchange, date) {
        Ok(Some(schedule)) => match schedule.first_day_flag() {
            Some(flag) => {
                info!(exchange, %date, is_trading_day = flag, "trading schedule resolved");
                Resolution::Reported(flag)
            }
            None => {
                warn!(exchange, %date, "trading schedule has no day entry, assuming trading day");
                Resolution::Fallback
            }
        },
        Ok(None) => {
            warn!(exchange, %date, "no trading schedule returned, assuming trading day");
            Resolution::Fallback
        }
        Err(e) => {
            warn!(exchange, %date, error = %e, "trading schedule lookup failed, assuming trading day");
            Resolution::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::BrokerError;
    use crate::domain::TradingSchedule;
    use crate::testing::FakeBroker;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn past_date_makes_no_call() {
        let broker = FakeBroker::new();
        let today = d(2026, 10, 19);
        let r = resolve_trading_day(&broker, "MOEX", d(2026, 10, 16), today);
        assert_eq!(r, Resolution::AssumedPast);
        assert!(r.is_trading_day());
        assert_eq!(broker.schedule_calls(), 0);
    }

    #[test]
    fn today_uses_reported_flag() {
        let today = d(2026, 10, 19);
        let broker = FakeBroker::new();
        broker.set_schedule(Ok(Some(TradingSchedule::single("MOEX", today, false))));
        let r = resolve_trading_day(&broker, "MOEX", today, today);
        assert_eq!(r, Resolution::Reported(false));
        assert!(!r.is_trading_day());
        assert_eq!(broker.schedule_calls(), 1);
    }

    #[test]
    fn future_date_is_queried() {
        let today = d(2026, 10, 19);
        let broker = FakeBroker::new();
        broker.set_schedule(Ok(Some(TradingSchedule::single("MOEX", d(2026, 10, 20), true))));
        let r = resolve_trading_day(&broker, "MOEX", d(2026, 10, 20), today);
        assert_eq!(r, Resolution::Reported(true));
    }

    #[test]
    fn missing_or_failed_schedule_falls_back_to_open() {
        let today = d(2026, 10, 19);
        let broker = FakeBroker::new();

        broker.set_schedule(Ok(None));
        assert_eq!(resolve_trading_day(&broker, "MOEX", today, today), Resolution::Fallback);

        broker.set_schedule(Ok(Some(TradingSchedule::default())));
        assert_eq!(resolve_trading_day(&broker, "MOEX", today, today), Resolution::Fallback);

        broker.set_schedule(Err(BrokerError::Unreachable("connection refused".into())));
        let r = resolve_trading_day(&broker, "MOEX", today, today);
        assert_eq!(r, Resolution::Fallback);
        assert!(r.is_trading_day());
    }
}
