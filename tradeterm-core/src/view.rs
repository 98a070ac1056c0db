//! View-state derivation for the instrument page.
//!
//! Everything here is a pure function of (selected date, today, trading-day
//! flag). The page controller recomputes these whenever an input changes.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::Instrument;

/// What the content region of the instrument page shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentView {
    /// Trading-day flag not resolved yet.
    Pending,
    /// Live chart for today.
    Chart,
    /// Historical playback for a past day.
    Backtest,
    /// The exchange does not trade on the selected day.
    MarketClosed,
}

impl ContentView {
    pub fn label(self) -> &'static str {
        match self {
            ContentView::Pending => "checking schedule",
            ContentView::Chart => "chart",
            ContentView::Backtest => "backtest",
            ContentView::MarketClosed => "market closed",
        }
    }
}

/// Backtest mode whenever the selected calendar day is not today.
pub fn is_backtest(selected: NaiveDate, today: NaiveDate) -> bool {
    selected != today
}

/// The schedule service is only asked about today and later days.
pub fn needs_schedule_query(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today
}

pub fn content_view(trading_day: Option<bool>, backtest: bool) -> ContentView {
    match trading_day {
        None => ContentView::Pending,
        Some(false) => ContentView::MarketClosed,
        Some(true) if backtest => ContentView::Backtest,
        Some(true) => ContentView::Chart,
    }
}

/// Snapshot of the derived page state, used by the CLI `view` command.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub title: String,
    pub date: NaiveDate,
    pub backtest: bool,
    pub trading_day: Option<bool>,
    pub content: ContentView,
}

impl PageView {
    pub fn derive(
        instrument: &Instrument,
        selected: NaiveDate,
        today: NaiveDate,
        trading_day: Option<bool>,
    ) -> Self {
        let backtest = is_backtest(selected, today);
        Self {
            title: instrument.title(backtest),
            date: selected,
            backtest,
            trading_day,
            content: content_view(trading_day, backtest),
        }
    }
}
