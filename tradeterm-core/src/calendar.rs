//! Calendar rules: today, weekdays, selectable picker dates, month grids.
//!
//! All comparisons are on calendar days (`NaiveDate`), never on instants:
//! "is today" means same calendar day in the local time zone.

use chrono::{Datelike, Days, Local, NaiveDate, TimeZone, Weekday};

/// Source of "today". Injected so date rules are testable.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Display format of the date picker (`dd.MM.yyyy`).
pub fn format_display(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The date picker offers weekdays up to and including today.
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    is_weekday(date) && date <= today
}

/// Most recent selectable date: today, or the Friday before a weekend.
pub fn latest_selectable(today: NaiveDate) -> NaiveDate {
    let mut d = today;
    while !is_weekday(d) {
        d = d.pred_opt().unwrap_or(d);
    }
    d
}

/// Move `days` from `from`, then keep walking in the same direction past
/// weekend days. Returns `None` if the result would land after `today`.
pub fn step_selectable(from: NaiveDate, days: i64, today: NaiveDate) -> Option<NaiveDate> {
    let mut d = shift(from, days)?;
    let dir = if days < 0 { -1 } else { 1 };
    while !is_weekday(d) {
        d = shift(d, dir)?;
    }
    if d > today {
        return None;
    }
    Some(d)
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Epoch milliseconds of local midnight on `date`.
pub fn local_midnight_ms(date: NaiveDate) -> i64 {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Monday-first month grid; cells outside the month are `None`.
pub fn month_grid(year: i32, month: u32) -> Vec<[Option<NaiveDate>; 7]> {
    let mut weeks = Vec::new();
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return weeks;
    };
    let mut week = [None; 7];
    let mut col = first.weekday().num_days_from_monday() as usize;
    let mut day = first;
    while day.month() == month {
        week[col] = Some(day);
        col += 1;
        if col == 7 {
            weeks.push(week);
            week = [None; 7];
            col = 0;
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    if col > 0 {
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekend_is_not_weekday() {
        assert!(is_weekday(d(2026, 10, 19))); // Monday
        assert!(is_weekday(d(2026, 10, 23))); // Friday
        assert!(!is_weekday(d(2026, 10, 24))); // Saturday
        assert!(!is_weekday(d(2026, 10, 25))); // Sunday
    }

    #[test]
    fn future_dates_not_selectable() {
        let today = d(2026, 10, 21);
        assert!(is_selectable(today, today));
        assert!(!is_selectable(d(2026, 10, 22), today));
        assert!(is_selectable(d(2026, 10, 20), today));
    }

    #[test]
    fn latest_selectable_on_weekend_is_friday() {
        assert_eq!(latest_selectable(d(2026, 10, 25)), d(2026, 10, 23));
        assert_eq!(latest_selectable(d(2026, 10, 21)), d(2026, 10, 21));
    }

    #[test]
    fn step_skips_weekend() {
        let today = d(2026, 10, 30);
        // Friday -> next Monday
        assert_eq!(step_selectable(d(2026, 10, 23), 1, today), Some(d(2026, 10, 26)));
        // Monday -> previous Friday
        assert_eq!(step_selectable(d(2026, 10, 26), -1, today), Some(d(2026, 10, 23)));
    }

    #[test]
    fn step_past_today_refused() {
        let today = d(2026, 10, 21);
        assert_eq!(step_selectable(today, 1, today), None);
        assert_eq!(step_selectable(d(2026, 10, 19), 7, today), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(format_display(d(2026, 3, 5)), "05.03.2026");
    }

    #[test]
    fn month_grid_layout() {
        // October 2026 starts on a Thursday and has 31 days.
        let grid = month_grid(2026, 10);
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0][3], Some(d(2026, 10, 1)));
        assert_eq!(grid[0][2], None);
        let days: usize = grid.iter().flatten().filter(|c| c.is_some()).count();
        assert_eq!(days, 31);
    }

    #[test]
    fn fixed_clock() {
        assert_eq!(FixedClock(d(2026, 1, 2)).today(), d(2026, 1, 2));
    }
}
