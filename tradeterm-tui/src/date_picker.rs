//! Date picker state: a month grid that only ever offers weekdays up to today.

use chrono::{Datelike, Months, NaiveDate};

use tradeterm_core::calendar::{self, is_selectable, latest_selectable, step_selectable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePickerState {
    /// Highlighted date. Always selectable.
    pub cursor: NaiveDate,
    pub today: NaiveDate,
}

impl DatePickerState {
    /// Open on `selected`, or on the closest offered day at or before it.
    pub fn open(selected: NaiveDate, today: NaiveDate) -> Self {
        let cursor = if is_selectable(selected, today) {
            selected
        } else {
            latest_selectable(selected.min(today))
        };
        Self { cursor, today }
    }

    pub fn is_offered(&self, date: NaiveDate) -> bool {
        is_selectable(date, self.today)
    }

    /// Move by whole days, skipping weekends. Moves past today are ignored.
    pub fn move_days(&mut self, days: i64) {
        if let Some(d) = step_selectable(self.cursor, days, self.today) {
            self.cursor = d;
        }
    }

    /// Move by whole months, landing on the nearest offered day at or before
    /// the same day-of-month.
    pub fn move_months(&mut self, months: i32) {
        let target = if months >= 0 {
            self.cursor.checked_add_months(Months::new(months as u32))
        } else {
            self.cursor.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        let Some(target) = target else {
            return;
        };
        let target = target.min(self.today);
        let target = latest_selectable(target);
        if self.is_offered(target) {
            self.cursor = target;
        }
    }

    pub fn jump_to_latest(&mut self) {
        self.cursor = latest_selectable(self.today);
    }

    /// Weeks of the month the cursor is in.
    pub fn grid(&self) -> Vec<[Option<NaiveDate>; 7]> {
        calendar::month_grid(self.cursor.year(), self.cursor.month())
    }

    pub fn month_label(&self) -> String {
        self.cursor.format("%B %Y").to_string()
    }
}
