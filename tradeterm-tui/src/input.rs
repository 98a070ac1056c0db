//! Keyboard input dispatch: overlays → global keys → screen-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use tradeterm_core::domain::Interval;

use crate::app::{AppState, Overlay};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match &app.overlay {
        Overlay::DatePicker(_) => {
            handle_date_picker(app, key);
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::None => {}
    }

    // 2. Filter typing owns the keyboard on the listing.
    if app.page.is_none() && app.listing.filter_active {
        handle_filter_input(app, key);
        return;
    }

    // 3. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        _ => {}
    }

    // 4. Screen-specific keys.
    if app.page.is_some() {
        handle_page_key(app, key);
    } else {
        handle_listing_key(app, key);
    }
}

fn handle_page_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') | KeyCode::Enter => app.open_date_picker(),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            if let Some(interval) = Interval::from_index(index) {
                if !app.select_interval(interval) {
                    app.set_warning("Stop the robot to change the interval");
                }
            }
        }
        KeyCode::Char(']') => app.cycle_interval(true),
        KeyCode::Char('[') => app.cycle_interval(false),
        KeyCode::Char('r') => app.toggle_robot(),
        KeyCode::Char(' ') => with_backtest(app, |p| p.toggle_play()),
        KeyCode::Char('h') | KeyCode::Left => with_backtest(app, |p| p.step(-1)),
        KeyCode::Char('l') | KeyCode::Right => with_backtest(app, |p| p.step(1)),
        KeyCode::Char('g') => with_backtest(app, |p| p.restart()),
        KeyCode::Char('i') | KeyCode::Esc => app.open_listing(),
        _ => {}
    }
}

/// Playback keys only act on a backtest page.
fn with_backtest(app: &mut AppState, f: impl FnOnce(&mut crate::app::PageState)) {
    if let Some(page) = app.page.as_mut().filter(|p| p.is_backtest) {
        f(page);
    }
}

fn handle_listing_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.listing.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.listing.move_cursor(-1),
        KeyCode::Char('/') => app.listing.filter_active = true,
        KeyCode::Char('r') => app.open_listing(),
        KeyCode::Esc => {
            app.listing.filter.clear();
            app.listing.clamp_cursor();
        }
        KeyCode::Enter => {
            if let Some(figi) = app.listing.selected().map(|i| i.figi.clone()) {
                app.open_instrument(&figi);
            }
        }
        _ => {}
    }
}

fn handle_filter_input(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.listing.filter.clear();
            app.listing.filter_active = false;
        }
        KeyCode::Enter => app.listing.filter_active = false,
        KeyCode::Backspace => {
            app.listing.filter.pop();
        }
        KeyCode::Char(c) => app.listing.filter.push(c),
        _ => {}
    }
    app.listing.clamp_cursor();
}

fn handle_date_picker(app: &mut AppState, key: KeyEvent) {
    let Overlay::DatePicker(picker) = &mut app.overlay else {
        return;
    };
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => picker.move_days(-1),
        KeyCode::Char('l') | KeyCode::Right => picker.move_days(1),
        KeyCode::Char('k') | KeyCode::Up => picker.move_days(-7),
        KeyCode::Char('j') | KeyCode::Down => picker.move_days(7),
        KeyCode::Char('<') | KeyCode::PageUp => picker.move_months(-1),
        KeyCode::Char('>') | KeyCode::PageDown => picker.move_months(1),
        KeyCode::Char('t') => picker.jump_to_latest(),
        KeyCode::Enter => app.confirm_date_picker(),
        KeyCode::Esc | KeyCode::Char('q') => app.overlay = Overlay::None,
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::app::Route;
    use crate::test_helpers::{day, drain, test_app};
    use crate::worker::{WorkerCommand, WorkerResponse};
    use tradeterm_core::domain::InstrumentSummary;
    use tradeterm_core::testing::sample_instrument;

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn page_app() -> (AppState, tempfile::TempDir, std::sync::mpsc::Receiver<WorkerCommand>) {
        let (mut app, dir, rx) = test_app(day(2026, 10, 19));
        app.open_instrument(&sample_instrument().figi);
        app.apply(WorkerResponse::InstrumentLoaded {
            figi: sample_instrument().figi,
            instrument: Some(sample_instrument()),
        });
        (app, dir, rx)
    }

    #[test]
    fn quit_key() {
        let (mut app, _dir, _rx) = test_app(day(2026, 10, 19));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn number_keys_pick_interval() {
        let (mut app, _dir, _rx) = page_app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.page.as_ref().unwrap().interval, Interval::OneHour);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.page.as_ref().unwrap().interval, Interval::OneMinute);
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.page.as_ref().unwrap().interval, Interval::OneHour);
    }

    #[test]
    fn date_picker_flow() {
        let (mut app, _dir, _rx) = page_app();
        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(app.overlay, Overlay::DatePicker(_)));
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.overlay, Overlay::None);
        assert_eq!(app.page.as_ref().unwrap().selected_date, day(2026, 10, 12));
    }

    #[test]
    fn escape_leaves_page_for_listing() {
        let (mut app, _dir, rx) = page_app();
        drain(&rx);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.route(), Route::Instruments);
        assert!(matches!(drain(&rx)[..], [WorkerCommand::ListInstruments]));
    }

    #[test]
    fn listing_filter_typing_and_open() {
        let (mut app, _dir, rx) = test_app(day(2026, 10, 19));
        app.listing.instruments = vec![
            InstrumentSummary {
                figi: "F2".into(),
                ticker: "GAZP".into(),
                name: "Gazprom".into(),
            },
            InstrumentSummary {
                figi: sample_instrument().figi,
                ticker: "SBER".into(),
                name: "Sberbank".into(),
            },
        ];
        press(&mut app, KeyCode::Char('/'));
        for c in "sbe".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        // 'q' is filter text here, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert!(!app.listing.filter_active);
        assert_eq!(app.listing.filter, "sbe");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.route(), Route::Instrument(sample_instrument().figi));
        assert!(drain(&rx)
            .iter()
            .any(|c| matches!(c, WorkerCommand::LoadInstrument { .. })));
    }

    #[test]
    fn help_overlay_closes_on_any_key() {
        let (mut app, _dir, _rx) = test_app(day(2026, 10, 19));
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.overlay, Overlay::Help);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.overlay, Overlay::None);
    }
}
