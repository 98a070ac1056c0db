//! Top-level UI layout: one screen (instrument page or listing) with a status bar.

pub mod chart;
pub mod instruments;
pub mod overlays;
pub mod page;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay};
use crate::theme;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let title = match &app.page {
        Some(page) => page
            .title()
            .unwrap_or_else(|| format!("{} ...", page.figi)),
        None => "Instruments".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {title} "))
        .title_style(theme::panel_title(true));
    let inner = block.inner(main_area);
    f.render_widget(block, main_area);

    match &app.page {
        Some(page) => page::render(f, inner, app, page),
        None => instruments::render(f, inner, &app.listing),
    }

    status_bar::render(f, status_area, app);

    // Draw overlays on top.
    match &app.overlay {
        Overlay::DatePicker(picker) => overlays::render_date_picker(f, main_area, picker),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::None => {}
    }
}

pub fn spinner(frame: usize) -> &'static str {
    SPINNER[frame % SPINNER.len()]
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
