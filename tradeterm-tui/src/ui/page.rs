//! Instrument page: head (date, interval buttons, loading), content, robot log strip.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use tradeterm_core::calendar::format_display;
use tradeterm_core::domain::Interval;
use tradeterm_core::view::ContentView;

use crate::app::{AppState, PageState};
use crate::theme;
use crate::ui::{chart, spinner};

const LOG_STRIP_HEIGHT: u16 = 7;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, page: &PageState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(3),
            Constraint::Length(LOG_STRIP_HEIGHT),
        ])
        .split(area);

    render_head(f, chunks[0], app, page);
    render_content(f, chunks[1], page);
    render_logs(f, chunks[2], page);
}

fn render_head(f: &mut Frame, area: Rect, app: &AppState, page: &PageState) {
    let locked = app.controls_locked();
    let date_style = if locked { theme::disabled() } else { theme::accent_bold() };

    let mut spans = vec![
        Span::styled(" Date ", theme::muted()),
        Span::styled(format_display(page.selected_date), date_style),
        Span::raw("   "),
    ];
    for interval in Interval::ALL {
        let active = interval == page.interval;
        spans.push(Span::styled(
            format!(" {} {} ", interval.index() + 1, interval.label()),
            theme::button(active, locked),
        ));
        spans.push(Span::raw(" "));
    }
    if page.in_progress {
        spans.push(Span::styled(
            format!("  {} loading", spinner(app.spinner_frame)),
            theme::warning(),
        ));
    }

    let robot = if app.robot_running() {
        Span::styled(format!(" Robot {}: running", app.robot_name), theme::positive())
    } else {
        Span::styled(format!(" Robot {}: stopped", app.robot_name), theme::muted())
    };
    let mode = if page.is_backtest {
        Span::styled("  backtest", theme::warning())
    } else {
        Span::styled("  live", theme::accent())
    };

    let lines = vec![Line::from(spans), Line::from(vec![robot, mode])];
    f.render_widget(Paragraph::new(lines), area);
}

fn render_content(f: &mut Frame, area: Rect, page: &PageState) {
    match page.content() {
        ContentView::Pending => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled("  Checking exchange schedule.", theme::muted())),
            ];
            f.render_widget(Paragraph::new(lines), area);
        }
        ContentView::MarketClosed => {
            let lines = vec![
                Line::from(""),
                Line::from(Span::styled("  Exchange closed.", theme::negative())),
            ];
            f.render_widget(Paragraph::new(lines), area);
        }
        ContentView::Chart => chart::render_live(f, area, page),
        ContentView::Backtest => chart::render_backtest(f, area, page),
    }
}

fn render_logs(f: &mut Frame, area: Rect, page: &PageState) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme::muted())
        .title(" Robot log ")
        .title_style(theme::muted());
    let inner = block.inner(area);
    f.render_widget(block, area);

    if page.robot_logs.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("  No entries.", theme::muted())),
            inner,
        );
        return;
    }

    let skip = page.robot_logs.len().saturating_sub(inner.height as usize);
    let lines: Vec<Line> = page
        .robot_logs
        .iter()
        .skip(skip)
        .map(|log| {
            let time = log.time.with_timezone(&chrono::Local).format("%H:%M:%S");
            Line::from(vec![
                Span::styled(format!("  {time} "), theme::muted()),
                Span::styled(format!("{:<5} ", log.level), theme::log_level(&log.level)),
                Span::raw(log.message.as_str()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), inner);
}
