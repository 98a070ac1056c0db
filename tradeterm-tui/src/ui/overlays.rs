//! Overlay widgets: date picker, error history, help.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use chrono::Datelike;

use tradeterm_core::calendar::format_display;

use crate::app::AppState;
use crate::date_picker::DatePickerState;
use crate::theme;
use crate::ui::centered_rect;

/// Month grid; weekends and future days are shown but never selectable.
pub fn render_date_picker(f: &mut Frame, area: Rect, picker: &DatePickerState) {
    let popup = centered_rect(40, 60, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(format!(" {} ", picker.month_label()))
        .title_style(theme::accent_bold());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines = vec![
        Line::from(Span::styled(" Mo Tu We Th Fr Sa Su", theme::muted())),
    ];
    for week in picker.grid() {
        let mut spans = vec![Span::raw(" ")];
        for cell in week {
            let span = match cell {
                None => Span::raw("   "),
                Some(date) => {
                    let style = if date == picker.cursor {
                        theme::button(true, false)
                    } else if picker.is_offered(date) {
                        theme::accent()
                    } else {
                        theme::disabled()
                    };
                    Span::styled(format!("{:>2} ", date.day()), style)
                }
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" ", theme::muted()),
        Span::styled(format_display(picker.cursor), theme::accent_bold()),
    ]));
    lines.push(Line::from(Span::styled(
        " h/l day  j/k week  </> month  t latest",
        theme::muted(),
    )));
    lines.push(Line::from(Span::styled(" [Enter]select [Esc]cancel", theme::muted())));

    f.render_widget(Paragraph::new(lines), inner);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Keyboard reference.
pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Help [any key]close ")
        .title_style(theme::accent_bold());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Instrument page");
    key(&mut lines, "d / Enter", "Open the date picker");
    key(&mut lines, "1-4", "Interval: 1 min, 5 min, 15 min, 1 hour");
    key(&mut lines, "[ / ]", "Previous / next interval");
    key(&mut lines, "r", "Start / stop the robot");
    key(&mut lines, "i / Esc", "Back to the instrument list");
    lines.push(Line::from(""));

    section(&mut lines, "Backtest playback");
    key(&mut lines, "Space", "Play / pause");
    key(&mut lines, "h / l", "Step one candle back / forward");
    key(&mut lines, "g", "Restart from the first candle");
    lines.push(Line::from(""));

    section(&mut lines, "Instrument list");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "/", "Type a filter (ticker, name or FIGI)");
    key(&mut lines, "Enter", "Open the instrument");
    key(&mut lines, "r", "Reload the list");
    lines.push(Line::from(""));

    section(&mut lines, "Anywhere");
    key(&mut lines, "e", "Error history");
    key(&mut lines, "?", "This help");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Date and interval are locked while the robot runs.",
        theme::warning(),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>12}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
