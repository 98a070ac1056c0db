//! Instrument listing: the fallback route when no usable FIGI is given.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::ListingState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, listing: &ListingState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(area);

    let filter_style = if listing.filter_active {
        theme::accent_bold()
    } else {
        theme::muted()
    };
    let cursor = if listing.filter_active { "_" } else { "" };
    let header = Line::from(vec![
        Span::styled(" Filter: ", theme::muted()),
        Span::styled(format!("{}{cursor}", listing.filter), filter_style),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let rows = listing.filtered();
    if rows.is_empty() {
        let msg = if listing.loading {
            " Loading instruments..."
        } else {
            " No instruments."
        };
        f.render_widget(Paragraph::new(Span::styled(msg, theme::muted())), chunks[1]);
        return;
    }

    // Keep the cursor row on screen.
    let height = chunks[1].height as usize;
    let start = listing.cursor.saturating_sub(height.saturating_sub(1));
    let lines: Vec<Line> = rows
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, inst)| {
            let selected = i == listing.cursor;
            let marker = if selected { ">" } else { " " };
            let ticker_style = if selected {
                theme::accent_bold().add_modifier(Modifier::REVERSED)
            } else {
                theme::accent()
            };
            Line::from(vec![
                Span::styled(format!("{marker} "), theme::accent()),
                Span::styled(format!("{:<8}", inst.ticker), ticker_style),
                Span::styled(format!(" {:<32}", inst.name), theme::neutral()),
                Span::styled(inst.figi.clone(), theme::muted()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[1]);
}
