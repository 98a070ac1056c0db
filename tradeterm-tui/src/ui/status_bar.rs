//! Bottom status bar: key hints for the current screen, last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    let hints = if app.page.is_some() {
        " d:date 1-4:interval r:robot i:instruments ?:help q:quit"
    } else {
        " j/k:move Enter:open /:filter r:reload ?:help q:quit"
    };
    spans.push(Span::styled(hints, theme::muted()));

    if !app.error_history.is_empty() {
        spans.push(Span::styled(
            format!(" e:errors({})", app.error_history.len()),
            theme::negative(),
        ));
    }

    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
