//! Chart and Backtest content: close-price line chart of the day's candles.

use chrono::Local;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use tradeterm_core::domain::{session_summary, Candle};

use crate::app::PageState;
use crate::theme;

/// Live view: every candle loaded for today.
pub fn render_live(f: &mut Frame, area: Rect, page: &PageState) {
    let (header, body) = split(area);
    let candles = page.visible_candles();
    let mut spans = summary_spans(candles);
    spans.push(Span::styled(
        format!("  {} candles, refreshing", page.interval.label()),
        theme::muted(),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), header);
    render_candles(f, body, candles, page.candles.len());
}

/// Backtest view: the revealed prefix of the selected day, with playback state.
pub fn render_backtest(f: &mut Frame, area: Rect, page: &PageState) {
    let (header, body) = split(area);
    let candles = page.visible_candles();
    let mut spans = summary_spans(candles);
    let state = if page.playback.playing { "playing" } else { "paused" };
    spans.push(Span::styled(
        format!("  {}/{} {state}", candles.len(), page.candles.len()),
        theme::warning(),
    ));
    spans.push(Span::styled(
        "  [Space]play [h/l]step [g]restart",
        theme::muted(),
    ));
    f.render_widget(Paragraph::new(Line::from(spans)), header);
    render_candles(f, body, candles, page.candles.len());
}

fn split(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);
    (chunks[0], chunks[1])
}

fn summary_spans(candles: &[Candle]) -> Vec<Span<'static>> {
    let Some((last, high, low)) = session_summary(candles) else {
        return vec![Span::styled(" No candles yet", theme::muted())];
    };
    let open = candles.first().map(|c| c.open).unwrap_or(last);
    let change = last - open;
    let style = Style::default().fg(theme::change_color(change));
    vec![
        Span::styled(format!(" {last:.2}"), style.add_modifier(Modifier::BOLD)),
        Span::styled(format!(" ({change:+.2})"), style),
        Span::styled(format!("  H {high:.2}  L {low:.2}"), theme::neutral()),
    ]
}

/// Close prices on a fixed x range of `total` slots, so a backtest chart
/// grows left to right instead of rescaling.
fn render_candles(f: &mut Frame, area: Rect, candles: &[Candle], total: usize) {
    if candles.is_empty() {
        return;
    }

    let min_y = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let max_y = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let padding = ((max_y - min_y).abs() * 0.05).max(0.01);
    let y_min = min_y - padding;
    let y_max = max_y + padding;
    let x_max = total.max(candles.len()).saturating_sub(1) as f64;

    let data: Vec<(f64, f64)> = candles
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64, c.close))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);

    let first = time_label(candles.first());
    let last = time_label(candles.last());

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first, theme::muted()),
                    Span::styled(last, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn time_label(candle: Option<&Candle>) -> String {
    candle
        .map(|c| c.time.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}
