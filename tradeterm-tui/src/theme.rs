//! Parrot/neon theme tokens for the terminal
//!
//! # Color Palette
//! - **Accent**: Electric cyan (primary highlights, focus, active buttons)
//! - **Positive**: Neon green (price up, robot running)
//! - **Negative**: Hot pink (price down, errors, market closed)
//! - **Warning**: Neon orange (alerts, backtest mode)
//! - **Neutral**: Cool purple (secondary info)
//! - **Muted**: Steel blue (disabled, secondary text)

use ratatui::style::{Color, Modifier, Style};

pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);
pub const DISABLED: Color = Color::Rgb(70, 70, 80);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn disabled() -> Style {
    Style::default().fg(DISABLED)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

pub fn panel_title(active: bool) -> Style {
    if active {
        accent_bold()
    } else {
        muted()
    }
}

/// Color for a price change (up = green, down = pink).
pub fn change_color(value: f64) -> Color {
    if value >= 0.0 {
        POSITIVE
    } else {
        NEGATIVE
    }
}

/// Interval button style: filled when active, outlined otherwise, grey when locked.
pub fn button(active: bool, locked: bool) -> Style {
    if locked {
        return if active {
            disabled().add_modifier(Modifier::REVERSED)
        } else {
            disabled()
        };
    }
    if active {
        Style::default()
            .fg(Color::Black)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD)
    } else {
        accent()
    }
}

/// Log level color.
pub fn log_level(level: &str) -> Style {
    match level.to_ascii_lowercase().as_str() {
        "error" => negative(),
        "warn" | "warning" => warning(),
        "debug" | "trace" => muted(),
        _ => neutral(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_color() {
        assert_eq!(change_color(1.5), POSITIVE);
        assert_eq!(change_color(-0.1), NEGATIVE);
        assert_eq!(change_color(0.0), POSITIVE);
    }

    #[test]
    fn test_button_styles() {
        assert_eq!(button(true, false).bg, Some(ACCENT));
        assert_eq!(button(false, false).fg, Some(ACCENT));
        assert_eq!(button(false, true).fg, Some(DISABLED));
        assert!(button(true, true).add_modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level("ERROR").fg, Some(NEGATIVE));
        assert_eq!(log_level("warn").fg, Some(WARNING));
        assert_eq!(log_level("info").fg, Some(NEUTRAL));
    }
}
