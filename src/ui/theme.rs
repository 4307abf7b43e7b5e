//! Centralized theming for the atelier TUI
//!
//! Single source of truth for all colors and styles used throughout the
//! application.

use ratatui::style::{Color, Modifier, Style};

pub mod symbols {
    pub const CONNECTED: &str = "●";
    pub const CONNECTING: &str = "◐";
    pub const POLLING: &str = "○";
    pub const ACTIVE_MARKER: &str = "▸";
}

pub struct Theme;

impl Theme {
    pub fn text() -> Style {
        Style::default().fg(Color::White)
    }

    pub fn text_muted() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Rgb(69, 71, 90))
            .add_modifier(Modifier::BOLD)
    }

    pub fn section_header() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    }

    pub fn error_bar() -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD)
    }

    // Sender colors in the conversation pane.

    pub fn customer() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn agent() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn bot() -> Style {
        Style::default().fg(Color::Magenta)
    }

    pub fn window_open() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn window_expired() -> Style {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    }
}
