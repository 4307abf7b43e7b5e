//! UI rendering.
//!
//! Layout: thread list on the left, conversation on the right, status bar
//! at the bottom. Narrow terminals collapse to the focused pane only.

mod conversation;
mod status_bar;
mod threads;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::layout::{LayoutMode, layout_mode};
use crate::app::state::{AppState, PaneFocus};

pub fn render(frame: &mut Frame, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());
    let (main, bar) = (rows[0], rows[1]);

    match layout_mode(frame.area().width, state.focus) {
        LayoutMode::BothVisible => {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(state.split_ratio),
                    Constraint::Percentage(100 - state.split_ratio),
                ])
                .split(main);
            threads::render(frame, panes[0], state, state.focus == PaneFocus::Threads);
            conversation::render(frame, panes[1], state, state.focus == PaneFocus::Conversation);
        }
        LayoutMode::ListOnly => {
            threads::render(frame, main, state, true);
        }
        LayoutMode::ConversationOnly => {
            conversation::render(frame, main, state, true);
        }
    }

    status_bar::render(frame, bar, state);
}

/// Truncate a string to a display width, accounting for wide characters.
pub(crate) fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if max_width < 4 {
        return s.chars().take(max_width).collect();
    }

    let mut width = 0;
    let mut result = String::new();

    for c in s.chars() {
        let char_width = c.width().unwrap_or(1);
        if width + char_width > max_width - 3 {
            result.push_str("...");
            return result;
        }
        width += char_width;
        result.push(c);
    }
    result
}

/// Greedy word wrap to a display width. Overlong words are split hard.
pub(crate) fn wrap_to_width(text: &str, max_width: usize) -> Vec<String> {
    use unicode_width::UnicodeWidthStr;

    let max_width = max_width.max(1);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut line = String::new();
        let mut line_width = 0;

        for word in raw_line.split_whitespace() {
            let word_width = word.width();
            let sep = usize::from(line_width > 0);

            if line_width + sep + word_width <= max_width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += sep + word_width;
                continue;
            }

            if line_width > 0 {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }

            if word_width <= max_width {
                line.push_str(word);
                line_width = word_width;
            } else {
                // Hard-split a word wider than the pane.
                for c in word.chars() {
                    use unicode_width::UnicodeWidthChar;
                    let w = c.width().unwrap_or(1);
                    if line_width + w > max_width {
                        lines.push(std::mem::take(&mut line));
                        line_width = 0;
                    }
                    line.push(c);
                    line_width += w;
                }
            }
        }

        lines.push(line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
