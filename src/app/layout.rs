//! Width-driven layout decision.
//!
//! Pure function of terminal width and focus, so it is trivially testable
//! and recomputed on every render; a resize changes the layout on the next
//! frame without any stored mode.

use crate::constants::MIN_SPLIT_VIEW_WIDTH;

use super::state::PaneFocus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    ListOnly,
    ConversationOnly,
    BothVisible,
}

/// Wide terminals show both panes; narrow ones show only the focused pane.
pub fn layout_mode(width: u16, focus: PaneFocus) -> LayoutMode {
    if width >= MIN_SPLIT_VIEW_WIDTH {
        return LayoutMode::BothVisible;
    }
    match focus {
        PaneFocus::Threads => LayoutMode::ListOnly,
        PaneFocus::Conversation => LayoutMode::ConversationOnly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_terminal_shows_both_panes() {
        assert_eq!(
            layout_mode(MIN_SPLIT_VIEW_WIDTH, PaneFocus::Threads),
            LayoutMode::BothVisible
        );
        assert_eq!(
            layout_mode(120, PaneFocus::Conversation),
            LayoutMode::BothVisible
        );
    }

    #[test]
    fn narrow_terminal_shows_focused_pane() {
        assert_eq!(
            layout_mode(MIN_SPLIT_VIEW_WIDTH - 1, PaneFocus::Threads),
            LayoutMode::ListOnly
        );
        assert_eq!(
            layout_mode(40, PaneFocus::Conversation),
            LayoutMode::ConversationOnly
        );
    }
}
