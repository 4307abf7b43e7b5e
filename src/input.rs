//! Keyboard handling.
//!
//! Two modes, keyed off the focused pane: the thread list uses vim-style
//! navigation, the conversation pane is a plain text entry with a few
//! control keys. Every mapping is resolved here so the event loop only
//! sees semantic actions.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::state::{AppState, PaneFocus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    /// Open the thread under the cursor.
    Open,
    /// Switch focus between the thread list and the conversation.
    SwitchFocus,
    /// Send the compose buffer to the active thread.
    Send,
    /// Manual refresh of the current view.
    Reload,
    Resolve,
    Reopen,
    ScrollUp,
    ScrollDown,
    /// Leave the conversation pane (or dismiss an error).
    Back,
}

pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    Char(char),
    Backspace,
}

pub fn handle_input(event: Event, state: &AppState) -> InputResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(key, state),
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, state: &AppState) -> InputResult {
    // Ctrl-C quits from anywhere, including mid-compose.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return InputResult::Quit;
    }

    match state.focus {
        PaneFocus::Conversation => handle_compose_key(key),
        PaneFocus::Threads => handle_list_key(key),
    }
}

/// Conversation pane: free text goes to the compose buffer.
fn handle_compose_key(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Esc => InputResult::Action(Action::Back),
        KeyCode::Enter => InputResult::Action(Action::Send),
        KeyCode::Tab => InputResult::Action(Action::SwitchFocus),
        KeyCode::Backspace => InputResult::Backspace,
        KeyCode::Up => InputResult::Action(Action::ScrollUp),
        KeyCode::Down => InputResult::Action(Action::ScrollDown),
        KeyCode::Char(c) => InputResult::Char(c),
        _ => InputResult::Continue,
    }
}

fn handle_list_key(key: KeyEvent) -> InputResult {
    match key.code {
        KeyCode::Char('q') => InputResult::Quit,
        KeyCode::Char('j') | KeyCode::Down => InputResult::Action(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => InputResult::Action(Action::Up),
        KeyCode::Enter | KeyCode::Char('l') => InputResult::Action(Action::Open),
        KeyCode::Tab => InputResult::Action(Action::SwitchFocus),
        KeyCode::Char('r') => InputResult::Action(Action::Reload),
        KeyCode::Char('s') => InputResult::Action(Action::Resolve),
        KeyCode::Char('o') => InputResult::Action(Action::Reopen),
        KeyCode::Esc => InputResult::Action(Action::Back),
        _ => InputResult::Continue,
    }
}
