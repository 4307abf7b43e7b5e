//! Render-facing application state.
//!
//! Everything here is a projection of coordinator events plus local UI
//! state (cursor, focus, compose buffer). The thread lists are never
//! mutated locally; they are replaced wholesale when a snapshot arrives.

use std::time::Instant;

use crate::api::{Message, Thread, UserId};
use crate::constants::ERROR_TTL_SECS;
use crate::transport::TransportEvent;

/// Which pane owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaneFocus {
    #[default]
    Threads,
    Conversation,
}

/// Status bar state: transient messages and auto-dismissing errors.
#[derive(Debug, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub error: Option<(String, Instant)>,
    pub loading: bool,
}

impl StatusState {
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some((error.into(), Instant::now()));
    }

    /// Drop an expired error. Returns true if one was cleared.
    pub fn clear_error_if_expired(&mut self) -> bool {
        if let Some((_, shown_at)) = self.error
            && shown_at.elapsed().as_secs() >= ERROR_TTL_SECS
        {
            self.error = None;
            return true;
        }
        false
    }

    pub fn acknowledge_error(&mut self) {
        self.error = None;
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub pending: Vec<Thread>,
    pub archived: Vec<Thread>,
    /// The coordinator-owned selection, mirrored for rendering.
    pub active: Option<Thread>,
    /// Messages of the active thread.
    pub messages: Vec<Message>,
    /// Cursor into the combined list (pending first, then archived).
    pub cursor: usize,
    pub focus: PaneFocus,
    /// Outgoing message draft. Cleared only after the backend confirms.
    pub compose: String,
    /// Conversation scroll offset in wrapped lines, counted from the bottom.
    pub scroll: usize,
    pub connection: TransportEvent,
    pub status: StatusState,
    pub split_ratio: u16,
    pub date_format: String,
}

impl AppState {
    /// Combined list length (pending + archived).
    pub fn thread_count(&self) -> usize {
        self.pending.len() + self.archived.len()
    }

    pub fn thread_at(&self, index: usize) -> Option<&Thread> {
        self.pending.iter().chain(self.archived.iter()).nth(index)
    }

    pub fn thread_under_cursor(&self) -> Option<&Thread> {
        self.thread_at(self.cursor)
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.thread_count() {
            self.cursor += 1;
        }
    }

    /// Apply a fresh snapshot and the re-resolved selection. The message
    /// pane is cleared only when the active thread actually changed; a
    /// refresh of the same thread keeps the old messages on screen until
    /// the new ones arrive.
    pub fn apply_snapshot(
        &mut self,
        pending: Vec<Thread>,
        archived: Vec<Thread>,
        active: Option<Thread>,
    ) {
        self.pending = pending;
        self.archived = archived;
        self.set_active(active);
        self.sync_cursor_to_active();
    }

    pub fn set_active(&mut self, active: Option<Thread>) {
        let changed = self.active.as_ref().map(|t| t.user_id) != active.as_ref().map(|t| t.user_id);
        if changed {
            self.messages.clear();
            self.scroll = 0;
            self.compose.clear();
        }
        self.active = active;
    }

    /// Accept loaded messages if they still belong to the active thread.
    /// A stale load for a thread we already left is dropped.
    pub fn apply_messages(&mut self, user_id: UserId, messages: Vec<Message>) -> bool {
        if self.active.as_ref().map(|t| t.user_id) != Some(user_id) {
            return false;
        }
        self.messages = messages;
        self.scroll = 0;
        true
    }

    /// Move the cursor onto the active thread, or clamp it into range.
    pub fn sync_cursor_to_active(&mut self) {
        if let Some(active_id) = self.active.as_ref().map(|t| t.user_id)
            && let Some(index) = self
                .pending
                .iter()
                .chain(self.archived.iter())
                .position(|t| t.user_id == active_id)
        {
            self.cursor = index;
            return;
        }
        self.cursor = self.cursor.min(self.thread_count().saturating_sub(1));
    }
}
