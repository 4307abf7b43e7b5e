//! Main event loop: drain actor events, render when dirty, poll input.

use anyhow::Result;
use crossterm::event;
use ratatui::DefaultTerminal;
use std::time::Duration;

use crate::constants::EVENT_POLL_MS;
use crate::input::{InputResult, handle_input};
use crate::sync::SyncEvent;
use crate::transport::TransportEvent;
use crate::ui;

use super::App;

impl App {
    pub(crate) async fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            // Actor events first (non-blocking) so the UI always renders
            // the freshest state.
            if self.process_sync_events() {
                self.dirty = true;
            }
            if self.process_transport_events() {
                self.dirty = true;
            }

            if self.state.status.clear_error_if_expired() {
                self.dirty = true;
            }

            if self.dirty {
                terminal.draw(|frame| ui::render(frame, &self.state))?;
                self.dirty = false;
            }

            // Input poll doubles as the loop tick.
            if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.state) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.status.acknowledge_error();
                        self.handle_action(action).await?;
                    }
                    InputResult::Char(c) => {
                        self.state.compose.push(c);
                    }
                    InputResult::Backspace => {
                        self.state.compose.pop();
                    }
                    InputResult::Continue => {}
                }
            }
        }

        Ok(())
    }

    /// Drain sync coordinator events. Returns true if any were processed.
    fn process_sync_events(&mut self) -> bool {
        let mut had_events = false;
        while let Ok(event) = self.session.sync.event_rx.try_recv() {
            had_events = true;
            match event {
                SyncEvent::RefreshStarted => {
                    self.state.status.loading = true;
                }
                SyncEvent::SnapshotApplied {
                    pending,
                    archived,
                    active,
                } => {
                    self.state.status.loading = false;
                    self.state.apply_snapshot(pending, archived, active);
                }
                SyncEvent::MessagesLoaded { user_id, messages } => {
                    if !self.state.apply_messages(user_id, messages) {
                        tracing::debug!("dropped stale message load for {}", user_id);
                    }
                }
                SyncEvent::ActiveChanged { active } => {
                    self.state.set_active(active);
                    self.state.sync_cursor_to_active();
                }
                SyncEvent::RefreshFailed { error } => {
                    self.state.status.loading = false;
                    self.state.status.set_error(error);
                }
                SyncEvent::ActionFailed { error } => {
                    self.state.status.set_error(error);
                }
                SyncEvent::MessageSent { user_id } => {
                    tracing::debug!("message to {} confirmed", user_id);
                    self.state.compose.clear();
                    self.state.status.set_status("Sent");
                }
                SyncEvent::ThreadResolved { .. } => {
                    self.state.status.set_status("Conversation resolved");
                }
                SyncEvent::ThreadReopened { .. } => {
                    self.state.status.set_status("Conversation reopened");
                }
            }
        }
        had_events
    }

    /// Drain transport status events. Returns true if any were processed.
    fn process_transport_events(&mut self) -> bool {
        let mut had_events = false;
        while let Ok(event) = self.session.transport.event_rx.try_recv() {
            had_events = true;
            if event == TransportEvent::Disconnected
                && self.state.connection != TransportEvent::Disconnected
            {
                tracing::info!("push channel down, polling fallback active");
            }
            self.state.connection = event;
        }
        had_events
    }
}
