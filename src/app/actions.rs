//! Semantic input actions, translated into coordinator commands.

use anyhow::Result;

use crate::api::ThreadStatus;
use crate::input::Action;
use crate::sync::SyncCommand;

use super::App;
use super::state::PaneFocus;

impl App {
    pub(crate) async fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Up => self.state.cursor_up(),
            Action::Down => self.state.cursor_down(),
            Action::Open => self.open_under_cursor().await,
            Action::SwitchFocus => {
                self.state.focus = match self.state.focus {
                    PaneFocus::Threads => PaneFocus::Conversation,
                    PaneFocus::Conversation => PaneFocus::Threads,
                };
            }
            Action::Back => {
                self.state.focus = PaneFocus::Threads;
            }
            Action::Send => self.send_compose().await,
            Action::Reload => {
                self.state.status.set_status("Refreshing...");
                self.send_command(SyncCommand::Trigger { preferred: None })
                    .await;
            }
            Action::Resolve => self.resolve_active().await,
            Action::Reopen => self.reopen_active().await,
            Action::ScrollUp => self.state.scroll = self.state.scroll.saturating_add(1),
            Action::ScrollDown => self.state.scroll = self.state.scroll.saturating_sub(1),
        }
        Ok(())
    }

    /// Select the thread under the cursor and move focus to the
    /// conversation so the agent can reply right away.
    async fn open_under_cursor(&mut self) {
        let Some(user_id) = self.state.thread_under_cursor().map(|t| t.user_id) else {
            return;
        };
        self.state.focus = PaneFocus::Conversation;
        self.send_command(SyncCommand::Select { user_id }).await;
    }

    /// Ship the compose buffer. The draft stays on screen until the
    /// backend confirms; a rejection keeps it intact for a retry.
    async fn send_compose(&mut self) {
        let text = self.state.compose.trim().to_string();
        if text.is_empty() {
            return;
        }
        if self.state.active.is_none() {
            self.state.status.set_error("No conversation selected");
            return;
        }
        self.state.status.set_status("Sending...");
        self.send_command(SyncCommand::SendMessage { text }).await;
    }

    async fn resolve_active(&mut self) {
        match self.state.active.as_ref().map(|t| t.status) {
            Some(ThreadStatus::Pending) => {
                self.send_command(SyncCommand::Resolve).await;
            }
            Some(ThreadStatus::Resolved) => {
                self.state.status.set_status("Already resolved");
            }
            None => {}
        }
    }

    async fn reopen_active(&mut self) {
        match self.state.active.as_ref().map(|t| t.status) {
            Some(ThreadStatus::Resolved) => {
                self.send_command(SyncCommand::Reopen).await;
            }
            Some(ThreadStatus::Pending) => {
                self.state.status.set_status("Conversation is already open");
            }
            None => {}
        }
    }

    async fn send_command(&mut self, cmd: SyncCommand) {
        if self.session.sync.cmd_tx.send(cmd).await.is_err() {
            tracing::warn!("sync coordinator is gone");
            self.state.status.set_error("Sync engine stopped");
        }
    }
}
