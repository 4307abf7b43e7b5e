//! Application core - owns the session handles and the render state.

mod actions;
mod event_loop;
pub mod layout;
pub mod state;

use anyhow::Result;

use crate::api::UserId;
use crate::config::Config;
use crate::constants::{SPLIT_RATIO_MAX, SPLIT_RATIO_MIN};
use crate::session::DashboardSession;
use crate::sync::SyncCommand;

use state::AppState;

pub struct App {
    pub(crate) session: DashboardSession,
    pub(crate) state: AppState,
    /// Thread to focus on startup, from `--user <id>`.
    pub(crate) deep_link: Option<UserId>,
    /// Dirty flag: when true, the UI needs a re-render.
    pub(crate) dirty: bool,
}

impl App {
    pub fn new(config: &Config, deep_link: Option<UserId>) -> Self {
        let session = DashboardSession::start(config);

        let state = AppState {
            split_ratio: config.ui.split_ratio.clamp(SPLIT_RATIO_MIN, SPLIT_RATIO_MAX),
            date_format: config.ui.date_format.clone(),
            ..Default::default()
        };

        Self {
            session,
            state,
            deep_link,
            dirty: true,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ratatui::init();

        // First refresh; the deep link becomes the preferred selection.
        self.state.status.loading = true;
        self.session
            .sync
            .cmd_tx
            .send(SyncCommand::Trigger {
                preferred: self.deep_link,
            })
            .await
            .ok();

        let result = self.event_loop(&mut terminal).await;

        ratatui::restore();
        self.session.shutdown().await;

        result
    }
}
