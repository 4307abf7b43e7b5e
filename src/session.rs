//! Wires the sync coordinator and transport manager into one session.

use std::time::Duration;

use crate::api::HttpApi;
use crate::config::Config;
use crate::sync::{self, SyncCommand, SyncHandle};
use crate::transport::{self, TransportHandle, WsTransport};

/// One running dashboard session: the sync coordinator plus the transport
/// manager feeding it triggers.
pub struct DashboardSession {
    pub sync: SyncHandle,
    pub transport: TransportHandle,
}

impl DashboardSession {
    pub fn start(config: &Config) -> Self {
        let api = HttpApi::new(&config.server.base_url, config.server.api_token.clone());
        let sync = sync::spawn_sync_coordinator(api);

        let transport = transport::spawn_transport_manager(
            WsTransport::new(config.server.ws_url()),
            sync.cmd_tx.clone(),
            Duration::from_secs(config.sync.poll_interval_secs),
            Duration::from_secs(config.sync.reconnect_delay_secs),
        );

        Self { sync, transport }
    }

    /// Stop both actors. The transport goes first so no late trigger lands
    /// after the coordinator is gone.
    pub async fn shutdown(&self) {
        self.transport.shutdown().await;
        self.sync.cmd_tx.send(SyncCommand::Shutdown).await.ok();
    }
}
