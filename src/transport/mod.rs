//! Transport manager: owns one push connection at a time, with polling
//! fallback and fixed-delay reconnect.
//!
//! This module is split into:
//! - `mod.rs` - Trait, events, handle, and the connection state machine
//! - `ws.rs` - WebSocket implementation of the push channel
//!
//! State machine: `Disconnected -> Connecting -> Connected`, with an
//! orthogonal polling-fallback flag. Any close or error drops back to
//! `Disconnected`, starts polling if not already running, and schedules one
//! reconnect after a fixed delay. The loop owns at most one reconnect sleep
//! at a time, so timers replace rather than stack. There is no terminal
//! state; the manager retries for the lifetime of the session.

mod ws;

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::api::UserId;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::sync::SyncCommand;

pub use ws::WsTransport;

/// An inbound notification frame. The payload is advisory only: the client
/// re-fetches truth regardless, so a frame merely carries an optional focus
/// hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushFrame {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type FrameStream = BoxStream<'static, Result<PushFrame, TransportError>>;

/// A connectable push channel. Implemented by [`WsTransport`] in production
/// and by in-memory fakes in tests.
pub trait PushTransport: Send + 'static {
    fn connect(&mut self) -> impl Future<Output = Result<FrameStream, TransportError>> + Send;
}

/// Connection status, for the status bar only. Transport failures are never
/// surfaced as hard errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportEvent {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Handle for the transport manager.
pub struct TransportHandle {
    shutdown_tx: mpsc::Sender<()>,
    pub event_rx: mpsc::Receiver<TransportEvent>,
}

impl TransportHandle {
    /// Request shutdown. Ends the actor from any state and cancels a
    /// pending reconnect sleep.
    pub async fn shutdown(&self) {
        self.shutdown_tx.send(()).await.ok();
    }
}

/// Spawn the transport manager.
pub fn spawn_transport_manager<T: PushTransport>(
    transport: T,
    triggers: mpsc::Sender<SyncCommand>,
    poll_interval: Duration,
    reconnect_delay: Duration,
) -> TransportHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(transport_loop(
        transport,
        triggers,
        event_tx,
        shutdown_rx,
        poll_interval,
        reconnect_delay,
    ));

    TransportHandle {
        shutdown_tx,
        event_rx,
    }
}

async fn transport_loop<T: PushTransport>(
    mut transport: T,
    triggers: mpsc::Sender<SyncCommand>,
    event_tx: mpsc::Sender<TransportEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
    poll_interval: Duration,
    reconnect_delay: Duration,
) {
    // Some while the polling fallback is active; cleared on every
    // successful open.
    let mut poll: Option<time::Interval> = None;

    loop {
        event_tx.send(TransportEvent::Connecting).await.ok();

        // Keep servicing poll ticks while the connect attempt is pending,
        // so a slow or hung handshake cannot starve the fallback.
        let mut connect = pin!(transport.connect());
        let result = loop {
            tokio::select! {
                result = &mut connect => break result,
                _ = poll_tick(&mut poll) => send_poll_trigger(&triggers).await,
                _ = shutdown_rx.recv() => return,
            }
        };

        match result {
            Ok(mut frames) => {
                // Push delivery is live again; the fallback is redundant.
                poll = None;
                event_tx.send(TransportEvent::Connected).await.ok();
                tracing::info!("push channel connected");

                loop {
                    tokio::select! {
                        frame = frames.next() => match frame {
                            Some(Ok(frame)) => {
                                triggers
                                    .send(SyncCommand::Trigger { preferred: frame.user_id })
                                    .await
                                    .ok();
                            }
                            Some(Err(e)) => {
                                tracing::warn!("push channel error: {}", e);
                                break;
                            }
                            None => {
                                tracing::info!("push channel closed");
                                break;
                            }
                        },
                        _ = shutdown_rx.recv() => return,
                    }
                }
            }
            Err(e) => {
                tracing::warn!("push channel connect failed: {}", e);
            }
        }

        event_tx.send(TransportEvent::Disconnected).await.ok();

        if poll.is_none() {
            // First tick one full period out, then steady cadence.
            let mut interval =
                time::interval_at(time::Instant::now() + poll_interval, poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            poll = Some(interval);
        }

        // The single reconnect timer. Poll ticks keep firing while it runs.
        let mut delay = pin!(time::sleep(reconnect_delay));
        loop {
            tokio::select! {
                _ = &mut delay => break,
                _ = poll_tick(&mut poll) => send_poll_trigger(&triggers).await,
                _ = shutdown_rx.recv() => return,
            }
        }
    }
}

/// Resolves on the next poll tick, or never while the fallback is off.
async fn poll_tick(poll: &mut Option<time::Interval>) {
    match poll {
        Some(interval) => {
            interval.tick().await;
        }
        None => futures::future::pending().await,
    }
}

async fn send_poll_trigger(triggers: &mpsc::Sender<SyncCommand>) {
    // "Refresh current view": the coordinator keeps its own selection.
    triggers
        .send(SyncCommand::Trigger { preferred: None })
        .await
        .ok();
}
