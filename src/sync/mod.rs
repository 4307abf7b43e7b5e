//! Sync coordinator: single-flight refresh gate between the transport and
//! the thread store.
//!
//! This module is split into:
//! - `mod.rs` - Commands, events, handle, and spawn function
//! - `coordinator.rs` - Actor loop, trigger coalescing, and actions

mod coordinator;

use tokio::sync::mpsc;

use crate::api::{ChatApi, Message, Thread, UserId};
use crate::constants::{COMMAND_CHANNEL_CAPACITY, EVENT_CHANNEL_CAPACITY};
use crate::store::ThreadStore;

use coordinator::SyncCoordinator;

/// Commands sent TO the sync coordinator.
#[derive(Debug)]
pub enum SyncCommand {
    /// Refresh the thread snapshot and the active conversation. `preferred`
    /// requests focus on a specific thread; `None` means "refresh current
    /// view". Triggers arriving while a cycle is in flight coalesce into at
    /// most one successor.
    Trigger { preferred: Option<UserId> },
    /// Explicit user selection. Applied immediately, then the thread's
    /// messages are fetched.
    Select { user_id: UserId },
    /// Send an agent message to the active thread.
    SendMessage { text: String },
    /// Mark the active thread resolved (moves it to archived).
    Resolve,
    /// Reopen the active archived thread.
    Reopen,
    Shutdown,
}

/// Events sent FROM the sync coordinator.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    RefreshStarted,
    /// A fetched snapshot was applied and the selection re-resolved.
    SnapshotApplied {
        pending: Vec<Thread>,
        archived: Vec<Thread>,
        active: Option<Thread>,
    },
    /// Messages for the active thread finished loading.
    MessagesLoaded {
        user_id: UserId,
        messages: Vec<Message>,
    },
    /// The selection changed through an explicit user action.
    ActiveChanged { active: Option<Thread> },
    /// A refresh cycle failed; the gate is released and the next trigger
    /// will retry.
    RefreshFailed { error: String },
    /// The backend rejected a send/resolve/reopen; text is verbatim.
    ActionFailed { error: String },
    MessageSent { user_id: UserId },
    ThreadResolved { user_id: UserId },
    ThreadReopened { user_id: UserId },
}

/// Handle for controlling the sync coordinator.
pub struct SyncHandle {
    pub cmd_tx: mpsc::Sender<SyncCommand>,
    pub event_rx: mpsc::Receiver<SyncEvent>,
}

/// Spawn the sync coordinator and return a handle to control it.
///
/// The coordinator owns the [`ThreadStore`]; it is the single writer of both
/// the thread lists and the active selection.
pub fn spawn_sync_coordinator<A: ChatApi + Sync>(api: A) -> SyncHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let coordinator = SyncCoordinator::new(api, ThreadStore::default(), event_tx);
    tokio::spawn(coordinator.run(cmd_rx));

    SyncHandle { cmd_tx, event_rx }
}
