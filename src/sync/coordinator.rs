//! The sync coordinator actor loop.
//!
//! Classic single-flight with one pending successor: a refresh cycle runs to
//! completion, then every trigger that arrived in the meantime is coalesced
//! into at most one follow-up cycle carrying the most recent preferred id.
//! Cycles never overlap, so a late response can never clobber newer state.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::api::{ChatApi, UserId};
use crate::store::ThreadStore;

use super::{SyncCommand, SyncEvent};

pub(super) struct SyncCoordinator<A: ChatApi> {
    api: A,
    store: ThreadStore,
    event_tx: mpsc::Sender<SyncEvent>,
    /// Non-trigger commands drained while coalescing, replayed in order.
    deferred: VecDeque<SyncCommand>,
}

impl<A: ChatApi> SyncCoordinator<A> {
    pub(super) fn new(api: A, store: ThreadStore, event_tx: mpsc::Sender<SyncEvent>) -> Self {
        Self {
            api,
            store,
            event_tx,
            deferred: VecDeque::new(),
        }
    }

    pub(super) async fn run(mut self, mut cmd_rx: mpsc::Receiver<SyncCommand>) {
        loop {
            let cmd = match self.deferred.pop_front() {
                Some(cmd) => cmd,
                None => match cmd_rx.recv().await {
                    Some(cmd) => cmd,
                    None => break,
                },
            };

            match cmd {
                SyncCommand::Shutdown => break,
                SyncCommand::Trigger { preferred } => {
                    // Single-flight: run the cycle, then fold everything that
                    // queued up behind it into at most one more cycle.
                    let mut next = Some(preferred);
                    while let Some(preferred) = next.take() {
                        self.refresh_cycle(preferred).await;
                        next = self.coalesce_queued(&mut cmd_rx);
                    }
                }
                SyncCommand::Select { user_id } => self.select(user_id).await,
                SyncCommand::SendMessage { text } => {
                    if let Some(user_id) = self.send_message(text).await {
                        self.deferred
                            .push_back(SyncCommand::Trigger { preferred: Some(user_id) });
                    }
                }
                SyncCommand::Resolve => {
                    if let Some(user_id) = self.resolve().await {
                        self.deferred
                            .push_back(SyncCommand::Trigger { preferred: Some(user_id) });
                    }
                }
                SyncCommand::Reopen => {
                    if let Some(user_id) = self.reopen().await {
                        self.deferred
                            .push_back(SyncCommand::Trigger { preferred: Some(user_id) });
                    }
                }
            }
        }
        tracing::info!("sync coordinator shutting down");
    }

    /// Drain triggers that arrived during the last cycle. Merge rule: a
    /// later `Some(id)` wins; a later `None` keeps the already-queued id.
    /// Other commands are deferred in arrival order.
    fn coalesce_queued(
        &mut self,
        cmd_rx: &mut mpsc::Receiver<SyncCommand>,
    ) -> Option<Option<UserId>> {
        let mut queued: Option<Option<UserId>> = None;
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                SyncCommand::Trigger { preferred } => {
                    queued = Some(preferred.or(queued.flatten()));
                }
                other => self.deferred.push_back(other),
            }
        }
        queued
    }

    /// One fetch-and-apply sequence: snapshot -> replace -> re-resolve the
    /// selection -> load the active thread's messages.
    async fn refresh_cycle(&mut self, preferred: Option<UserId>) {
        self.emit(SyncEvent::RefreshStarted).await;

        let snapshot = match self.api.fetch_threads().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("thread snapshot fetch failed: {}", e);
                self.emit(SyncEvent::RefreshFailed {
                    error: e.to_string(),
                })
                .await;
                return;
            }
        };

        self.store.replace_snapshot(snapshot.pending, snapshot.archived);
        let active = self.store.resolve_active(preferred).cloned();

        self.emit(SyncEvent::SnapshotApplied {
            pending: self.store.pending().to_vec(),
            archived: self.store.archived().to_vec(),
            active: active.clone(),
        })
        .await;

        let Some(active) = active else {
            return;
        };

        match self.api.fetch_messages(active.user_id).await {
            Ok(messages) => {
                self.emit(SyncEvent::MessagesLoaded {
                    user_id: active.user_id,
                    messages,
                })
                .await;
            }
            Err(e) => {
                tracing::warn!("message fetch for {} failed: {}", active.user_id, e);
                self.emit(SyncEvent::RefreshFailed {
                    error: e.to_string(),
                })
                .await;
            }
        }
    }

    async fn select(&mut self, user_id: UserId) {
        let Some(thread) = self.store.set_active(user_id).cloned() else {
            tracing::debug!("ignoring selection of unknown thread {}", user_id);
            return;
        };

        self.emit(SyncEvent::ActiveChanged {
            active: Some(thread),
        })
        .await;

        match self.api.fetch_messages(user_id).await {
            Ok(messages) => {
                self.emit(SyncEvent::MessagesLoaded { user_id, messages }).await;
            }
            Err(e) => {
                self.emit(SyncEvent::RefreshFailed {
                    error: e.to_string(),
                })
                .await;
            }
        }
    }

    /// Returns the thread id to refresh on success; `None` on failure (no
    /// local mutation happens until the backend confirms).
    async fn send_message(&mut self, text: String) -> Option<UserId> {
        let Some(user_id) = self.store.active_id() else {
            self.emit(SyncEvent::ActionFailed {
                error: "Select a conversation before sending.".to_string(),
            })
            .await;
            return None;
        };

        match self.api.send_message(user_id, text).await {
            Ok(()) => {
                self.emit(SyncEvent::MessageSent { user_id }).await;
                Some(user_id)
            }
            Err(e) => {
                self.emit(SyncEvent::ActionFailed {
                    error: e.to_string(),
                })
                .await;
                None
            }
        }
    }

    async fn resolve(&mut self) -> Option<UserId> {
        let Some(user_id) = self.store.active_id() else {
            return None;
        };

        match self.api.resolve(user_id).await {
            Ok(()) => {
                self.emit(SyncEvent::ThreadResolved { user_id }).await;
                Some(user_id)
            }
            Err(e) => {
                self.emit(SyncEvent::ActionFailed {
                    error: e.to_string(),
                })
                .await;
                None
            }
        }
    }

    async fn reopen(&mut self) -> Option<UserId> {
        let Some(user_id) = self.store.active_id() else {
            return None;
        };

        match self.api.reopen(user_id).await {
            Ok(()) => {
                self.emit(SyncEvent::ThreadReopened { user_id }).await;
                Some(user_id)
            }
            Err(e) => {
                self.emit(SyncEvent::ActionFailed {
                    error: e.to_string(),
                })
                .await;
                None
            }
        }
    }

    async fn emit(&self, event: SyncEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            tracing::debug!("failed to send sync event: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::{Notify, mpsc};
    use tokio::time::timeout;

    use crate::api::{ApiError, ChatApi, Message, Thread, ThreadSnapshot, ThreadStatus, UserId};
    use crate::sync::{SyncCommand, SyncEvent, spawn_sync_coordinator};

    fn thread(user_id: UserId, status: ThreadStatus) -> Thread {
        Thread {
            user_id,
            name: format!("Customer {}", user_id),
            phone_number: String::new(),
            status,
            status_label: String::new(),
            last_message: None,
            last_message_at: None,
            remaining_seconds: 3600,
            window_expired: false,
            window_label: String::new(),
        }
    }

    fn pending_snapshot(ids: &[UserId]) -> ThreadSnapshot {
        ThreadSnapshot {
            pending: ids.iter().map(|id| thread(*id, ThreadStatus::Pending)).collect(),
            archived: Vec::new(),
        }
    }

    /// Backend double. Snapshot fetches block on `gate` until the test
    /// releases them, so triggers can be queued behind an in-flight cycle.
    #[derive(Clone)]
    struct FakeApi {
        snapshot: Arc<ThreadSnapshot>,
        gate: Option<Arc<Notify>>,
        snapshot_fetches: Arc<AtomicUsize>,
        fail_next_snapshot: Arc<AtomicBool>,
        reject_send: Arc<AtomicBool>,
    }

    impl FakeApi {
        fn new(snapshot: ThreadSnapshot) -> Self {
            Self {
                snapshot: Arc::new(snapshot),
                gate: None,
                snapshot_fetches: Arc::new(AtomicUsize::new(0)),
                fail_next_snapshot: Arc::new(AtomicBool::new(false)),
                reject_send: Arc::new(AtomicBool::new(false)),
            }
        }

        fn gated(mut self) -> (Self, Arc<Notify>) {
            let gate = Arc::new(Notify::new());
            self.gate = Some(Arc::clone(&gate));
            (self, gate)
        }
    }

    impl ChatApi for FakeApi {
        async fn fetch_threads(&self) -> Result<ThreadSnapshot, ApiError> {
            self.snapshot_fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_next_snapshot.swap(false, Ordering::SeqCst) {
                return Err(ApiError::Rejected("backend unavailable".to_string()));
            }
            Ok((*self.snapshot).clone())
        }

        async fn fetch_messages(&self, _user_id: UserId) -> Result<Vec<Message>, ApiError> {
            Ok(Vec::new())
        }

        async fn send_message(&self, _user_id: UserId, _text: String) -> Result<(), ApiError> {
            if self.reject_send.load(Ordering::SeqCst) {
                return Err(ApiError::Rejected(
                    "No se puede enviar el mensaje porque la ventana gratuita de 24 horas ha expirado.".to_string(),
                ));
            }
            Ok(())
        }

        async fn resolve(&self, _user_id: UserId) -> Result<(), ApiError> {
            Ok(())
        }

        async fn reopen(&self, _user_id: UserId) -> Result<(), ApiError> {
            Ok(())
        }
    }

    async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for sync event")
            .expect("event channel closed")
    }

    /// Receive events until one matches, skipping progress noise.
    async fn wait_for(
        rx: &mut mpsc::Receiver<SyncEvent>,
        mut matches: impl FnMut(&SyncEvent) -> bool,
    ) -> SyncEvent {
        loop {
            let event = next_event(rx).await;
            if matches(&event) {
                return event;
            }
        }
    }

    #[tokio::test]
    async fn burst_of_triggers_coalesces_to_two_fetches() {
        let (api, gate) = FakeApi::new(pending_snapshot(&[1, 2, 3, 4, 5])).gated();
        let fetches = Arc::clone(&api.snapshot_fetches);
        let mut handle = spawn_sync_coordinator(api);

        handle
            .cmd_tx
            .send(SyncCommand::Trigger { preferred: None })
            .await
            .unwrap();
        // Five more triggers with distinct preferred ids while the first
        // fetch is outstanding.
        for id in 1..=5 {
            handle
                .cmd_tx
                .send(SyncCommand::Trigger { preferred: Some(id) })
                .await
                .unwrap();
        }

        gate.notify_one();
        let first = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::SnapshotApplied { .. })
        })
        .await;
        let SyncEvent::SnapshotApplied { active, .. } = first else {
            unreachable!()
        };
        assert_eq!(active.unwrap().user_id, 1); // first pending, no preference

        gate.notify_one();
        let second = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::SnapshotApplied { .. })
        })
        .await;
        let SyncEvent::SnapshotApplied { active, .. } = second else {
            unreachable!()
        };
        // The coalesced successor carries the last-supplied preferred id.
        assert_eq!(active.unwrap().user_id, 5);

        // Exactly two cycles for the whole burst, never six.
        wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessagesLoaded { .. })
        })
        .await;
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_fetch_releases_the_gate() {
        let api = FakeApi::new(pending_snapshot(&[7]));
        api.fail_next_snapshot.store(true, Ordering::SeqCst);
        let mut handle = spawn_sync_coordinator(api);

        handle
            .cmd_tx
            .send(SyncCommand::Trigger { preferred: None })
            .await
            .unwrap();
        let failed = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::RefreshFailed { .. })
        })
        .await;
        let SyncEvent::RefreshFailed { error } = failed else {
            unreachable!()
        };
        assert_eq!(error, "backend unavailable");

        // A subsequent trigger is not blocked by the failure.
        handle
            .cmd_tx
            .send(SyncCommand::Trigger { preferred: None })
            .await
            .unwrap();
        let applied = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::SnapshotApplied { .. })
        })
        .await;
        let SyncEvent::SnapshotApplied { active, .. } = applied else {
            unreachable!()
        };
        assert_eq!(active.unwrap().user_id, 7);
    }

    #[tokio::test]
    async fn rejected_send_surfaces_verbatim_and_skips_refresh() {
        let api = FakeApi::new(pending_snapshot(&[7]));
        api.reject_send.store(true, Ordering::SeqCst);
        let fetches = Arc::clone(&api.snapshot_fetches);
        let mut handle = spawn_sync_coordinator(api);

        handle
            .cmd_tx
            .send(SyncCommand::Trigger { preferred: None })
            .await
            .unwrap();
        wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessagesLoaded { .. })
        })
        .await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        handle
            .cmd_tx
            .send(SyncCommand::SendMessage {
                text: "Hola".to_string(),
            })
            .await
            .unwrap();
        let failed = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::ActionFailed { .. })
        })
        .await;
        let SyncEvent::ActionFailed { error } = failed else {
            unreachable!()
        };
        assert!(error.contains("24 horas"));

        // No follow-up refresh happens after a rejection.
        handle
            .cmd_tx
            .send(SyncCommand::Select { user_id: 7 })
            .await
            .unwrap();
        wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessagesLoaded { .. })
        })
        .await;
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_send_refreshes_with_active_thread_preferred() {
        let api = FakeApi::new(pending_snapshot(&[3, 9]));
        let fetches = Arc::clone(&api.snapshot_fetches);
        let mut handle = spawn_sync_coordinator(api);

        handle
            .cmd_tx
            .send(SyncCommand::Trigger { preferred: Some(9) })
            .await
            .unwrap();
        wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessagesLoaded { .. })
        })
        .await;

        handle
            .cmd_tx
            .send(SyncCommand::SendMessage {
                text: "On our way".to_string(),
            })
            .await
            .unwrap();

        let sent = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessageSent { .. })
        })
        .await;
        let SyncEvent::MessageSent { user_id } = sent else {
            unreachable!()
        };
        assert_eq!(user_id, 9);

        let applied = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::SnapshotApplied { .. })
        })
        .await;
        let SyncEvent::SnapshotApplied { active, .. } = applied else {
            unreachable!()
        };
        assert_eq!(active.unwrap().user_id, 9);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn selection_is_immediate_and_loads_messages() {
        let api = FakeApi::new(pending_snapshot(&[1, 2]));
        let mut handle = spawn_sync_coordinator(api);

        handle
            .cmd_tx
            .send(SyncCommand::Trigger { preferred: None })
            .await
            .unwrap();
        wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessagesLoaded { .. })
        })
        .await;

        handle
            .cmd_tx
            .send(SyncCommand::Select { user_id: 2 })
            .await
            .unwrap();
        let changed = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::ActiveChanged { .. })
        })
        .await;
        let SyncEvent::ActiveChanged { active } = changed else {
            unreachable!()
        };
        assert_eq!(active.unwrap().user_id, 2);

        let loaded = wait_for(&mut handle.event_rx, |e| {
            matches!(e, SyncEvent::MessagesLoaded { .. })
        })
        .await;
        let SyncEvent::MessagesLoaded { user_id, .. } = loaded else {
            unreachable!()
        };
        assert_eq!(user_id, 2);
    }
}
