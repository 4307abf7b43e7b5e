//! Local view of the remote thread lists plus the active selection.
//!
//! The store is owned and mutated exclusively by the sync coordinator; every
//! other component sees cloned projections delivered through events. The
//! active selection is a non-owning reference: it is only ever an id that is
//! present in the last applied snapshot.

use crate::api::{Thread, UserId};

#[derive(Debug, Default)]
pub struct ThreadStore {
    pending: Vec<Thread>,
    archived: Vec<Thread>,
    active: Option<UserId>,
}

impl ThreadStore {
    /// Fully replace both lists from a fetched snapshot. No per-field
    /// diffing; the lists are small and re-rendering is cheap.
    pub fn replace_snapshot(&mut self, pending: Vec<Thread>, archived: Vec<Thread>) {
        self.pending = pending;
        self.archived = archived;
    }

    pub fn pending(&self) -> &[Thread] {
        &self.pending
    }

    pub fn archived(&self) -> &[Thread] {
        &self.archived
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.find(user_id).is_some()
    }

    pub fn find(&self, user_id: UserId) -> Option<&Thread> {
        self.pending
            .iter()
            .chain(self.archived.iter())
            .find(|thread| thread.user_id == user_id)
    }

    /// Explicit user selection. Returns the selected thread, or `None` if
    /// the id is not in the current snapshot (the selection is unchanged).
    pub fn set_active(&mut self, user_id: UserId) -> Option<&Thread> {
        if !self.contains(user_id) {
            return None;
        }
        self.active = Some(user_id);
        self.find(user_id)
    }

    /// Re-resolve the selection after a snapshot was applied.
    ///
    /// Order: a present `preferred` id wins, then the current selection if
    /// still present, then the first pending thread, then the first archived
    /// thread, then none. An explicit user click (passed as `preferred`)
    /// therefore always wins over incidental refreshes, and the selection
    /// never points at a thread absent from the snapshot.
    pub fn resolve_active(&mut self, preferred: Option<UserId>) -> Option<&Thread> {
        let next = preferred
            .filter(|id| self.contains(*id))
            .or_else(|| self.active.filter(|id| self.contains(*id)))
            .or_else(|| self.pending.first().map(|thread| thread.user_id))
            .or_else(|| self.archived.first().map(|thread| thread.user_id));
        self.active = next;
        next.and_then(|id| self.find(id))
    }

    pub fn active_id(&self) -> Option<UserId> {
        self.active
    }

    pub fn active_thread(&self) -> Option<&Thread> {
        self.active.and_then(|id| self.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ThreadStatus;

    fn thread(user_id: UserId, status: ThreadStatus) -> Thread {
        Thread {
            user_id,
            name: format!("Customer {}", user_id),
            phone_number: format!("+52 55 000 {:04}", user_id),
            status,
            status_label: String::new(),
            last_message: None,
            last_message_at: None,
            remaining_seconds: 0,
            window_expired: true,
            window_label: String::new(),
        }
    }

    #[test]
    fn resolve_picks_first_pending_when_nothing_selected() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(vec![thread(7, ThreadStatus::Pending)], vec![]);

        let active = store.resolve_active(None).unwrap();
        assert_eq!(active.user_id, 7);
        assert_eq!(store.active_id(), Some(7));
    }

    #[test]
    fn selection_survives_move_between_lists() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(
            vec![thread(7, ThreadStatus::Pending)],
            vec![thread(2, ThreadStatus::Resolved)],
        );
        store.resolve_active(Some(7));

        // Thread 7 was resolved server-side and moved to the archived list.
        store.replace_snapshot(
            vec![],
            vec![thread(2, ThreadStatus::Resolved), thread(7, ThreadStatus::Resolved)],
        );
        let active = store.resolve_active(None).unwrap();
        assert_eq!(active.user_id, 7);
        assert_eq!(active.status, ThreadStatus::Resolved);
    }

    #[test]
    fn selection_stable_across_reorder() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(
            vec![thread(1, ThreadStatus::Pending), thread(2, ThreadStatus::Pending)],
            vec![],
        );
        store.resolve_active(Some(2));

        store.replace_snapshot(
            vec![thread(2, ThreadStatus::Pending), thread(1, ThreadStatus::Pending)],
            vec![],
        );
        assert_eq!(store.resolve_active(None).unwrap().user_id, 2);
    }

    #[test]
    fn selection_falls_back_when_thread_disappears() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(
            vec![thread(5, ThreadStatus::Pending), thread(6, ThreadStatus::Pending)],
            vec![thread(9, ThreadStatus::Resolved)],
        );
        store.resolve_active(Some(5));

        // Thread 5 deleted; first pending wins over archived.
        store.replace_snapshot(
            vec![thread(6, ThreadStatus::Pending)],
            vec![thread(9, ThreadStatus::Resolved)],
        );
        assert_eq!(store.resolve_active(None).unwrap().user_id, 6);

        // No pending left; fall back to first archived.
        store.replace_snapshot(vec![], vec![thread(9, ThreadStatus::Resolved)]);
        assert_eq!(store.resolve_active(None).unwrap().user_id, 9);

        // Nothing left at all.
        store.replace_snapshot(vec![], vec![]);
        assert!(store.resolve_active(None).is_none());
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn preferred_id_wins_over_current_selection() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(
            vec![thread(1, ThreadStatus::Pending), thread(2, ThreadStatus::Pending)],
            vec![],
        );
        store.resolve_active(Some(1));

        assert_eq!(store.resolve_active(Some(2)).unwrap().user_id, 2);
    }

    #[test]
    fn absent_preferred_id_keeps_current_selection() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(vec![thread(1, ThreadStatus::Pending)], vec![]);
        store.resolve_active(Some(1));

        assert_eq!(store.resolve_active(Some(99)).unwrap().user_id, 1);
    }

    #[test]
    fn set_active_rejects_unknown_id() {
        let mut store = ThreadStore::default();
        store.replace_snapshot(vec![thread(1, ThreadStatus::Pending)], vec![]);
        store.resolve_active(None);

        assert!(store.set_active(42).is_none());
        assert_eq!(store.active_id(), Some(1));
    }
}
