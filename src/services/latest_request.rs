//! Single-slot "latest request wins" guard.
//!
//! Each new request cancels the previous token and takes a fresh,
//! monotonically increasing id. A request may publish its result only while
//! its token is live and its id is still the latest one issued. Only the
//! newest id/token pair is kept; superseded requests are never queued.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct Slot {
    latest: u64,
    outstanding: Option<CancellationToken>,
}

/// Handle held by one in-flight request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    id: u64,
    token: CancellationToken,
}

impl RequestTicket {
    /// Sequence number of the request.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Cancellation token of the request.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Issues request tickets and decides which one is authoritative.
#[derive(Debug, Default)]
pub struct LatestRequest {
    slot: Mutex<Slot>,
}

impl LatestRequest {
    /// Creates a guard with no request issued yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the outstanding request, if any, and issues a new ticket.
    pub fn issue(&self) -> RequestTicket {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.outstanding.take() {
            previous.cancel();
        }
        slot.latest += 1;
        let token = CancellationToken::new();
        slot.outstanding = Some(token.clone());
        RequestTicket {
            id: slot.latest,
            token,
        }
    }

    /// Returns true if the ticket may still publish its result.
    #[must_use]
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        !ticket.token.is_cancelled() && self.slot.lock().latest == ticket.id
    }

    /// Marks the ticket's request as finished, freeing the slot if it is still the latest.
    pub fn finish(&self, ticket: &RequestTicket) {
        let mut slot = self.slot.lock();
        if slot.latest == ticket.id {
            slot.outstanding = None;
        }
    }

    /// Runs `publish` and finishes the request if the ticket is still current.
    ///
    /// The slot stays locked while `publish` runs, so no newer ticket can be
    /// issued or committed in between. Returns `None` without calling
    /// `publish` if the ticket was superseded or cancelled.
    pub fn commit_if_current<R>(
        &self,
        ticket: &RequestTicket,
        publish: impl FnOnce() -> R,
    ) -> Option<R> {
        let mut slot = self.slot.lock();
        if ticket.token.is_cancelled() || slot.latest != ticket.id {
            return None;
        }
        let result = publish();
        slot.outstanding = None;
        Some(result)
    }

    /// Cancels the outstanding request. Returns true if there was one.
    pub fn cancel(&self) -> bool {
        match self.slot.lock().outstanding.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Returns true while a request is in flight.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot.lock().outstanding.is_some()
    }

    /// Id of the most recently issued request (0 before the first).
    #[must_use]
    pub fn latest_id(&self) -> u64 {
        self.slot.lock().latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_monotonically() {
        let guard = LatestRequest::new();
        assert_eq!(guard.latest_id(), 0);
        let a = guard.issue();
        let b = guard.issue();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(guard.latest_id(), 2);
    }

    #[test]
    fn test_new_ticket_supersedes_previous() {
        let guard = LatestRequest::new();
        let a = guard.issue();
        assert!(guard.is_current(&a));

        let b = guard.issue();
        assert!(a.token().is_cancelled());
        assert!(!guard.is_current(&a));
        assert!(guard.is_current(&b));
    }

    #[test]
    fn test_cancel_invalidates_outstanding() {
        let guard = LatestRequest::new();
        let a = guard.issue();
        assert!(guard.is_pending());
        assert!(guard.cancel());
        assert!(!guard.is_current(&a));
        assert!(!guard.is_pending());
        assert!(!guard.cancel());
    }

    #[test]
    fn test_commit_runs_only_for_current_ticket() {
        let guard = LatestRequest::new();
        let a = guard.issue();
        let b = guard.issue();

        let mut published = Vec::new();
        assert_eq!(guard.commit_if_current(&a, || published.push("a")), None);
        assert!(guard.is_pending());

        assert_eq!(guard.commit_if_current(&b, || published.push("b")), Some(()));
        assert_eq!(published, vec!["b"]);
        assert!(!guard.is_pending());
    }

    #[test]
    fn test_commit_blocks_newer_issue_until_published() {
        use std::sync::mpsc;
        use std::sync::Arc;
        use std::thread;

        let guard = Arc::new(LatestRequest::new());
        let a = guard.issue();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let committer = {
            let guard = Arc::clone(&guard);
            thread::spawn(move || {
                guard.commit_if_current(&a, || {
                    entered_tx.send(()).unwrap();
                    release_rx.recv().unwrap();
                    "a"
                })
            })
        };

        entered_rx.recv().unwrap();
        let issuer = {
            let guard = Arc::clone(&guard);
            thread::spawn(move || guard.issue().id())
        };
        // The newer ticket cannot be issued while the commit holds the slot
        thread::sleep(std::time::Duration::from_millis(50));
        assert!(!issuer.is_finished());

        release_tx.send(()).unwrap();
        assert_eq!(committer.join().unwrap(), Some("a"));
        assert_eq!(issuer.join().unwrap(), 2);
    }

    #[test]
    fn test_cancelled_ticket_is_not_committed() {
        let guard = LatestRequest::new();
        let a = guard.issue();
        guard.cancel();
        assert_eq!(guard.commit_if_current(&a, || ()), None);
    }

    #[test]
    fn test_finish_frees_slot_only_for_latest() {
        let guard = LatestRequest::new();
        let a = guard.issue();
        let b = guard.issue();

        guard.finish(&a);
        assert!(guard.is_pending());

        guard.finish(&b);
        assert!(!guard.is_pending());
        // A finished request is no longer affected by cancel
        assert!(!guard.cancel());
        assert!(!b.token().is_cancelled());
    }
}
