use std::collections::HashMap;

use tokio::sync::watch;

/// A token that can be checked for cancellation.
#[derive(Clone)]
pub struct CancellationToken(watch::Receiver<bool>);

impl CancellationToken {
    /// Returns true if cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once cancellation is signalled. Never resolves if the
    /// registry forgets the request without cancelling it.
    pub async fn cancelled(&mut self) {
        let signalled = self.0.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if signalled.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Handle for one in-flight request.
pub struct RequestTicket {
    pub id: u64,
    pub token: CancellationToken,
}

struct ActiveRequest {
    id: u64,
    cancel: watch::Sender<bool>,
}

/// Tracks the latest in-flight request per key (a short code). Starting a new
/// request for a key cancels the one it supersedes.
#[derive(Default)]
pub struct RequestRegistry {
    next_id: u64,
    active: HashMap<String, ActiveRequest>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request for `key`, signalling any older one.
    pub fn begin(&mut self, key: &str) -> RequestTicket {
        self.next_id += 1;
        let id = self.next_id;
        let (tx, rx) = watch::channel(false);
        let request = ActiveRequest { id, cancel: tx };
        if let Some(previous) = self.active.insert(key.to_owned(), request) {
            // Ignore error if the superseded request already finished
            let _ = previous.cancel.send(true);
        }
        RequestTicket {
            id,
            token: CancellationToken(rx),
        }
    }

    /// Forget a finished request. A no-op when a newer request has already
    /// taken its place.
    pub fn finish(&mut self, key: &str, id: u64) {
        if self.is_current(key, id) {
            self.active.remove(key);
        }
    }

    /// Check if `id` is still the latest request for `key`.
    pub fn is_current(&self, key: &str, id: u64) -> bool {
        self.active.get(key).is_some_and(|active| active.id == id)
    }
}
