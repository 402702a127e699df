use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::BackendClient;
use crate::cancellation::RequestRegistry;
use crate::session::Session;
use crate::views::local_path;

pub struct AppState {
    pub backend: BackendClient,
    pub session: Session,
    /// In-flight chart requests, keyed by short code and view.
    chart_requests: Mutex<RequestRegistry>,
    next_view: AtomicU64,
    public_url: String,
}

impl AppState {
    pub fn new(backend: BackendClient, session: Session, public_url: &str) -> Self {
        AppState {
            backend,
            session,
            chart_requests: Mutex::new(RequestRegistry::new()),
            next_view: AtomicU64::new(1),
            public_url: public_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Address a short code is reachable at.
    pub fn short_link(&self, short: &str) -> String {
        format!("{}{}", self.public_url, local_path(&[short]))
    }

    /// Identifies one rendered chart page. Only requests from the same page
    /// supersede each other.
    pub fn new_view_id(&self) -> u64 {
        self.next_view.fetch_add(1, Ordering::Relaxed)
    }

    pub fn chart_requests(&self) -> MutexGuard<'_, RequestRegistry> {
        self.chart_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
