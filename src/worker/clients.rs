//! Open client bookkeeping.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::lock::{rw_read, rw_write};

const SOURCE: &str = "worker::clients";

/// Registry of open client windows and which of them the worker
/// controls.
///
/// A client appears when a document navigation passes through the
/// gateway. Activation claims every open client immediately instead of
/// waiting for its next navigation; clients that navigate after
/// activation are controlled from the start.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    next_id: AtomicU64,
    clients: RwLock<HashMap<u64, bool>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly observed client; returns its id.
    pub fn register(&self, controlled: bool) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        rw_write(&self.clients, SOURCE, "register").insert(id, controlled);
        id
    }

    /// Claim every open client; returns how many are now controlled.
    pub fn claim_all(&self) -> usize {
        let mut clients = rw_write(&self.clients, SOURCE, "claim_all");
        for controlled in clients.values_mut() {
            *controlled = true;
        }
        clients.len()
    }

    pub fn client_count(&self) -> usize {
        rw_read(&self.clients, SOURCE, "client_count").len()
    }

    pub fn controlled_count(&self) -> usize {
        rw_read(&self.clients, SOURCE, "controlled_count")
            .values()
            .filter(|controlled| **controlled)
            .count()
    }
}
