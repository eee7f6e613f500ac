//! Cancellation tickets: one per generation run, last-started-wins.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handed out by [`TicketIssuer`]; stops being current as soon as a newer
/// ticket is issued or the issuer is revoked.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl Ticket {
    /// A ticket nobody can supersede, for one-shot callers like the HTTP API.
    pub fn detached() -> Self {
        Ticket { id: 0, latest: Arc::new(AtomicU64::new(0)) }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct TicketIssuer {
    latest: Arc<AtomicU64>,
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { id, latest: Arc::clone(&self.latest) }
    }

    /// Invalidate every ticket issued so far.
    pub fn revoke_all(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
