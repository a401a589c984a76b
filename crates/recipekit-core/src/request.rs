//! Latest-request-wins tokens.
//!
//! Every template or bitmap fetch takes a token before it suspends. When the
//! response arrives, the caller checks the token against the tracker; any
//! newer request (or an explicit invalidation on navigation) makes the older
//! response stale, and it is discarded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Token identifying one in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic request counter shared between a session and its fetches.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier token.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns true if `token` belongs to the most recent request.
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Makes every outstanding token stale without starting a request.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
