//! Cooperative cancellation for playback.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// A flag shared between whoever controls playback and the thread writing
/// to the sink. Clones observe the same flag.
///
/// Playback checks it between chunks, so a cancel takes effect after at most
/// one chunk.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask any playback watching this token to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Clear the flag so the token can be reused for the next cycle.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
