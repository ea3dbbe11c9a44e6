//! Single-slot, time-expiring cache for the latest alert snapshot.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    inserted_at: Instant,
}

/// Holds at most one value, served only while younger than `window`.
///
/// Reads and writes replace the slot atomically under a mutex. Coalescing
/// of concurrent misses is the caller's job (see [`crate::AlertGateway`]).
pub struct FreshnessCache<T> {
    slot: Mutex<Option<Entry<T>>>,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> FreshnessCache<T> {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            window,
            clock,
        }
    }

    /// Returns the cached value if `now - inserted_at < window`.
    ///
    /// A stale entry is dropped on the way out.
    pub fn get(&self) -> Option<T> {
        let now = self.clock.now();
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        match slot.as_ref() {
            Some(entry) if now.duration_since(entry.inserted_at) < self.window => {
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!("Cached alert snapshot expired");
                *slot = None;
                None
            }
            None => None,
        }
    }

    /// Replaces the slot and restarts its freshness window.
    pub fn put(&self, value: T) {
        let inserted_at = self.clock.now();
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Entry { value, inserted_at });
    }

    /// When the current entry was stored, if any entry (fresh or stale) is held.
    pub fn inserted_at(&self) -> Option<Instant> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|e| e.inserted_at)
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
