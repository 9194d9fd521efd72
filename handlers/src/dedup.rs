//! Event deduplication.
//!
//! The platform redelivers events it considers unacknowledged, so every event id is remembered
//! for a while and repeats are dropped before the handler chain runs. The set is bounded twice:
//! entries expire after a TTL and the least recently seen id is evicted once capacity is reached.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded set of processed event ids.
#[derive(Debug, Clone)]
pub struct EventDeduplicator {
    seen: Arc<Mutex<LruCache<String, Instant>>>,
    ttl: Duration,
}

impl Default for EventDeduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl EventDeduplicator {
    /// A capacity of 0 is treated as 1.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            seen: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn has_seen(&self, event_id: &str) -> bool {
        self.has_seen_at(event_id, Instant::now())
    }

    pub fn mark_seen(&self, event_id: &str) {
        self.mark_seen_at(event_id, Instant::now());
    }

    /// Returns true when `event_id` is new, marking it seen in the same critical section so two
    /// concurrent deliveries of one event cannot both pass.
    pub fn check_and_mark(&self, event_id: &str) -> bool {
        self.check_and_mark_at(event_id, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn has_seen_at(&self, event_id: &str, now: Instant) -> bool {
        let mut seen = self.lock();
        self.is_live(&mut seen, event_id, now)
    }

    pub(crate) fn mark_seen_at(&self, event_id: &str, now: Instant) {
        self.lock().put(event_id.to_string(), now);
    }

    pub(crate) fn check_and_mark_at(&self, event_id: &str, now: Instant) -> bool {
        let mut seen = self.lock();
        if self.is_live(&mut seen, event_id, now) {
            return false;
        }
        seen.put(event_id.to_string(), now);
        true
    }

    /// True when the id is present and not expired; expired entries are removed.
    fn is_live(&self, seen: &mut LruCache<String, Instant>, event_id: &str, now: Instant) -> bool {
        match seen.peek(event_id) {
            Some(&marked_at) if now.saturating_duration_since(marked_at) < self.ttl => true,
            Some(_) => {
                seen.pop(event_id);
                false
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Instant>> {
        // Critical sections never leave the cache inconsistent, so poisoning is ignored.
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
