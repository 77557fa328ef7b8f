//! Per-topic single-flight marker.
//!
//! Concurrent cold requests for one normalized topic queue behind the first
//! caller instead of each hitting the providers. The entry for a topic is
//! removed when its last holder releases it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type Slots = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// Map of topics currently being fetched.
#[derive(Debug, Clone, Default)]
pub struct InflightTopics {
    slots: Slots,
}

impl InflightTopics {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds `topic`, then holds it.
    pub async fn acquire(&self, topic: &str) -> InflightGuard {
        // The map entry guard is a temporary; it must not live across the await.
        let slot = Arc::clone(self.slots.entry(topic.to_string()).or_default().value());

        let (lock, waited) = match Arc::clone(&slot).try_lock_owned() {
            Ok(lock) => (lock, false),
            Err(_) => (slot.lock_owned().await, true),
        };

        InflightGuard {
            topic: topic.to_string(),
            slots: Arc::clone(&self.slots),
            waited,
            _lock: lock,
        }
    }

    /// Number of topics currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no topic is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Holds one topic until dropped.
#[derive(Debug)]
pub struct InflightGuard {
    topic: String,
    slots: Slots,
    waited: bool,
    _lock: OwnedMutexGuard<()>,
}

impl InflightGuard {
    /// True if another caller held the topic when this one arrived.
    #[must_use]
    pub fn waited(&self) -> bool {
        self.waited
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        // One reference in the map plus the one inside `_lock`: nobody waits.
        self.slots
            .remove_if(&self.topic, |_, slot| Arc::strong_count(slot) <= 2);
    }
}
