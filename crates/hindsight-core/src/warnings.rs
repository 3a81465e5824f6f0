use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Capped, time-windowed set of connection keys that already received a
/// repeatable warning notice. Owned by the reconciler instance; nothing here
/// is process-global.
pub(crate) struct WarnWindow {
    ttl: Duration,
    capacity: usize,
    entries: HashMap<String, Instant>,
}

impl WarnWindow {
    pub(crate) fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: HashMap::new(),
        }
    }

    /// True when the key was absent (or its entry expired), i.e. the warning
    /// should be sent now.
    pub(crate) fn insert(&mut self, key: &str) -> bool {
        self.insert_at(key, Instant::now())
    }

    fn insert_at(&mut self, key: &str, now: Instant) -> bool {
        self.entries
            .retain(|_, at| now.duration_since(*at) < self.ttl);

        if self.entries.contains_key(key) {
            return false;
        }

        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, at)| **at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(key.to_string(), now);
        true
    }
}
