// ── Optimistic override overlay ──
//
// After an on/off/boost dispatch the cloud keeps reporting the old
// state for a few seconds. The dispatcher records the assumed state
// here; presentation reads consult it before the authoritative record.
// Entries expire on their own and are never written into the store.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Which switchable unit of a device an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideUnit {
    Light,
    Fan,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    assumed_on: bool,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct OverrideStore {
    ttl: Duration,
    entries: DashMap<(String, OverrideUnit), Entry>,
}

impl OverrideStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: DashMap::new(),
        }
    }

    /// Record an assumed state for `(device, unit)`.
    pub fn set(&self, device_id: &str, unit: OverrideUnit, assumed_on: bool) {
        self.entries.insert(
            (device_id.to_owned(), unit),
            Entry {
                assumed_on,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// The assumed state, if a live override exists. Expired entries
    /// are dropped on read so authoritative data wins again.
    pub fn get(&self, device_id: &str, unit: OverrideUnit) -> Option<bool> {
        let key = (device_id.to_owned(), unit);

        // Guard must be dropped before the remove below; removing while
        // a ref into the same shard is held would deadlock.
        {
            let entry = self.entries.get(&key)?;
            if entry.expires_at > Instant::now() {
                return Some(entry.assumed_on);
            }
        }

        self.entries.remove(&key);
        None
    }

    pub fn clear(&self, device_id: &str, unit: OverrideUnit) {
        self.entries.remove(&(device_id.to_owned(), unit));
    }
}
