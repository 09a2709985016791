// ── Snapshot device store ──
//
// Lock-free storage for the authoritative device map. The sync engine
// is the sole writer; every pass replaces the whole map atomically, so
// readers either see the previous snapshot or the new one, never a
// partially updated mix. Replacements bump a generation observable via
// a `watch` channel.

use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{DeviceIdentity, DeviceMap, DeviceRecord};

pub struct DeviceStore {
    map: ArcSwap<DeviceMap>,
    generation: watch::Sender<u64>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceStore {
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        let (last_refresh, _) = watch::channel(None);
        Self {
            map: ArcSwap::from_pointee(DeviceMap::new()),
            generation,
            last_refresh,
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current snapshot. Cheap: clones an `Arc`, not the map.
    pub fn snapshot(&self) -> Arc<DeviceMap> {
        self.map.load_full()
    }

    pub fn device(&self, device_id: &str) -> Option<Arc<DeviceRecord>> {
        self.map.load().get(device_id).cloned()
    }

    pub fn device_count(&self) -> usize {
        self.map.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.load().is_empty()
    }

    /// Registry tuples for every known device.
    pub fn identities(&self) -> Vec<DeviceIdentity> {
        self.map
            .load()
            .values()
            .map(|r| DeviceIdentity::from(r.as_ref()))
            .collect()
    }

    /// When the map was last successfully replaced.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    // ── Writes (engine only) ─────────────────────────────────────────

    /// Replace the whole map and notify subscribers once.
    pub(crate) fn replace_all(&self, map: DeviceMap) {
        self.map.store(Arc::new(map));
        self.last_refresh.send_replace(Some(Utc::now()));
        self.generation.send_modify(|g| *g += 1);
    }

    // ── Observation ──────────────────────────────────────────────────

    /// Subscribe to map replacements. The value is a generation counter;
    /// consumers re-read `snapshot()` when it changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation.subscribe()
    }
}

impl Default for DeviceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviceConfiguration, DeviceState};

    fn record(id: &str) -> Arc<DeviceRecord> {
        Arc::new(DeviceRecord {
            device_id: id.into(),
            device_serial: None,
            name: id.into(),
            device_type: None,
            device_type_id: None,
            delete_pending: false,
            overdue_connection: false,
            state: DeviceState::default(),
            configuration: DeviceConfiguration::default(),
            actions: Vec::new(),
        })
    }

    #[test]
    fn replace_is_wholesale_not_merge() {
        let store = DeviceStore::new();

        let mut first = DeviceMap::new();
        first.insert("a".into(), record("a"));
        first.insert("b".into(), record("b"));
        store.replace_all(first);
        assert_eq!(store.device_count(), 2);

        let mut second = DeviceMap::new();
        second.insert("c".into(), record("c"));
        store.replace_all(second);

        assert_eq!(store.device_count(), 1);
        assert!(store.device("a").is_none());
        assert!(store.device("c").is_some());
    }

    #[test]
    fn old_snapshots_stay_intact() {
        let store = DeviceStore::new();
        let mut first = DeviceMap::new();
        first.insert("a".into(), record("a"));
        store.replace_all(first);

        let held = store.snapshot();
        store.replace_all(DeviceMap::new());

        assert!(held.contains_key("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn generation_bumps_once_per_replace() {
        let store = DeviceStore::new();
        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), 0);

        store.replace_all(DeviceMap::new());
        store.replace_all(DeviceMap::new());
        assert_eq!(*rx.borrow(), 2);
    }
}
