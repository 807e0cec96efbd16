//! Per-identifier mutual exclusion.
//!
//! Writers to the same page take the same mutex; writers to different pages
//! never do. The shared map is only held long enough to look up or retire a
//! slot, never across I/O.

use crate::PageId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<PageId, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`. The slot is retired even if
    /// `f` unwinds.
    pub fn with_key<T>(&self, id: &PageId, f: impl FnOnce() -> T) -> T {
        let slot = SlotGuard {
            locks: self,
            id,
            slot: Some(self.acquire_slot(id)),
        };
        let _held = slot
            .slot
            .as_ref()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner));
        f()
    }

    /// Number of identifiers with a live slot.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn acquire_slot(&self, id: &PageId) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(id.clone()).or_default().clone()
    }

    fn release_slot(&self, id: &PageId, slot: Arc<Mutex<()>>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        drop(slot);
        // Only the map holds it: nobody can be waiting, since waiters clone
        // the slot under this same map lock.
        if let Some(existing) = slots.get(id)
            && Arc::strong_count(existing) == 1
        {
            slots.remove(id);
        }
    }
}

struct SlotGuard<'a> {
    locks: &'a KeyedLocks,
    id: &'a PageId,
    slot: Option<Arc<Mutex<()>>>,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            self.locks.release_slot(self.id, slot);
        }
    }
}
