use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chatvault_types::SyncKey;

/// In-process single-flight table: at most one sync per key.
///
/// Acquire is compare-and-set under one lock; release is RAII, so every
/// exit path, error or not, returns the key to idle.
#[derive(Default)]
pub(crate) struct FlightTable {
    in_flight: Mutex<HashSet<SyncKey>>,
}

impl FlightTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Begin a flight, or `None` when the key is already syncing.
    pub(crate) fn try_begin(&self, key: SyncKey) -> Option<FlightGuard<'_>> {
        let mut in_flight = self.lock();
        if !in_flight.insert(key.clone()) {
            return None;
        }
        drop(in_flight);
        Some(FlightGuard { table: self, key })
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<SyncKey>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the key on drop.
pub(crate) struct FlightGuard<'a> {
    table: &'a FlightTable,
    key: SyncKey,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.table.lock().remove(&self.key);
    }
}
