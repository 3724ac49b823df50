//! Per-path download deduplication
//!
//! Callers populating the same cache path queue on one async mutex; the map
//! entry disappears once the last holder lets go.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

/// Registry of in-flight downloads keyed by cache path
#[derive(Debug, Default)]
pub struct InFlight {
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

/// Held while a download for `path` runs
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    path: PathBuf,
    slot: Slot,
    _lock: OwnedMutexGuard<()>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other caller is populating `path`, then claim it
    pub async fn acquire(&self, path: &Path) -> InFlightGuard<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(path.to_path_buf()).or_default())
        };

        let lock = Arc::clone(&slot).lock_owned().await;
        InFlightGuard {
            owner: self,
            path: path.to_path_buf(),
            slot,
            _lock: lock,
        }
    }

    /// Number of paths with a registered slot
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self
            .owner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // map, `slot` and the owned lock: nobody else is waiting
        if Arc::strong_count(&self.slot) == 3 {
            slots.remove(&self.path);
        }
    }
}
