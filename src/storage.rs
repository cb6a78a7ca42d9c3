//! Snapshot persistence.
//!
//! The whole ledger is written as one JSON document after every mutation.
//! Writes are fire-and-forget: a failed save is logged and the in-memory
//! state stays authoritative for the rest of the session. A missing or
//! corrupt snapshot on load yields `None` and the caller reseeds.

use crate::ledger::LedgerState;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Boundary between the ledger and its persistence medium.
pub trait SnapshotStore {
    /// Load the persisted snapshot, or `None` when missing or unreadable.
    fn load(&self) -> Option<LedgerState>;

    /// Persist the snapshot. Failures are logged, never surfaced.
    fn save(&self, state: &LedgerState);
}

/// Single-file JSON snapshot store.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Option<LedgerState> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "snapshot corrupt, falling back to seeded state"
                );
                None
            }
        }
    }

    fn save(&self, state: &LedgerState) {
        let bytes = match serde_json::to_vec_pretty(state) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to encode snapshot");
                return;
            }
        };
        if let Err(e) = fs::write(&self.path, bytes) {
            warn!(path = %self.path.display(), error = %e, "failed to persist snapshot");
        } else {
            debug!(path = %self.path.display(), "snapshot persisted");
        }
    }
}

/// In-memory snapshot store. Clones share the same slot, so a test can keep
/// one handle and observe what the store persisted.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Arc<RwLock<Option<LedgerState>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-load a snapshot, as if it had been persisted earlier.
    pub fn preloaded(state: LedgerState) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(state))),
        }
    }

    /// The last persisted snapshot, if any.
    pub fn persisted(&self) -> Option<LedgerState> {
        self.slot.read().expect("snapshot slot poisoned").clone()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Option<LedgerState> {
        self.slot.read().expect("snapshot slot poisoned").clone()
    }

    fn save(&self, state: &LedgerState) {
        *self.slot.write().expect("snapshot slot poisoned") = Some(state.clone());
    }
}
