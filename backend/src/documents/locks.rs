//! Per-document mutual exclusion.
//!
//! Two callbacks for the same document (a save racing a force-save, say)
//! must not interleave their resolve-then-write sequences. Each document
//! gets its own async mutex, keyed by its resolved file name; holders of
//! different documents never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::documents::store::{BlobStore, FileDescriptor};
use crate::error::DocumentError;

/// A clonable registry of per-document locks, shared through the app state.
#[derive(Clone, Default)]
pub struct DocumentLocks {
    /// Document id → its lock. Entries are created on first use and kept; the
    /// set of ids is bounded by the documents in the store.
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to document `id`. Access lasts until the
    /// guard is dropped.
    pub async fn acquire(&self, id: &str) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(id).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => self
                .locks
                .write()
                .await
                .entry(id.to_string())
                .or_default()
                .clone(),
        };
        lock.lock_owned().await
    }

    /// Resolves document `id` in `store` and locks it. Resolution is repeated
    /// under the lock, so the returned file is the one the id resolves to for
    /// as long as the guard is held.
    pub async fn resolve_locked(
        &self,
        store: &dyn BlobStore,
        id: &str,
    ) -> Result<(FileDescriptor, OwnedMutexGuard<()>), DocumentError> {
        let mut candidate = store.resolve_by_id_prefix(id)?;
        loop {
            let guard = self.acquire(&candidate.name).await;
            let resolved = store.resolve_by_id_prefix(id)?;
            if resolved.name == candidate.name {
                return Ok((resolved, guard));
            }
            log::debug!(
                "Document {} moved from {} to {} while locking",
                id,
                candidate.name,
                resolved.name
            );
            candidate = resolved;
        }
    }
}
