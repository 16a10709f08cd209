//! Per-game serialization point.
//!
//! Every mutation of a game aggregate (submission, resolution, tally,
//! phase transition) runs under that game's lock, so at most one
//! read-modify-write is in flight per code. The optimistic version check
//! in the repository backs this up against future multi-writer setups.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use nightshade_domain::GameCode;

#[derive(Default)]
pub struct GameLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl GameLocks {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the mutation lock for `code`, creating it on first use.
    pub async fn acquire(&self, code: &GameCode) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(code.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Drop the lock entry once a game is archived.
    pub fn release(&self, code: &GameCode) {
        self.locks.remove(code.as_str());
    }
}
