//! Per-session mutual exclusion and auto-expansion loop ownership.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async lock per session id.
///
/// Mutations of the same session are serialized; different sessions
/// never contend. An entry lives only while some caller holds or waits
/// on it.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    pub async fn acquire(&self, session_id: &str) -> SessionGuard<'_> {
        let lock = {
            let mut locks = self.table();
            Arc::clone(locks.entry(session_id.to_string()).or_default())
        };
        SessionGuard {
            guard: Some(lock.lock_owned().await),
            locks: self,
            session_id: session_id.to_string(),
        }
    }

    /// Number of sessions with a lock entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table().len()
    }

    /// True when no session lock is held or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the entry for `session_id` unless another caller still has it.
    fn prune(&self, session_id: &str) {
        let mut locks = self.table();
        if locks
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(session_id);
        }
    }
}

/// Exclusive access to one session; releasing it prunes an idle entry.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a SessionLocks,
    session_id: String,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks.prune(&self.session_id);
    }
}

/// Tracks which auto-expansion loop owns each session.
///
/// Every scheduled loop takes a fresh generation from one counter, so a
/// generation is never reused. A loop whose generation is no longer
/// current stops at its next check, so at most one loop per session ever
/// commits. Entries exist only for sessions with a live loop.
#[derive(Debug, Default)]
pub struct LoopGenerations {
    inner: Mutex<Generations>,
}

#[derive(Debug, Default)]
struct Generations {
    last: u64,
    current: HashMap<String, u64>,
}

impl LoopGenerations {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, Generations> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim `session_id` for a new loop and return its generation.
    pub fn begin(&self, session_id: &str) -> u64 {
        let mut state = self.state();
        state.last += 1;
        let generation = state.last;
        state.current.insert(session_id.to_string(), generation);
        generation
    }

    /// True while `generation` is the newest loop for `session_id`.
    #[must_use]
    pub fn is_current(&self, session_id: &str, generation: u64) -> bool {
        self.state()
            .current
            .get(session_id)
            .is_some_and(|g| *g == generation)
    }

    /// Release `session_id` if `generation` still owns it.
    pub fn finish(&self, session_id: &str, generation: u64) {
        let mut state = self.state();
        if state.current.get(session_id) == Some(&generation) {
            state.current.remove(session_id);
        }
    }

    /// Number of sessions with a live loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().current.len()
    }

    /// True when no loop is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
