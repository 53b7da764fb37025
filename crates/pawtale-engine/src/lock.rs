use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use pawtale_core::SessionId;

/// One async mutex per session so load, mutate and save run one at a time
/// for the same id. Entries live only while someone holds or waits on them.
#[derive(Default)]
pub struct SessionLocks {
    locks: DashMap<SessionId, Arc<Mutex<()>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: &SessionId) -> SessionGuard<'_> {
        let lock = self
            .locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        SessionGuard {
            guard: Some(lock.lock_owned().await),
            locks: &self.locks,
            id: id.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Held for the duration of one session operation.
pub struct SessionGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    locks: &'a DashMap<SessionId, Arc<Mutex<()>>>,
    id: SessionId,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold their own clone, so a count of one means nobody else
        // is queued for this session.
        self.locks
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
