use crate::store::Store;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Router state. The lock is held across each mutation and the write that
/// persists it.
#[derive(Clone)]
pub struct SharedState {
    pub store: Arc<Mutex<Store>>,
}

impl SharedState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` against the locked store. Store operations persist with
    /// blocking writes, so the worker thread is handed off to the blocking
    /// pool for the duration. Needs the multi-threaded runtime.
    pub async fn with_store<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        let mut store = self.store.lock().await;
        tokio::task::block_in_place(|| f(&mut *store))
    }
}
