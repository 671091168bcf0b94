//! Per-resource mutual exclusion
//!
//! Warehouse capacity admission and crate allocation on the same
//! warehouse must be serialized; two concurrent orders may never both
//! read "sufficient stock" and both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

/// Registry of named async locks, one per warehouse
#[derive(Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for the given warehouse, created on first use
    pub async fn for_warehouse(&self, warehouse_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(warehouse_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
