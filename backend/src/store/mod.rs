//! Key/value persistence abstraction
//!
//! The core is agnostic to the storage medium: everything it needs is
//! get/put/delete and an ordered prefix scan. Services receive the store
//! injected and serialize domain records as JSON under namespaced keys.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

mod memory;

pub use memory::MemoryStore;

/// Key/value persistence collaborator
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<u8>>>;

    async fn put(&self, key: &str, value: Vec<u8>) -> AppResult<()>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// All entries whose key starts with `prefix`, in key order
    async fn scan_prefix(&self, prefix: &str) -> AppResult<Vec<(String, Vec<u8>)>>;
}

/// Read a JSON-encoded record
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> AppResult<Option<T>> {
    match store.get(key).await? {
        Some(bytes) => {
            let value = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::StorageError(format!("decode {}: {}", key, e)))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Write a JSON-encoded record
pub async fn put_json<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> AppResult<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| AppError::Internal(format!("encode {}: {}", key, e)))?;
    store.put(key, bytes).await
}

/// Scan and decode all JSON records under a prefix, in key order
pub async fn scan_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    prefix: &str,
) -> AppResult<Vec<T>> {
    let mut out = Vec::new();
    for (key, bytes) in store.scan_prefix(prefix).await? {
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::StorageError(format!("decode {}: {}", key, e)))?;
        out.push(value);
    }
    Ok(out)
}

/// Key layout for the domain tables
pub mod keys {
    use super::Uuid;

    pub fn warehouse(id: Uuid) -> String {
        format!("warehouse/{}", id)
    }

    pub const WAREHOUSE_PREFIX: &str = "warehouse/";

    pub fn batch(id: Uuid) -> String {
        format!("batch/{}", id)
    }

    pub const BATCH_PREFIX: &str = "batch/";

    pub fn storage(batch_id: Uuid) -> String {
        format!("storage/{}", batch_id)
    }

    /// Zero-padded sequence keeps the prefix scan in carving order
    pub fn crate_unit(batch_id: Uuid, sequence: u32) -> String {
        format!("crate/{}/{:06}", batch_id, sequence)
    }

    pub fn crate_prefix(batch_id: Uuid) -> String {
        format!("crate/{}/", batch_id)
    }

    pub fn order(id: Uuid) -> String {
        format!("order/{}", id)
    }

    pub const ORDER_PREFIX: &str = "order/";

    pub fn retail_inventory(retailer_id: Uuid, batch_id: Uuid) -> String {
        format!("retail-inventory/{}/{}", retailer_id, batch_id)
    }

    pub fn retail_inventory_prefix(retailer_id: Uuid) -> String {
        format!("retail-inventory/{}/", retailer_id)
    }

    pub const PRICE_CACHE: &str = "price-cache/table";
}
