//! Cache storage capability
//!
//! The manager only needs a key/value `get` and an asynchronous `update`.
//! Hosts plug in whatever persistence they have; `MemoryStorage` keeps
//! everything in process.

use crate::error::MtResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Look up a cached value
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`
    ///
    /// The manager dispatches this without awaiting it, so durability is
    /// best-effort.
    async fn update(&self, key: &str, value: String) -> MtResult<()>;
}

/// In-memory storage backed by a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert without going through the async path (useful for seeding)
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), value.into());
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    async fn update(&self, key: &str, value: String) -> MtResult<()> {
        self.insert(key, value);
        Ok(())
    }
}
