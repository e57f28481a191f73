use std::collections::HashMap;

use super::{KvBackend, Tier};
use crate::error::StoreError;

/// In-process map. Backs the memory tier and stands in for other media in tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvBackend for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A medium that rejects every call, as storage does in privacy mode.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableKv {
    tier: Tier,
}

impl UnavailableKv {
    pub fn new(tier: Tier) -> Self {
        Self { tier }
    }

    fn error(&self) -> StoreError {
        StoreError::unavailable(self.tier, "storage is disabled")
    }
}

impl KvBackend for UnavailableKv {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(self.error())
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(self.error())
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(self.error())
    }
}
