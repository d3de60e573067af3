use crate::app::ports::{ContactStore, ContactStoreOpener};
use crate::error::{EtlError, Result};
use crate::types::{NaturalKey, StoredContact};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// In-memory contact store for development/testing
#[derive(Default)]
pub struct InMemoryContactStore {
    contacts: Mutex<HashMap<NaturalKey, StoredContact>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<NaturalKey, StoredContact>>> {
        self.contacts
            .lock()
            .map_err(|_| EtlError::StoreUnavailable("in-memory store lock poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &NaturalKey) -> Option<StoredContact> {
        self.lock().ok().and_then(|c| c.get(key).cloned())
    }

    /// Stored keys in sorted order
    pub fn keys(&self) -> Vec<NaturalKey> {
        let mut keys: Vec<NaturalKey> = self
            .lock()
            .map(|c| c.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn contains(&self, key: &NaturalKey) -> Result<bool> {
        Ok(self.lock()?.contains_key(key))
    }

    async fn insert_if_absent(&self, contact: &StoredContact) -> Result<bool> {
        let mut contacts = self.lock()?;
        let key = contact.natural_key();
        if contacts.contains_key(&key) {
            return Ok(false);
        }
        debug!("Stored contact {} for run {}", key, contact.run_id);
        contacts.insert(key, contact.clone());
        Ok(true)
    }
}

/// Hands out the same shared in-memory store on every open
#[derive(Clone, Default)]
pub struct InMemoryStoreOpener {
    store: Arc<InMemoryContactStore>,
}

impl InMemoryStoreOpener {
    pub fn new(store: Arc<InMemoryContactStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<InMemoryContactStore> {
        self.store.clone()
    }
}

#[async_trait]
impl ContactStoreOpener for InMemoryStoreOpener {
    async fn open(&self) -> Result<Box<dyn ContactStore>> {
        Ok(Box::new(self.store.clone()))
    }
}
