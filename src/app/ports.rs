use crate::error::Result;
use crate::types::{NaturalKey, RawRecord, RunSummary, StoredContact};
use async_trait::async_trait;
use std::sync::Arc;

/// Yields the raw contact batch for one run
#[async_trait]
pub trait ContactSource: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
}

/// Persistent contact storage keyed by (company, email)
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn contains(&self, key: &NaturalKey) -> Result<bool>;

    /// Writes `contact` unless its natural key is already stored, as one atomic step.
    /// Returns `true` when a new row was written.
    async fn insert_if_absent(&self, contact: &StoredContact) -> Result<bool>;
}

/// Opens the store connection for a run. The handle is released when dropped.
#[async_trait]
pub trait ContactStoreOpener: Send + Sync {
    async fn open(&self) -> Result<Box<dyn ContactStore>>;
}

/// Accepts the summary of a finished run
#[async_trait]
pub trait RunTracker: Send + Sync {
    async fn register(&self, summary: &RunSummary) -> Result<()>;
}

#[async_trait]
impl<T: ContactStore + ?Sized> ContactStore for Arc<T> {
    async fn contains(&self, key: &NaturalKey) -> Result<bool> {
        (**self).contains(key).await
    }

    async fn insert_if_absent(&self, contact: &StoredContact) -> Result<bool> {
        (**self).insert_if_absent(contact).await
    }
}
