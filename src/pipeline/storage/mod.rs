// Pipeline storage: contact stores and the deduplicating persister

pub mod in_memory;
pub mod persister;
pub mod sqlite;

pub use in_memory::{InMemoryContactStore, InMemoryStoreOpener};
pub use persister::ContactPersister;
pub use sqlite::{SqliteContactStore, SqliteStoreOpener};
