mod error;
mod file;
mod memory;

use async_trait::async_trait;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

// Durable key-value store holding serialized documents
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn write(&self, key: &str, data: String) -> Result<(), StorageError>;
}
