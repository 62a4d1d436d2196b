mod error;
mod local;
mod remote;
mod service;
mod storage;

pub use error::DataStoreError;
pub use local::LocalDataService;
pub use remote::RemoteDataService;
pub use service::{ServiceMode, TaskDataService};
pub use storage::{FileStore, MemoryStore};
