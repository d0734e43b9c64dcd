pub mod config;
pub mod errors;
pub mod metrics;
pub mod storage;
pub mod types;

pub use errors::InfraError;
pub use storage::{FileStore, KeyValueStore, MemoryStore, AUTH_TOKEN_KEY};
