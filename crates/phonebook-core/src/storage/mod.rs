//! Storage layer
//!
//! Persists the table snapshot through a backend that can only read the
//! whole state and overwrite the whole state.
//!
//! ## Backends
//!
//! - **JsonFileBackend**: one JSON object in a file, rewritten in place
//! - **MemoryBackend**: JSON text held in memory, for tests

pub mod backend;
pub mod error;

pub use backend::{AccessMode, JsonFileBackend, MemoryBackend, StorageBackend};
pub use error::{StorageError, StorageResult};
