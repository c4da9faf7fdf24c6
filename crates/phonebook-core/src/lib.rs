//! Phone book core library
//!
//! A small document store: flat records of string fields keyed by an
//! auto-incrementing integer id, with an inverted index over `first_name`
//! and `last_name` for equality search.
//!
//! # Architecture
//!
//! - **Storage backend**: reads and overwrites the whole table at once
//! - **Transactions**: read the whole snapshot, mutate it in memory, write it back
//! - **Index**: kept in lock-step with every insert and update
//!
//! # Quick Start
//!
//! ```text
//! let mut table = Table::open("phone_book", "phonebook.json", AccessMode::ReadWrite)?;
//!
//! // Add a record
//! table.insert(Document::new().with("first_name", "Ann").with("last_name", "Lee"))?;
//!
//! // Find it again
//! let query = Query::new().with(IndexedField::LastName, "Lee");
//! let found = table.search(&query)?;
//! ```
//!
//! # Modules
//!
//! - `table`: table operations (main entry point)
//! - `models`: documents and document ids
//! - `index`: the inverted index
//! - `snapshot`: persisted table state and its JSON layout
//! - `storage`: whole-state backends
//! - `transaction`: read-modify-write helper
//! - `config`: application configuration

pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod snapshot;
pub mod storage;
pub mod table;
pub mod transaction;

pub use config::Config;
pub use error::{TableError, TableResult};
pub use index::{Index, IndexedField};
pub use models::{fields, DocId, Document};
pub use snapshot::Snapshot;
pub use storage::{AccessMode, JsonFileBackend, MemoryBackend, StorageBackend, StorageError};
pub use table::{Lookup, Pages, Query, Table, TableStats, UpdateOutcome};
