//! Read-modify-write transactions
//!
//! The backend can only replace the whole snapshot, so every mutation is one
//! full read, an in-memory change, and one full write. The mutator sees the
//! complete state and changes it in place; if it fails, nothing is written
//! and the stored state stays as it was.

use tracing::debug;

use crate::error::TableResult;
use crate::snapshot::Snapshot;
use crate::storage::StorageBackend;

/// Read the current snapshot, or an empty one if the backend holds nothing
pub fn read_snapshot<B: StorageBackend + ?Sized>(backend: &mut B) -> TableResult<Snapshot> {
    let snapshot = match backend.read()? {
        Some(snapshot) => snapshot,
        None => {
            debug!("{} is empty, starting from a fresh table", backend.describe());
            Snapshot::empty()
        }
    };

    debug!(
        "Read {} document(s) from {}",
        snapshot.documents.len(),
        backend.describe()
    );
    Ok(snapshot)
}

/// Apply `mutator` to the stored snapshot and write the result back
///
/// This is the only write path of a table.
pub fn run_transaction<B, F, R>(backend: &mut B, mutator: F) -> TableResult<R>
where
    B: StorageBackend + ?Sized,
    F: FnOnce(&mut Snapshot) -> TableResult<R>,
{
    let mut snapshot = read_snapshot(backend)?;
    let result = mutator(&mut snapshot)?;
    backend.write(&snapshot)?;

    debug!(
        "Committed {} document(s) to {}",
        snapshot.documents.len(),
        backend.describe()
    );
    Ok(result)
}
