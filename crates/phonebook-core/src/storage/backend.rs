//! Whole-state storage backends
//!
//! A backend only knows how to read the complete table snapshot and how to
//! replace it completely. There is no partial update and no range read;
//! the transaction layer builds read-modify-write on top of these two calls.
//!
//! Backends assume a single writer. Nothing here coordinates two processes
//! sharing one file, and concurrent read-modify-write cycles from separate
//! processes can lose updates.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use super::error::{StorageError, StorageResult};
use crate::snapshot::Snapshot;

/// How a backend was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// `"r"`: reads only, writes fail
    ReadOnly,
    /// `"r+"`: reads and writes, creates the file if missing
    #[default]
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "r",
            AccessMode::ReadWrite => "r+",
        }
    }

    pub fn can_write(self) -> bool {
        matches!(self, AccessMode::ReadWrite)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(AccessMode::ReadOnly),
            "r+" => Ok(AccessMode::ReadWrite),
            other => Err(format!(
                "unsupported access mode '{}': use \"r\" or \"r+\"",
                other
            )),
        }
    }
}

/// Storage that persists a table snapshot as a whole
pub trait StorageBackend {
    /// Read the complete snapshot
    ///
    /// Returns `None` exactly when the underlying medium is empty.
    fn read(&mut self) -> StorageResult<Option<Snapshot>>;

    /// Replace the complete snapshot
    ///
    /// After a successful call no trace of the previous content remains,
    /// even if it was longer than the new one.
    fn write(&mut self, snapshot: &Snapshot) -> StorageResult<()>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}

/// Snapshot stored as one JSON object in a file
///
/// The file handle stays open for the lifetime of the backend.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    mode: AccessMode,
    file: File,
}

impl JsonFileBackend {
    /// Open the table file
    ///
    /// In read-write mode the file (and its parent directory) is created if
    /// it does not exist yet. In read-only mode a missing file is an error.
    pub fn open(path: impl Into<PathBuf>, mode: AccessMode) -> StorageResult<Self> {
        let path = path.into();

        if mode.can_write() {
            touch(&path)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(mode.can_write())
            .open(&path)
            .map_err(|e| StorageError::from_io_on_read(e, path.clone()))?;

        debug!("Opened table file {:?} in mode \"{}\"", path, mode);
        Ok(Self { path, mode, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Size of the table file in bytes
    pub fn size(&self) -> StorageResult<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| self.read_error(e))
    }

    fn read_error(&self, source: io::Error) -> StorageError {
        StorageError::ReadError {
            path: self.path.clone(),
            source,
        }
    }
}

impl StorageBackend for JsonFileBackend {
    fn read(&mut self) -> StorageResult<Option<Snapshot>> {
        if self.size()? == 0 {
            return Ok(None);
        }

        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| self.read_error(e))?;

        let snapshot = serde_json::from_reader(BufReader::new(&self.file)).map_err(|e| {
            if e.is_io() {
                self.read_error(e.into())
            } else {
                StorageError::InvalidFormat {
                    path: self.path.clone(),
                    details: e.to_string(),
                }
            }
        })?;

        Ok(Some(snapshot))
    }

    fn write(&mut self, snapshot: &Snapshot) -> StorageResult<()> {
        if !self.mode.can_write() {
            return Err(StorageError::ReadOnly { mode: self.mode });
        }

        let data = serde_json::to_vec(snapshot).map_err(io::Error::from)?;
        let path = self.path.clone();
        let fail = |e: io::Error| StorageError::from_io(e, path.clone());

        self.file.seek(SeekFrom::Start(0)).map_err(fail)?;
        self.file.write_all(&data).map_err(fail)?;
        self.file.flush().map_err(fail)?;

        // Drop whatever is left of a previous, longer snapshot
        self.file.set_len(data.len() as u64).map_err(fail)?;
        self.file.sync_all().map_err(fail)?;

        debug!("Wrote {} bytes to {:?}", data.len(), self.path);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} ({})", self.path.display(), self.mode)
    }
}

/// Create the file if it doesn't exist yet, leaving existing content alone
fn touch(path: &Path) -> StorageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| StorageError::from_io_on_read(e, parent.to_path_buf()))?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StorageError::from_io_on_read(e, path.to_path_buf()))?;
    Ok(())
}

/// Snapshot kept as JSON text in memory
///
/// Goes through the same serialization as [`JsonFileBackend`], so it is
/// interchangeable with it in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: String,
    mode: AccessMode,
}

impl MemoryBackend {
    /// Empty read-write backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend preloaded with raw JSON text
    pub fn from_json(contents: impl Into<String>, mode: AccessMode) -> Self {
        Self {
            contents: contents.into(),
            mode,
        }
    }

    /// Raw persisted text
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&mut self) -> StorageResult<Option<Snapshot>> {
        if self.contents.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&self.contents)
            .map(Some)
            .map_err(|e| StorageError::InvalidFormat {
                path: PathBuf::from("<memory>"),
                details: e.to_string(),
            })
    }

    fn write(&mut self, snapshot: &Snapshot) -> StorageResult<()> {
        if !self.mode.can_write() {
            return Err(StorageError::ReadOnly { mode: self.mode });
        }

        self.contents = serde_json::to_string(snapshot).map_err(io::Error::from)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("<memory> ({})", self.mode)
    }
}
