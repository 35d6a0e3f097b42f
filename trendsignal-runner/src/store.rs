//! Durable storage for the signal book.
//!
//! [`JsonFileStore`] writes the whole book on every save. Writes are atomic:
//! the JSON goes to `<file>.tmp` first and is renamed into place, so a reader
//! sees either the previous complete file or the new one.
//!
//! Loading is tolerant per row: an entry or security that no longer parses is
//! dropped with a warning and the file is copied to `<file>.corrupt` before
//! the next save can replace it. A file that is not a JSON object at all
//! (including an empty file) is reported as [`StoreError::Corrupt`] and backed
//! up the same way.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use trendsignal_core::{InstrumentClass, SecurityId};

use crate::signal_log::{SignalBook, SignalLog, SignalLogEntry};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("corrupt signal log {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize signal log: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Load/save seam for the confirmation tracker.
pub trait SignalStore {
    /// Read the full book. A store with nothing saved yet yields an empty book.
    fn load(&self) -> Result<SignalBook, StoreError>;

    /// Replace the durable copy with `book`.
    fn save(&mut self, book: &SignalBook) -> Result<(), StoreError>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(suffix);
        PathBuf::from(name)
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Where an unreadable history is copied before it can be overwritten.
    pub fn backup_path(&self) -> PathBuf {
        self.sibling(".corrupt")
    }

    fn back_up(&self) {
        let backup = self.backup_path();
        match fs::copy(&self.path, &backup) {
            Ok(_) => tracing::warn!(backup = %backup.display(), "unreadable signal history backed up"),
            Err(e) => tracing::warn!(backup = %backup.display(), error = %e, "could not back up signal history"),
        }
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SignalStore for JsonFileStore {
    fn load(&self) -> Result<SignalBook, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SignalBook::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        let raw: BTreeMap<SecurityId, serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(source) => {
                self.back_up();
                return Err(StoreError::Corrupt {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let (book, dropped) = decode_book(raw);
        if dropped > 0 {
            tracing::warn!(path = %self.path.display(), dropped, "skipped unreadable signal log rows");
            self.back_up();
        }
        Ok(book)
    }

    fn save(&mut self, book: &SignalBook) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(book)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let tmp_path = self.tmp_path();
        write_synced(&tmp_path, json.as_bytes()).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.io_err(e)
        })?;

        // Atomic rename
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.io_err(e)
        })
    }
}

/// Write `bytes` and flush them to disk before returning.
fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// One security as found on disk, before row validation.
#[derive(Deserialize)]
struct RawLog {
    #[serde(default)]
    signals: Vec<serde_json::Value>,
    #[serde(default)]
    instrument_type: Option<String>,
}

/// Decode every security independently. Returns the book and the number of
/// rows (entries or whole securities) that had to be dropped.
fn decode_book(raw: BTreeMap<SecurityId, serde_json::Value>) -> (SignalBook, usize) {
    let mut dropped = 0;
    let mut book = SignalBook::new();
    for (id, value) in raw {
        let raw_log: RawLog = match serde_json::from_value(value) {
            Ok(raw_log) => raw_log,
            Err(e) => {
                tracing::warn!(security_id = %id, error = %e, "dropping unreadable signal log");
                dropped += 1;
                continue;
            }
        };

        let instrument_type = match raw_log.instrument_type.as_deref() {
            None => InstrumentClass::default(),
            Some(name) => name.parse().unwrap_or_else(|e| {
                tracing::warn!(security_id = %id, error = %e, "unknown instrument type, using warrant");
                InstrumentClass::default()
            }),
        };

        let mut signals: Vec<SignalLogEntry> = Vec::with_capacity(raw_log.signals.len());
        for value in raw_log.signals {
            match serde_json::from_value(value) {
                Ok(entry) => signals.push(entry),
                Err(e) => {
                    tracing::warn!(security_id = %id, error = %e, "dropping unreadable signal entry");
                    dropped += 1;
                }
            }
        }
        // Oldest first, one entry per trading day.
        signals.sort_by_key(|e| e.date);
        signals.dedup_by_key(|e| e.date);

        book.insert(
            id,
            SignalLog {
                signals,
                instrument_type,
            },
        );
    }
    (book, dropped)
}

/// In-process store for dry runs and tests.
///
/// Counts saves; `failing()` builds a store whose saves always fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    book: SignalBook,
    saves: usize,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_book(book: SignalBook) -> Self {
        Self {
            book,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn book(&self) -> &SignalBook {
        &self.book
    }
}

impl SignalStore for MemoryStore {
    fn load(&self) -> Result<SignalBook, StoreError> {
        Ok(self.book.clone())
    }

    fn save(&mut self, book: &SignalBook) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("memory store configured to fail".into()));
        }
        self.book = book.clone();
        self.saves += 1;
        Ok(())
    }
}
