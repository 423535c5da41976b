//! Key-value storage backends for hourly records.
//!
//! [`KeyValueStore`] is the only thing the record layer knows about the
//! storage medium. [`FileStore`] keeps one `{key}.json` file per key in a
//! flat directory; [`MemoryStore`] keeps everything in a map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::debug;
use tracker_core::error::{Result, TrackerError};

/// Extension of every file written by [`FileStore`].
pub const RECORD_EXTENSION: &str = "json";

// ── KeyValueStore ─────────────────────────────────────────────────────────────

/// Byte-oriented storage keyed by string.
pub trait KeyValueStore {
    /// Write `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Read the value under `key`; `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Every stored key starting with `prefix`, sorted. An empty prefix lists
    /// everything.
    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

// ── FileStore ─────────────────────────────────────────────────────────────────

/// One pretty-printed JSON file per key in a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open the store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|source| TrackerError::FileWrite {
            path: root.clone(),
            source,
        })?;
        debug!(root = %root.display(), "file store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    ///
    /// Keys must be plain file stems: no separators, no parent references.
    fn key_path(&self, key: &str) -> Result<PathBuf> {
        let invalid = key.is_empty()
            || key.contains(['/', '\\'])
            || key == "."
            || key == ".."
            || key.starts_with('.');
        if invalid {
            return Err(TrackerError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.{RECORD_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp = path.with_extension(format!("{RECORD_EXTENSION}.tmp"));

        std::fs::write(&tmp, value).map_err(|source| TrackerError::FileWrite {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &path).map_err(|source| TrackerError::FileWrite {
            path: path.clone(),
            source,
        })?;

        debug!(key, bytes = value.len(), "stored");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        std::fs::read(&path)
            .map(Some)
            .map_err(|source| TrackerError::FileRead { path, source })
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(TrackerError::FileRead {
                path: self.root.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "data directory does not exist",
                ),
            });
        }

        let mut keys: Vec<String> = walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext == RECORD_EXTENSION)
                        .unwrap_or(false)
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_owned)
            })
            .filter(|key| key.starts_with(prefix))
            .collect();

        keys.sort();
        Ok(keys)
    }
}

// ── MemoryStore ───────────────────────────────────────────────────────────────

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        // BTreeMap keys are already sorted.
        Ok(self
            .data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
