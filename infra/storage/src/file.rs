//! Persistent directory-backed backend with one file per key.
//!
//! Layout: `<root>/<shard>/k<hex(key)>`, where `<shard>` is the first two hex
//! characters of the encoded key. Values are stored as UTF-8 text.

use crate::backend::Backend;
use crate::builder::FileBackendBuilder;
use crate::error::{BackendError, BackendErrorExt};
use crate::key;
use crate::maintenance::TMP_MARKER;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A persistent [`Backend`] that keeps each key in its own file.
///
/// Writes are atomic per key: the value is written to a unique temp file, synced to
/// disk, then renamed over the slot. A crash mid-write leaves either the old value or
/// the new one, never a torn slot.
///
/// # Example
///
/// ```rust
/// use satchel_storage::{Backend, BackendError, FileBackend};
///
/// fn main() -> Result<(), BackendError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let backend = FileBackend::builder().root(tmp.path()).open()?;
///     backend.set("theme", "\"dark\"")?;
///     assert_eq!(backend.get("theme")?.as_deref(), Some("\"dark\""));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
    tmp_salt: String,
    tmp_counter: AtomicU64,
}

impl FileBackend {
    #[must_use = "The backend is not opened until you call .open()"]
    pub fn builder() -> FileBackendBuilder {
        FileBackendBuilder::new()
    }

    pub(crate) const fn from_parts(root: PathBuf, tmp_salt: String) -> Self {
        Self { root, tmp_salt, tmp_counter: AtomicU64::new(1) }
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical path of the slot holding `key`.
    ///
    /// # Errors
    /// Returns [`BackendError::InvalidKey`] if the key is too long for a file name.
    pub fn slot(&self, key: &str) -> Result<PathBuf, BackendError> {
        Ok(self.root.join(key::slot_path(key)?))
    }

    fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("slot");
        // The salt keeps names distinct across handles sharing a root.
        target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", self.tmp_salt))
    }

    fn slot_files(&self) -> impl Iterator<Item = (PathBuf, String)> + '_ {
        WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .flatten()
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.into_path();
                key::key_from_slot(&path).map(|key| (path, key))
            })
    }

    fn sync_dir(path: &Path) {
        match fs::File::open(path) {
            Ok(dir) => {
                if let Err(err) = dir.sync_all() {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

fn write_swap(temp: &Path, slot: &Path, data: &[u8]) -> Result<(), BackendError> {
    let mut file = fs::OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(temp)
        .context(format!("Temp creation failed: {}", temp.display()))?;

    // From here on the temp file is ours to clean up.
    let written = file
        .write_all(data)
        .context("Write failed")
        .and_then(|()| file.sync_all().context("Hardware sync failed"));
    drop(file);

    let swapped = written.and_then(|()| {
        fs::rename(temp, slot)
            .context(format!("Atomic swap failed: {} -> {}", temp.display(), slot.display()))
    });
    if swapped.is_err() {
        let _ = fs::remove_file(temp);
    }
    swapped
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let slot = self.slot(key)?;

        let bytes = match fs::read(&slot) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(BackendError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", slot.display()).into()),
                });
            },
        };

        String::from_utf8(bytes).map(Some).map_err(|e| BackendError::Corrupted {
            message: e.to_string().into(),
            context: Some(slot.display().to_string().into()),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let slot = self.slot(key)?;

        if let Some(parent) = slot.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create shard for {}", slot.display()))?;
        }

        let temp = self.unique_tmp_path(&slot);
        write_swap(&temp, &slot, value.as_bytes())?;

        if let Some(parent) = slot.parent() {
            Self::sync_dir(parent);
        }

        debug!(path = %slot.display(), "Slot saved atomically");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        let slot = self.slot(key)?;
        match fs::remove_file(&slot) {
            Ok(()) => {
                debug!(path = %slot.display(), "Slot deleted");
                Ok(())
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(BackendError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", slot.display()).into()),
            }),
        }
    }

    fn clear(&self) -> Result<(), BackendError> {
        let slots: Vec<PathBuf> = self.slot_files().map(|(path, _)| path).collect();
        for path in &slots {
            match fs::remove_file(path) {
                Ok(()) => {},
                Err(err) if err.kind() == ErrorKind::NotFound => {},
                Err(err) => {
                    return Err(BackendError::Io {
                        source: err,
                        context: Some(format!("Failed to clear: {}", path.display()).into()),
                    });
                },
            }
        }
        debug!(removed = slots.len(), root = %self.root.display(), "Backend cleared");
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        if !self.root.is_dir() {
            return Err(BackendError::Unavailable {
                message: self.root.display().to_string().into(),
                context: Some("Backend root is missing".into()),
            });
        }
        let mut keys: Vec<String> = self.slot_files().map(|(_, key)| key).collect();
        keys.sort_unstable();
        Ok(keys)
    }
}
