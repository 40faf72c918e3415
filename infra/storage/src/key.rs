use crate::error::BackendError;
use std::path::{Path, PathBuf};

/// Longest key accepted by the file backend, keeping file names under 255 bytes.
pub(crate) const MAX_KEY_BYTES: usize = 126;

const SLOT_MARKER: char = 'k';
const SHORT_SHARD: &str = "__";

/// Maps a logical key to its relative slot path: `<shard>/k<hex(key)>`.
///
/// Hex encoding makes every string key a legal file name, so no key can
/// name a path outside the root.
pub(crate) fn slot_path(key: &str) -> Result<PathBuf, BackendError> {
    if key.len() > MAX_KEY_BYTES {
        return Err(BackendError::InvalidKey {
            message: format!("{} bytes exceeds limit of {MAX_KEY_BYTES}", key.len()).into(),
            context: None,
        });
    }

    let encoded = hex::encode(key.as_bytes());
    let shard = encoded.get(..2).unwrap_or(SHORT_SHARD);

    let mut path = PathBuf::from(shard);
    path.push(format!("{SLOT_MARKER}{encoded}"));
    Ok(path)
}

/// Recovers the logical key from a slot file name; `None` for foreign files.
pub(crate) fn key_from_slot(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let encoded = name.strip_prefix(SLOT_MARKER)?;
    let bytes = hex::decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
