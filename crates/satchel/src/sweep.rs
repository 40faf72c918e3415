//! Key-space maintenance: expiry sweeps and prefix-scoped clears.

use satchel_storage::{Backend, BackendErrorExt};
use tracing::{debug, info, warn};

use crate::codec::Entry;
use crate::error::SatchelError;
use crate::resolver::Config;

/// Removes ttl-wrapped entries that have expired, or all of them when `force` is set.
///
/// Only keys under the effective prefix are visited; without a prefix every key is.
/// Plain entries and unreadable entries are left alone. Returns the number removed.
pub(crate) fn flush(
    backend: &dyn Backend,
    force: bool,
    config: &Config,
    now_ms: u64,
) -> Result<usize, SatchelError> {
    let prefix = config.active_prefix();
    let mut removed = 0;

    for key in backend.keys().context("Sweep could not list keys")? {
        if prefix.is_some_and(|p| !key.starts_with(p)) {
            continue;
        }

        let raw = match backend.get(&key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => continue,
            Err(err) => {
                warn!(key = %key, error = %err, "Sweep skipped unreadable entry");
                continue;
            },
        };

        let Ok(entry) = Entry::parse(&raw) else {
            continue;
        };

        if entry.is_wrapped() && (force || entry.is_expired(now_ms)) {
            backend.remove(&key).context(format!("Sweep failed to remove {key}"))?;
            debug!(key = %key, force, "Entry swept");
            removed += 1;
        }
    }

    if removed > 0 {
        info!(removed, force, prefix = prefix.unwrap_or_default(), "Sweep finished");
    }
    Ok(removed)
}

/// Deletes every key under the effective prefix, or the whole store without one.
pub(crate) fn clear(backend: &dyn Backend, config: &Config) -> Result<(), SatchelError> {
    let Some(prefix) = config.active_prefix() else {
        backend.clear().context("Clear failed")?;
        info!("Store cleared");
        return Ok(());
    };

    let mut removed = 0_usize;
    for key in backend.keys().context("Clear could not list keys")? {
        if key.starts_with(prefix) {
            backend.remove(&key).context(format!("Clear failed to remove {key}"))?;
            removed += 1;
        }
    }

    info!(removed, prefix, "Prefix cleared");
    Ok(())
}
