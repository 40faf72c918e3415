//! # Process-Wide Instance
//!
//! Hosts that want one shared store install a [`Satchel`] once at startup and use the
//! free functions below. Until [`install`] succeeds every operation reports the store
//! as unavailable (`false`/`None`).
//!
//! ```rust
//! use satchel::{MemoryBackend, Satchel, global};
//!
//! assert!(!global::set("greeting", "hi", None));
//!
//! global::install(Satchel::builder().backend(MemoryBackend::new()).build()).unwrap();
//! assert!(global::set("greeting", "hi", None));
//! assert_eq!(global::get::<String>("greeting", None).as_deref(), Some("hi"));
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use tracing::info;

use crate::engine::Satchel;
use crate::error::SatchelError;
use crate::resolver::{Config, Options};

static INSTANCE: OnceLock<Satchel> = OnceLock::new();

/// Installs the process-wide handle. It cannot be replaced afterwards.
///
/// # Errors
/// Returns [`SatchelError::Internal`] if an instance is already installed.
pub fn install(satchel: Satchel) -> Result<(), SatchelError> {
    INSTANCE.set(satchel).map_err(|_| SatchelError::Internal {
        message: "a process-wide instance is already installed".into(),
        context: None,
    })?;
    info!("Process-wide satchel installed");
    Ok(())
}

/// The installed handle, if any.
#[must_use]
pub fn instance() -> Option<&'static Satchel> {
    INSTANCE.get()
}

#[must_use]
pub fn is_available() -> bool {
    instance().is_some_and(Satchel::is_available)
}

pub fn set<T>(key: &str, value: &T, overrides: Option<&Options>) -> bool
where
    T: Serialize + ?Sized,
{
    instance().is_some_and(|s| s.set(key, value, overrides))
}

#[must_use]
pub fn get<T>(key: &str, overrides: Option<&Options>) -> Option<T>
where
    T: DeserializeOwned,
{
    instance().and_then(|s| s.get(key, overrides))
}

pub fn remove(key: &str, overrides: Option<&Options>) -> bool {
    instance().is_some_and(|s| s.remove(key, overrides))
}

pub fn clear(overrides: Option<&Options>) -> bool {
    instance().is_some_and(|s| s.clear(overrides))
}

pub fn flush(force: bool, overrides: Option<&Options>) -> bool {
    instance().is_some_and(|s| s.flush(force, overrides))
}

#[must_use]
pub fn keys(overrides: Option<&Options>) -> Option<Vec<String>> {
    instance().and_then(|s| s.keys(overrides))
}

/// Snapshot of the installed handle's defaults.
#[must_use]
pub fn defaults() -> Option<Config> {
    instance().map(Satchel::defaults)
}

/// Mutates the installed handle's defaults; `false` when nothing is installed.
pub fn configure(update: impl FnOnce(&mut Config)) -> bool {
    let Some(satchel) = instance() else {
        return false;
    };
    satchel.configure(update);
    true
}
