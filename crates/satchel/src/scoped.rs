use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::sync::Arc;

use crate::engine::{Satchel, report};
use crate::error::SatchelError;
use crate::resolver::{Config, Options};
use crate::sweep;

/// A lightweight view of a [`Satchel`] confined to one key prefix.
///
/// The scope's prefix replaces whatever prefix the defaults or a per-call override
/// carry; every other setting resolves as usual. Cloning is cheap.
///
/// ```rust
/// use satchel::{MemoryBackend, Satchel};
///
/// let satchel = Satchel::builder().backend(MemoryBackend::new()).build();
/// let alice = satchel.scoped("user:alice:");
/// let bob = satchel.scoped("user:bob:");
///
/// assert!(alice.set("theme", "dark", None));
/// assert!(bob.set("theme", "light", None));
/// assert!(alice.clear(None));
///
/// assert_eq!(alice.get::<String>("theme", None), None);
/// assert_eq!(bob.get::<String>("theme", None).as_deref(), Some("light"));
/// ```
#[derive(Debug, Clone)]
pub struct ScopedSatchel {
    satchel: Satchel,
    prefix: Arc<Cow<'static, str>>,
}

impl ScopedSatchel {
    pub(crate) fn new(satchel: Satchel, prefix: impl Into<Cow<'static, str>>) -> Self {
        Self { satchel, prefix: Arc::new(prefix.into()) }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The parent handle.
    #[must_use]
    pub const fn satchel(&self) -> &Satchel {
        &self.satchel
    }

    fn effective(&self, overrides: Option<&Options>) -> Config {
        let mut config = self.satchel.effective(overrides);
        config.prefix = Some(self.prefix.to_string());
        config
    }

    fn guarded(&self) -> Result<(), SatchelError> {
        if self.satchel.is_available() { Ok(()) } else { Err(SatchelError::unavailable()) }
    }

    /// # Errors
    /// See [`Satchel::try_set`].
    pub fn try_set<T>(&self, key: &str, value: &T, overrides: Option<&Options>) -> Result<(), SatchelError>
    where
        T: Serialize + ?Sized,
    {
        self.guarded()?;
        self.satchel.set_internal(key, value, &self.effective(overrides))
    }

    pub fn set<T>(&self, key: &str, value: &T, overrides: Option<&Options>) -> bool
    where
        T: Serialize + ?Sized,
    {
        report(self.try_set(key, value, overrides), "set", key).is_some()
    }

    /// # Errors
    /// See [`Satchel::try_get`].
    pub fn try_get<T>(&self, key: &str, overrides: Option<&Options>) -> Result<Option<T>, SatchelError>
    where
        T: DeserializeOwned,
    {
        self.guarded()?;
        self.satchel.get_internal(key, &self.effective(overrides))
    }

    #[must_use]
    pub fn get<T>(&self, key: &str, overrides: Option<&Options>) -> Option<T>
    where
        T: DeserializeOwned,
    {
        report(self.try_get(key, overrides), "get", key).flatten()
    }

    /// # Errors
    /// See [`Satchel::try_remove`].
    pub fn try_remove(&self, key: &str, overrides: Option<&Options>) -> Result<(), SatchelError> {
        self.guarded()?;
        self.satchel.remove_internal(key, &self.effective(overrides))
    }

    pub fn remove(&self, key: &str, overrides: Option<&Options>) -> bool {
        report(self.try_remove(key, overrides), "remove", key).is_some()
    }

    /// Deletes every key in the scope. An empty scope prefix clears the whole store.
    ///
    /// # Errors
    /// See [`Satchel::try_clear`].
    pub fn try_clear(&self, overrides: Option<&Options>) -> Result<(), SatchelError> {
        self.guarded()?;
        sweep::clear(self.satchel.backend.as_ref(), &self.effective(overrides))
    }

    pub fn clear(&self, overrides: Option<&Options>) -> bool {
        report(self.try_clear(overrides), "clear", self.prefix()).is_some()
    }

    /// # Errors
    /// See [`Satchel::try_flush`].
    pub fn try_flush(&self, force: bool, overrides: Option<&Options>) -> Result<usize, SatchelError> {
        self.guarded()?;
        let now_ms = self.satchel.clock.now_ms();
        sweep::flush(self.satchel.backend.as_ref(), force, &self.effective(overrides), now_ms)
    }

    pub fn flush(&self, force: bool, overrides: Option<&Options>) -> bool {
        report(self.try_flush(force, overrides), "flush", self.prefix()).is_some()
    }

    /// # Errors
    /// See [`Satchel::try_keys`].
    pub fn try_keys(&self, overrides: Option<&Options>) -> Result<Vec<String>, SatchelError> {
        self.guarded()?;
        self.satchel.keys_internal(&self.effective(overrides))
    }

    #[must_use]
    pub fn keys(&self, overrides: Option<&Options>) -> Option<Vec<String>> {
        report(self.try_keys(overrides), "keys", self.prefix())
    }
}
