//! The [`Satchel`] handle: availability guard, config resolution and entry codec wired
//! in front of a [`Backend`].

use parking_lot::RwLock;
use satchel_storage::Backend;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::builder::SatchelBuilder;
use crate::cipher::{Cipher, Secret};
use crate::clock::Clock;
use crate::codec::{self, Decoded};
use crate::error::{SatchelError, SatchelErrorExt};
use crate::guard::Availability;
use crate::resolver::{Config, Options, resolve};
use crate::scoped::ScopedSatchel;
use crate::sweep;

/// Shared state behind every clone of a [`Satchel`].
#[derive(Debug)]
pub struct SatchelInner {
    pub(crate) backend: Arc<dyn Backend>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) defaults: RwLock<Config>,
    pub(crate) availability: Availability,
}

/// A thread-safe handle decorating a [`Backend`] with ttl expiry, obfuscation and
/// key prefixes.
///
/// Every operation first consults the availability guard. The first call probes the
/// backend; if the probe succeeds a non-forced sweep evicts already expired entries.
/// When the backend is unusable the plain operations return `false`/`None` and the
/// `try_*` variants return [`SatchelError::Unavailable`], without touching the store.
///
/// Clones share the backend, the clock and the default configuration.
///
/// # Example
///
/// ```rust
/// use satchel::{MemoryBackend, Options, Satchel};
///
/// let satchel = Satchel::builder().backend(MemoryBackend::new()).build();
///
/// assert!(satchel.set("visits", &3, None));
/// assert_eq!(satchel.get::<u32>("visits", None), Some(3));
///
/// let session = Options::new().ttl_secs(30).encrypt(true).prefix("session:");
/// assert!(satchel.set("token", "abc", Some(&session)));
/// assert_eq!(satchel.get::<String>("token", Some(&session)).as_deref(), Some("abc"));
/// assert_eq!(satchel.get::<String>("token", None), None);
/// ```
#[derive(Debug, Clone)]
pub struct Satchel {
    pub(crate) inner: Arc<SatchelInner>,
}

impl Deref for Satchel {
    type Target = SatchelInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Satchel {
    #[must_use = "The handle is not created until you call .build()"]
    pub fn builder() -> SatchelBuilder {
        SatchelBuilder::new()
    }

    /// Reports whether the backend is usable, probing it on the first call only.
    pub fn is_available(&self) -> bool {
        let (available, decided_here) = self.availability.check(|| match self.backend.probe() {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "Store unavailable, all operations disabled");
                false
            },
        });

        if decided_here && available {
            info!("Store available");
            let config = self.defaults();
            if let Err(err) = sweep::flush(self.backend.as_ref(), false, &config, self.now_ms()) {
                warn!(error = %err, "Initial sweep failed");
            }
        }

        available
    }

    fn ensure_available(&self) -> Result<(), SatchelError> {
        if self.is_available() { Ok(()) } else { Err(SatchelError::unavailable()) }
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// A snapshot of the default configuration.
    #[must_use]
    pub fn defaults(&self) -> Config {
        self.defaults.read().clone()
    }

    /// Mutates the default configuration under a single write lock.
    ///
    /// ```rust
    /// use satchel::{MemoryBackend, Satchel};
    /// use std::time::Duration;
    ///
    /// let satchel = Satchel::builder().backend(MemoryBackend::new()).build();
    /// satchel.configure(|cfg| {
    ///     cfg.ttl = Some(Duration::from_secs(60));
    ///     cfg.prefix = Some("app:".into());
    /// });
    /// assert_eq!(satchel.defaults().prefix.as_deref(), Some("app:"));
    /// ```
    pub fn configure(&self, update: impl FnOnce(&mut Config)) {
        update(&mut self.defaults.write());
    }

    pub fn set_default_ttl(&self, ttl: Option<Duration>) {
        self.defaults.write().ttl = ttl;
    }

    pub fn set_default_encrypt(&self, encrypt: bool) {
        self.defaults.write().encrypt = encrypt;
    }

    pub fn set_default_prefix(&self, prefix: Option<String>) {
        self.defaults.write().prefix = prefix;
    }

    pub fn set_default_secret(&self, secret: impl Into<Secret>) {
        self.defaults.write().secret = secret.into();
    }

    pub fn set_default_cipher(&self, cipher: impl Cipher + 'static) {
        self.defaults.write().cipher = Arc::new(cipher);
    }

    /// The configuration an operation with `overrides` would run with.
    #[must_use]
    pub fn effective(&self, overrides: Option<&Options>) -> Config {
        resolve(&self.defaults.read(), overrides)
    }

    /// Returns a view whose operations are confined to keys starting with `prefix`.
    #[must_use]
    pub fn scoped(&self, prefix: impl Into<String>) -> ScopedSatchel {
        ScopedSatchel::new(self.clone(), prefix.into())
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    /// - [`SatchelError::Unavailable`] if the backend failed its probe.
    /// - [`SatchelError::Serialization`] / [`SatchelError::Cipher`] if the value cannot be
    ///   encoded; nothing is written in that case.
    /// - [`SatchelError::Backend`] if the backend rejects the write (e.g. quota).
    pub fn try_set<T>(&self, key: &str, value: &T, overrides: Option<&Options>) -> Result<(), SatchelError>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_available()?;
        let config = self.effective(overrides);
        self.set_internal(key, value, &config)
    }

    pub(crate) fn set_internal<T>(&self, key: &str, value: &T, config: &Config) -> Result<(), SatchelError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).context(format!("Value for {key} is not serializable"))?;
        let raw = codec::encode(value, config, self.now_ms())?;
        let scoped = config.scoped_key(key);

        self.backend.set(&scoped, &raw).context(format!("Write of {scoped} rejected"))?;
        debug!(key = %scoped, ttl = ?config.active_ttl(), encrypt = config.encrypt, "Entry written");
        Ok(())
    }

    /// Stores `value` under `key`; `false` on any failure.
    pub fn set<T>(&self, key: &str, value: &T, overrides: Option<&Options>) -> bool
    where
        T: Serialize + ?Sized,
    {
        report(self.try_set(key, value, overrides), "set", key).is_some()
    }

    /// Reads the value under `key`, evicting it if its ttl has elapsed.
    ///
    /// # Errors
    /// - [`SatchelError::Unavailable`] if the backend failed its probe.
    /// - [`SatchelError::Serialization`] if the stored entry is not JSON or does not fit `T`.
    /// - [`SatchelError::Backend`] if the read or the eviction fails.
    pub fn try_get<T>(&self, key: &str, overrides: Option<&Options>) -> Result<Option<T>, SatchelError>
    where
        T: DeserializeOwned,
    {
        self.ensure_available()?;
        let config = self.effective(overrides);
        self.get_internal(key, &config)
    }

    pub(crate) fn get_internal<T>(&self, key: &str, config: &Config) -> Result<Option<T>, SatchelError>
    where
        T: DeserializeOwned,
    {
        let Some(value) = self.get_value(key, config)? else {
            return Ok(None);
        };
        let typed = serde_json::from_value(value).context(format!("Entry {key} has an unexpected shape"))?;
        Ok(Some(typed))
    }

    fn get_value(&self, key: &str, config: &Config) -> Result<Option<Value>, SatchelError> {
        let scoped = config.scoped_key(key);

        let raw = match self.backend.get(&scoped).context(format!("Read of {scoped} failed"))? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        match codec::decode(&raw, config, self.now_ms()).context(format!("Entry {scoped} is corrupt"))? {
            Decoded::Value(value) => Ok(Some(value)),
            Decoded::Expired => {
                self.backend.remove(&scoped).context(format!("Eviction of {scoped} failed"))?;
                debug!(key = %scoped, "Expired entry evicted");
                Ok(None)
            },
        }
    }

    /// Reads the value under `key`; `None` when absent, expired, unreadable or unavailable.
    #[must_use]
    pub fn get<T>(&self, key: &str, overrides: Option<&Options>) -> Option<T>
    where
        T: DeserializeOwned,
    {
        report(self.try_get(key, overrides), "get", key).flatten()
    }

    /// Deletes `key`; a missing key is not an error.
    ///
    /// # Errors
    /// [`SatchelError::Unavailable`] or [`SatchelError::Backend`].
    pub fn try_remove(&self, key: &str, overrides: Option<&Options>) -> Result<(), SatchelError> {
        self.ensure_available()?;
        let config = self.effective(overrides);
        self.remove_internal(key, &config)
    }

    pub(crate) fn remove_internal(&self, key: &str, config: &Config) -> Result<(), SatchelError> {
        let scoped = config.scoped_key(key);
        self.backend.remove(&scoped).context(format!("Removal of {scoped} failed"))?;
        debug!(key = %scoped, "Entry removed");
        Ok(())
    }

    pub fn remove(&self, key: &str, overrides: Option<&Options>) -> bool {
        report(self.try_remove(key, overrides), "remove", key).is_some()
    }

    /// Deletes every key under the effective prefix, or the whole store without one.
    ///
    /// # Errors
    /// [`SatchelError::Unavailable`] or [`SatchelError::Backend`].
    pub fn try_clear(&self, overrides: Option<&Options>) -> Result<(), SatchelError> {
        self.ensure_available()?;
        sweep::clear(self.backend.as_ref(), &self.effective(overrides))
    }

    pub fn clear(&self, overrides: Option<&Options>) -> bool {
        report(self.try_clear(overrides), "clear", "*").is_some()
    }

    /// Sweeps ttl entries under the effective prefix: expired ones, or all of them when
    /// `force` is set. Plain entries are never removed. Returns the number removed.
    ///
    /// # Errors
    /// [`SatchelError::Unavailable`] or [`SatchelError::Backend`].
    pub fn try_flush(&self, force: bool, overrides: Option<&Options>) -> Result<usize, SatchelError> {
        self.ensure_available()?;
        sweep::flush(self.backend.as_ref(), force, &self.effective(overrides), self.now_ms())
    }

    pub fn flush(&self, force: bool, overrides: Option<&Options>) -> bool {
        report(self.try_flush(force, overrides), "flush", "*").is_some()
    }

    /// Logical keys under the effective prefix, with the prefix stripped, sorted.
    ///
    /// Expired entries that have not been swept yet are still listed.
    ///
    /// # Errors
    /// [`SatchelError::Unavailable`] or [`SatchelError::Backend`].
    pub fn try_keys(&self, overrides: Option<&Options>) -> Result<Vec<String>, SatchelError> {
        self.ensure_available()?;
        self.keys_internal(&self.effective(overrides))
    }

    pub(crate) fn keys_internal(&self, config: &Config) -> Result<Vec<String>, SatchelError> {
        let mut keys: Vec<String> = self
            .backend
            .keys()
            .context("Listing keys failed")?
            .into_iter()
            .filter_map(|key| match config.active_prefix() {
                Some(prefix) => key.strip_prefix(prefix).map(str::to_owned),
                None => Some(key),
            })
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    #[must_use]
    pub fn keys(&self, overrides: Option<&Options>) -> Option<Vec<String>> {
        report(self.try_keys(overrides), "keys", "*")
    }
}

/// Collapses a fallible result into an `Option`, logging what was swallowed.
pub(crate) fn report<T>(result: Result<T, SatchelError>, op: &'static str, key: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(SatchelError::Unavailable { .. }) => None,
        Err(err) => {
            warn!(op, key, error = %err, "Operation failed");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use satchel_storage::MemoryBackend;

    fn fixture() -> (Satchel, Arc<MemoryBackend>, ManualClock) {
        let backend = Arc::new(MemoryBackend::new());
        let clock = ManualClock::new(1_000_000);
        let satchel = Satchel::builder().backend(Arc::clone(&backend)).clock(clock.clone()).build();
        (satchel, backend, clock)
    }

    #[test]
    fn expired_read_evicts_entry() {
        let (satchel, backend, clock) = fixture();
        assert!(satchel.set("k", "v", Some(&Options::new().ttl_secs(1))));

        clock.advance(Duration::from_millis(1_001));
        assert_eq!(satchel.get::<String>("k", None), None);
        assert!(backend.get("k").unwrap().is_none());
    }

    #[test]
    fn wrong_shape_reads_none() {
        let (satchel, _, _) = fixture();
        assert!(satchel.set("n", "text", None));
        assert_eq!(satchel.get::<u32>("n", None), None);
        assert!(matches!(satchel.try_get::<u32>("n", None), Err(SatchelError::Serialization { .. })));
    }

    #[test]
    fn empty_raw_value_reads_none() {
        let (satchel, backend, _) = fixture();
        backend.set("blank", "").unwrap();
        assert_eq!(satchel.try_get::<Value>("blank", None).unwrap(), None);
    }

    #[test]
    fn keys_strip_prefix() {
        let (satchel, _, _) = fixture();
        let ns = Options::new().prefix("ns:");
        assert!(satchel.set("b", &1, Some(&ns)));
        assert!(satchel.set("a", &2, Some(&ns)));
        assert!(satchel.set("other", &3, None));

        assert_eq!(satchel.keys(Some(&ns)).unwrap(), vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(satchel.keys(None).unwrap().len(), 3);
    }

    #[test]
    fn first_probe_sweeps_expired_entries() {
        let backend = Arc::new(MemoryBackend::new());
        let stale = serde_json::json!({"\u{0}": "old", "ttl": 10}).to_string();
        backend.set("stale", &stale).unwrap();
        backend.set("plain", "1").unwrap();

        let satchel = Satchel::builder().backend(Arc::clone(&backend)).clock(ManualClock::new(20)).build();
        assert!(satchel.is_available());
        assert_eq!(backend.keys().unwrap(), vec!["plain".to_owned()]);
    }

    #[test]
    fn quota_failure_reports_false() {
        let satchel = Satchel::builder().backend(MemoryBackend::with_quota(4)).build();
        assert!(!satchel.set("key", "a long value", None));
        assert!(matches!(satchel.try_set("key", "a long value", None), Err(SatchelError::Backend { .. })));
    }

    #[test]
    fn configure_updates_all_clones() {
        let (satchel, _, _) = fixture();
        let clone = satchel.clone();
        satchel.set_default_prefix(Some("p:".into()));
        satchel.set_default_encrypt(true);
        assert_eq!(clone.defaults().prefix.as_deref(), Some("p:"));
        assert!(clone.effective(None).encrypt);
    }
}
