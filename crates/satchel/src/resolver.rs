//! # Configuration Resolution
//!
//! [`Config`] is the effective record an operation runs with. [`Options`] is a per-call
//! override whose fields distinguish "not specified" from "explicitly disabled", so an
//! override can turn off a default instead of only replacing it.

use std::sync::Arc;
use std::time::Duration;

use crate::cipher::{Cipher, Secret, ShiftCipher};

/// A three-way override for an optional setting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Setting<T> {
    /// Fall back to the default.
    #[default]
    Inherit,
    /// Force the setting off regardless of the default.
    Clear,
    /// Use this value.
    Set(T),
}

impl<T> Setting<T> {
    #[must_use]
    pub const fn is_inherit(&self) -> bool {
        matches!(self, Self::Inherit)
    }
}

impl<T> From<Option<T>> for Setting<T> {
    /// `None` maps to [`Setting::Clear`]: an explicit "nothing".
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

/// The effective configuration of one operation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Time until expiry; `None` stores entries without a deadline.
    pub ttl: Option<Duration>,
    /// Obfuscate on write and attempt de-obfuscation on read.
    pub encrypt: bool,
    /// Namespace prepended verbatim to every logical key.
    pub prefix: Option<String>,
    pub secret: Secret,
    pub cipher: Arc<dyn Cipher>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl: None,
            encrypt: false,
            prefix: None,
            secret: Secret::default(),
            cipher: Arc::new(ShiftCipher),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub const fn with_encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<Secret>) -> Self {
        self.secret = secret.into();
        self
    }

    #[must_use]
    pub fn with_cipher(mut self, cipher: impl Cipher + 'static) -> Self {
        self.cipher = Arc::new(cipher);
        self
    }

    /// The ttl that actually wraps entries: zero durations count as none.
    pub(crate) fn active_ttl(&self) -> Option<Duration> {
        self.ttl.filter(|ttl| !ttl.is_zero())
    }

    /// The prefix that actually scopes keys: empty strings count as none.
    pub(crate) fn active_prefix(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// Applies the prefix to a logical key.
    #[must_use]
    pub fn scoped_key(&self, key: &str) -> String {
        self.active_prefix().map_or_else(|| key.to_owned(), |prefix| format!("{prefix}{key}"))
    }
}

/// A per-call override of the default [`Config`].
///
/// # Example
///
/// ```rust
/// use satchel::{Config, Options, resolve};
/// use std::time::Duration;
///
/// let defaults = Config::new().with_ttl(Duration::from_secs(60)).with_prefix("app:");
/// let effective = resolve(&defaults, Some(&Options::new().no_ttl().encrypt(true)));
///
/// assert_eq!(effective.ttl, None);
/// assert!(effective.encrypt);
/// assert_eq!(effective.prefix.as_deref(), Some("app:"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub ttl: Setting<Duration>,
    /// `Some(false)` forces plain storage even when the default encrypts.
    pub encrypt: Option<bool>,
    pub prefix: Setting<String>,
    pub secret: Option<Secret>,
    pub cipher: Option<Arc<dyn Cipher>>,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Setting::Set(ttl);
        self
    }

    #[must_use]
    pub const fn ttl_secs(self, secs: u64) -> Self {
        self.ttl(Duration::from_secs(secs))
    }

    /// Stores without expiry even when the default carries a ttl.
    #[must_use]
    pub const fn no_ttl(mut self) -> Self {
        self.ttl = Setting::Clear;
        self
    }

    #[must_use]
    pub const fn encrypt(mut self, encrypt: bool) -> Self {
        self.encrypt = Some(encrypt);
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Setting::Set(prefix.into());
        self
    }

    /// Addresses the raw key even when the default carries a prefix.
    #[must_use]
    pub fn no_prefix(mut self) -> Self {
        self.prefix = Setting::Clear;
        self
    }

    #[must_use]
    pub fn secret(mut self, secret: impl Into<Secret>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    #[must_use]
    pub fn cipher(mut self, cipher: impl Cipher + 'static) -> Self {
        self.cipher = Some(Arc::new(cipher));
        self
    }
}

/// Merges `defaults` with an optional per-call override.
///
/// `ttl` and `prefix` follow the three-way rule of [`Setting`]; a zero ttl or an empty
/// prefix in the override is treated as unspecified. `encrypt` is forced by an explicit
/// boolean and inherited otherwise. `secret` and `cipher` are override-or-default.
#[must_use]
pub fn resolve(defaults: &Config, overrides: Option<&Options>) -> Config {
    let Some(overrides) = overrides else {
        return defaults.clone();
    };

    let ttl = match &overrides.ttl {
        Setting::Clear => None,
        Setting::Set(ttl) if !ttl.is_zero() => Some(*ttl),
        Setting::Set(_) | Setting::Inherit => defaults.ttl,
    };

    let prefix = match &overrides.prefix {
        Setting::Clear => None,
        Setting::Set(prefix) if !prefix.is_empty() => Some(prefix.clone()),
        Setting::Set(_) | Setting::Inherit => defaults.prefix.clone(),
    };

    Config {
        ttl,
        encrypt: overrides.encrypt.unwrap_or(defaults.encrypt),
        prefix,
        secret: overrides.secret.clone().unwrap_or_else(|| defaults.secret.clone()),
        cipher: overrides.cipher.clone().unwrap_or_else(|| Arc::clone(&defaults.cipher)),
    }
}
