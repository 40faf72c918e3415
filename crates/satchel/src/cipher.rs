//! # Value Obfuscation
//!
//! A [`Cipher`] turns a JSON value into an opaque string and back. The default
//! [`ShiftCipher`] is a reversible character shift; it hides values from casual
//! inspection and offers no cryptographic protection.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Shift applied by [`ShiftCipher`] when no secret is configured.
pub const DEFAULT_SHIFT: i64 = 75;

/// A specialized [`CipherError`] enum for obfuscation transforms.
#[satchel_derive::satchel_error]
pub enum CipherError {
    #[error("Encrypt failed{}: {message}", format_context(.context))]
    Encrypt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Decrypt failed{}: {message}", format_context(.context))]
    Decrypt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Opaque key material handed to a [`Cipher`].
///
/// Any JSON value is accepted; each cipher decides how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(Value);

impl Secret {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for Secret {
    fn default() -> Self {
        Self(Value::from(DEFAULT_SHIFT))
    }
}

impl From<i64> for Secret {
    fn from(value: i64) -> Self {
        Self(Value::from(value))
    }
}

impl From<i32> for Secret {
    fn from(value: i32) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(Value::from(value))
    }
}

impl From<Value> for Secret {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// A reversible value transform keyed by a [`Secret`].
///
/// `decrypt(encrypt(v, s), s)` must yield `v`. Decrypting with a different secret may
/// fail or produce garbage; callers treat either outcome as "leave the value alone".
pub trait Cipher: fmt::Debug + Send + Sync {
    /// Serializes and obfuscates `value`.
    ///
    /// # Errors
    /// Returns [`CipherError::Encrypt`] if the value cannot be transformed.
    fn encrypt(&self, value: &Value, secret: &Secret) -> Result<String, CipherError>;

    /// Reverses [`Cipher::encrypt`].
    ///
    /// # Errors
    /// Returns [`CipherError::Decrypt`] if the payload does not decode to JSON.
    fn decrypt(&self, payload: &str, secret: &Secret) -> Result<Value, CipherError>;
}

/// Shifts every character of the JSON text by a fixed number of Unicode scalar values.
///
/// Numeric secrets (or strings holding an integer) are the shift itself. Other strings
/// are folded into a shift. Any other secret falls back to [`DEFAULT_SHIFT`].
///
/// The shift wraps around the scalar value range and steps over the surrogate block,
/// so every string has an encoding and any integer secret is usable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftCipher;

/// First surrogate code point.
const SURROGATE_START: u32 = 0xD800;
/// Width of the surrogate block.
const SURROGATE_LEN: u32 = 0x800;
/// Number of Unicode scalar values.
const SCALARS: i64 = 0x10_F800;

impl ShiftCipher {
    #[allow(clippy::cast_possible_truncation)]
    fn shift_of(secret: &Secret) -> i64 {
        match secret.as_value() {
            Value::Number(n) => {
                n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(DEFAULT_SHIFT)
            },
            Value::String(s) => s.trim().parse::<i64>().unwrap_or_else(|_| fold(s)),
            _ => DEFAULT_SHIFT,
        }
    }

    fn shift(text: &str, by: i64) -> String {
        let by = by.rem_euclid(SCALARS);
        text.chars()
            .map(|c| {
                let index = (i64::from(scalar_index(c)) + by) % SCALARS;
                u32::try_from(index).ok().and_then(scalar_at).unwrap_or(char::REPLACEMENT_CHARACTER)
            })
            .collect()
    }
}

/// Position of `c` among scalar values, surrogates skipped.
fn scalar_index(c: char) -> u32 {
    let code = u32::from(c);
    if code < SURROGATE_START { code } else { code - SURROGATE_LEN }
}

fn scalar_at(index: u32) -> Option<char> {
    let code = if index < SURROGATE_START { index } else { index + SURROGATE_LEN };
    char::from_u32(code)
}

fn fold(text: &str) -> i64 {
    let folded = text.bytes().fold(0_i64, |acc, b| (acc * 31 + i64::from(b)) % 1024);
    folded + 1
}

impl Cipher for ShiftCipher {
    fn encrypt(&self, value: &Value, secret: &Secret) -> Result<String, CipherError> {
        let plain = serde_json::to_string(value).map_err(|e| CipherError::Encrypt {
            message: e.to_string().into(),
            context: None,
        })?;

        Ok(Self::shift(&plain, Self::shift_of(secret)))
    }

    fn decrypt(&self, payload: &str, secret: &Secret) -> Result<Value, CipherError> {
        let plain = Self::shift(payload, -Self::shift_of(secret).rem_euclid(SCALARS));

        serde_json::from_str(&plain)
            .map_err(|e| CipherError::Decrypt { message: e.to_string().into(), context: None })
    }
}

type EncryptFn = dyn Fn(&Value, &Secret) -> Result<String, CipherError> + Send + Sync;
type DecryptFn = dyn Fn(&str, &Secret) -> Result<Value, CipherError> + Send + Sync;

/// Adapts a pair of closures into a [`Cipher`].
///
/// # Example
///
/// ```rust
/// use satchel::{Cipher, CipherError, FnCipher, Secret};
/// use serde_json::json;
///
/// let reverse = FnCipher::new(
///     |value, _| Ok(value.to_string().chars().rev().collect()),
///     |payload, _| {
///         let text: String = payload.chars().rev().collect();
///         serde_json::from_str(&text)
///             .map_err(|e| CipherError::Decrypt { message: e.to_string().into(), context: None })
///     },
/// );
///
/// let secret = Secret::default();
/// let sealed = reverse.encrypt(&json!([1, 2]), &secret).unwrap();
/// assert_eq!(sealed, "]2,1[");
/// assert_eq!(reverse.decrypt(&sealed, &secret).unwrap(), json!([1, 2]));
/// ```
pub struct FnCipher {
    encrypt: Box<EncryptFn>,
    decrypt: Box<DecryptFn>,
}

impl FnCipher {
    pub fn new<E, D>(encrypt: E, decrypt: D) -> Self
    where
        E: Fn(&Value, &Secret) -> Result<String, CipherError> + Send + Sync + 'static,
        D: Fn(&str, &Secret) -> Result<Value, CipherError> + Send + Sync + 'static,
    {
        Self { encrypt: Box::new(encrypt), decrypt: Box::new(decrypt) }
    }
}

impl fmt::Debug for FnCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCipher").finish_non_exhaustive()
    }
}

impl Cipher for FnCipher {
    fn encrypt(&self, value: &Value, secret: &Secret) -> Result<String, CipherError> {
        (self.encrypt)(value, secret)
    }

    fn decrypt(&self, payload: &str, secret: &Secret) -> Result<Value, CipherError> {
        (self.decrypt)(payload, secret)
    }
}
