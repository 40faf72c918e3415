//! # Entry Codec
//!
//! Stored entries are JSON text in one of two shapes:
//!
//! - **plain**: the value itself, or the cipher output as a JSON string when obfuscated;
//! - **ttl**: `{"\u0000": <payload>, "ttl": <expiry ms since epoch>}`.
//!
//! The reserved `"\u0000"` member is the only marker of the ttl shape. The `ttl` member
//! is never obfuscated so a sweep can judge expiry without the secret.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SatchelError;
use crate::resolver::Config;

/// Member name marking a ttl-wrapped entry.
pub const SENTINEL: &str = "\u{0}";

/// Member name holding the absolute expiry timestamp.
pub const EXPIRY_FIELD: &str = "ttl";

/// Outcome of reading a stored entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decoded {
    Value(Value),
    Expired,
}

/// A parsed entry, before any de-obfuscation.
#[derive(Debug)]
pub(crate) enum Entry {
    Plain(Value),
    Wrapped { payload: Value, expires_at: Option<u64> },
}

impl Entry {
    pub(crate) fn parse(raw: &str) -> Result<Self, SatchelError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Object(mut map) if map.contains_key(SENTINEL) => {
                let payload = map.remove(SENTINEL).unwrap_or(Value::Null);
                let expires_at = map.get(EXPIRY_FIELD).and_then(expiry_ms);
                Ok(Self::Wrapped { payload, expires_at })
            },
            value => Ok(Self::Plain(value)),
        }
    }

    /// Whether the entry carries a deadline that lies before `now_ms`.
    pub(crate) fn is_expired(&self, now_ms: u64) -> bool {
        matches!(self, Self::Wrapped { expires_at: Some(at), .. } if now_ms > *at)
    }

    pub(crate) const fn is_wrapped(&self) -> bool {
        matches!(self, Self::Wrapped { .. })
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn expiry_ms(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

/// Encodes `value` under the effective configuration at time `now_ms`.
///
/// # Errors
/// Returns [`SatchelError::Cipher`] if obfuscation fails, or
/// [`SatchelError::Serialization`] if the entry cannot be rendered as JSON.
pub(crate) fn encode(value: Value, config: &Config, now_ms: u64) -> Result<String, SatchelError> {
    let payload = if config.encrypt {
        Value::String(config.cipher.encrypt(&value, &config.secret)?)
    } else {
        value
    };

    let entry = match config.active_ttl() {
        Some(ttl) => {
            let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
            let mut map = Map::with_capacity(2);
            map.insert(SENTINEL.to_owned(), payload);
            map.insert(EXPIRY_FIELD.to_owned(), Value::from(now_ms.saturating_add(ttl_ms)));
            Value::Object(map)
        },
        None => payload,
    };

    Ok(serde_json::to_string(&entry)?)
}

/// Decodes a raw stored string at time `now_ms`.
///
/// De-obfuscation is attempted only when `config.encrypt` is set; on failure the
/// payload is returned as stored.
///
/// # Errors
/// Returns [`SatchelError::Serialization`] if the raw string is not JSON.
pub(crate) fn decode(raw: &str, config: &Config, now_ms: u64) -> Result<Decoded, SatchelError> {
    let entry = Entry::parse(raw)?;

    if entry.is_expired(now_ms) {
        return Ok(Decoded::Expired);
    }

    let payload = match entry {
        Entry::Plain(value) | Entry::Wrapped { payload: value, .. } => value,
    };

    Ok(Decoded::Value(if config.encrypt { reveal(payload, config) } else { payload }))
}

fn reveal(payload: Value, config: &Config) -> Value {
    let Value::String(sealed) = &payload else {
        return payload;
    };

    match config.cipher.decrypt(sealed, &config.secret) {
        Ok(value) => value,
        Err(err) => {
            debug!(error = %err, "De-obfuscation failed, returning stored value");
            payload
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    const NOW: u64 = 1_700_000_000_000;

    #[test]
    fn plain_value_is_stored_verbatim() {
        let raw = encode(json!({"a": [1, 2]}), &Config::new(), NOW).unwrap();
        assert_eq!(raw, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn ttl_entry_layout() {
        let config = Config::new().with_ttl(Duration::from_secs(1));
        let raw = encode(json!("v"), &config, NOW).unwrap();

        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[SENTINEL], json!("v"));
        assert_eq!(parsed[EXPIRY_FIELD], json!(NOW + 1_000));
        assert_eq!(parsed.as_object().unwrap().len(), 2);
        assert!(raw.contains("\\u0000"));
    }

    #[test]
    fn zero_ttl_stores_plain() {
        let config = Config::new().with_ttl(Duration::ZERO);
        assert_eq!(encode(json!(5), &config, NOW).unwrap(), "5");
    }

    #[test]
    fn ttl_field_stays_plaintext_when_encrypted() {
        let config = Config::new().with_ttl(Duration::from_secs(2)).with_encrypt(true);
        let raw = encode(json!({"secret": "x"}), &config, NOW).unwrap();

        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[EXPIRY_FIELD], json!(NOW + 2_000));
        assert!(parsed[SENTINEL].is_string());
        assert!(!raw.contains("secret"));
    }

    #[test]
    fn decode_round_trips_until_expiry() {
        let config = Config::new().with_ttl(Duration::from_secs(1)).with_encrypt(true);
        let raw = encode(json!([1, "two"]), &config, NOW).unwrap();

        assert_eq!(decode(&raw, &config, NOW + 1_000).unwrap(), Decoded::Value(json!([1, "two"])));
        assert_eq!(decode(&raw, &config, NOW + 1_001).unwrap(), Decoded::Expired);
    }

    #[test]
    fn encrypt_flag_gates_deobfuscation() {
        let sealing = Config::new().with_encrypt(true);
        let raw = encode(json!("hidden"), &sealing, NOW).unwrap();

        let Decoded::Value(stored) = decode(&raw, &Config::new(), NOW).unwrap() else {
            panic!("plain entry cannot expire");
        };
        assert!(stored.is_string());
        assert_ne!(stored, json!("hidden"));
    }

    #[test]
    fn wrong_secret_returns_stored_payload() {
        let sealing = Config::new().with_encrypt(true).with_secret(75);
        let raw = encode(json!({"k": 1}), &sealing, NOW).unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();

        let reading = Config::new().with_encrypt(true).with_secret(3);
        assert_eq!(decode(&raw, &reading, NOW).unwrap(), Decoded::Value(stored));
    }

    #[test]
    fn non_string_payload_skips_cipher() {
        let reading = Config::new().with_encrypt(true);
        assert_eq!(decode("42", &reading, NOW).unwrap(), Decoded::Value(json!(42)));
    }

    #[test]
    fn corrupt_entry_is_an_error() {
        assert!(matches!(
            decode("{not json", &Config::new(), NOW),
            Err(SatchelError::Serialization { .. })
        ));
    }

    #[test]
    fn user_objects_without_sentinel_are_plain() {
        let raw = r#"{"ttl": 1, "value": 2}"#;
        assert_eq!(decode(raw, &Config::new(), u64::MAX).unwrap(), Decoded::Value(json!({"ttl": 1, "value": 2})));
    }

    #[test]
    fn missing_expiry_never_expires() {
        let raw = r#"{"\u0000": "kept"}"#;
        let entry = Entry::parse(raw).unwrap();
        assert!(entry.is_wrapped());
        assert!(!entry.is_expired(u64::MAX));
    }
}
