//! # File and Environment Settings
//!
//! [`Settings`] is the serializable subset of [`Config`]: everything except the cipher.
//! [`load_settings`] layers an optional TOML file under `SATCHEL__*` environment
//! variables, e.g. `SATCHEL__TTL_SECS=300` or `SATCHEL__PREFIX=app:`.

use config::{Case, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::cipher::Secret;
use crate::error::{SatchelError, SatchelErrorExt};
use crate::resolver::Config;

const ENV_PREFIX: &str = "SATCHEL";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_FILE: &str = "satchel";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default ttl in seconds; absent or zero stores without expiry.
    pub ttl_secs: Option<u64>,
    pub encrypt: bool,
    pub prefix: Option<String>,
    pub secret: Option<Secret>,
}

impl Settings {
    /// Converts into a [`Config`] with the default cipher.
    #[must_use]
    pub fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            ttl: self.ttl_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            encrypt: self.encrypt,
            prefix: self.prefix.filter(|p| !p.is_empty()),
            secret: self.secret.unwrap_or(defaults.secret),
            cipher: defaults.cipher,
        }
    }
}

/// Loads settings from `path` (required when given) or from an optional `satchel.*` file
/// in the working directory, then applies `SATCHEL__*` environment overrides.
///
/// # Errors
/// Returns [`SatchelError::Config`] if a given file is missing or any source fails to
/// deserialize.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SatchelError> {
    build(path, None)
}

fn build(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Settings, SatchelError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_FILE).required(false),
    };

    let settings: Settings = config::Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .convert_case(Case::Snake)
                .source(env),
        )
        .build()
        .context("Failed to assemble settings sources")?
        .try_deserialize()
        .context("Failed to deserialize settings")?;

    info!(
        ttl_secs = ?settings.ttl_secs,
        encrypt = settings.encrypt,
        prefix = ?settings.prefix,
        "Settings loaded"
    );
    Ok(settings)
}
