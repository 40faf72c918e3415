//! # Satchel Errors
//!
//! [`SatchelError`] is returned by the fallible `try_*` operations. The plain
//! operations (`set`, `get`, ...) log the error and collapse it into `false`/`None`.

use satchel_storage::BackendError;
use std::borrow::Cow;

use crate::cipher::CipherError;

/// A specialized [`SatchelError`] enum of this crate.
#[satchel_derive::satchel_error]
pub enum SatchelError {
    /// The underlying store failed its availability probe, or no instance is installed.
    #[error("Store unavailable{}: {message}", format_context(.context))]
    Unavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The underlying store rejected an operation.
    #[error("Backend failure{}: {source}", format_context(.context))]
    Backend { source: BackendError, context: Option<Cow<'static, str>> },

    /// A value could not be converted to or from its stored JSON form.
    #[error("Serialization failure{}: {source}", format_context(.context))]
    Serialization { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// The configured cipher failed to obfuscate a value.
    #[error("Cipher failure{}: {source}", format_context(.context))]
    Cipher { source: CipherError, context: Option<Cow<'static, str>> },

    /// Settings could not be loaded from file or environment.
    #[error("Settings error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal satchel error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl SatchelError {
    pub(crate) fn unavailable() -> Self {
        Self::Unavailable { message: "underlying store is not usable".into(), context: None }
    }
}
