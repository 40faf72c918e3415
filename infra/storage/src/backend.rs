use crate::error::BackendError;
use std::fmt::Debug;
use std::sync::Arc;

/// The raw slot store that Satchel decorates.
///
/// Implementations map string keys to string values and make no promises beyond
/// per-key atomicity. Every method may fail; callers treat failures as recoverable.
pub trait Backend: Send + Sync + Debug {
    /// Returns the value stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    /// Returns a [`BackendError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`BackendError::QuotaExceeded`] when capacity is exhausted, or another
    /// [`BackendError`] if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Removes the slot under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns a [`BackendError`] if the backend cannot be modified.
    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Removes every slot in the backend.
    ///
    /// # Errors
    /// Returns a [`BackendError`] if the backend cannot be modified.
    fn clear(&self) -> Result<(), BackendError>;

    /// Enumerates every key currently present.
    ///
    /// # Errors
    /// Returns a [`BackendError`] if the backend cannot be listed.
    fn keys(&self) -> Result<Vec<String>, BackendError>;

    /// Checks that the backend is usable at all.
    ///
    /// The default implementation lists the keys and discards them.
    ///
    /// # Errors
    /// Returns a [`BackendError`] if the backend refuses access.
    fn probe(&self) -> Result<(), BackendError> {
        self.keys().map(|_| ())
    }
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn clear(&self) -> Result<(), BackendError> {
        (**self).clear()
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        (**self).keys()
    }

    fn probe(&self) -> Result<(), BackendError> {
        (**self).probe()
    }
}
