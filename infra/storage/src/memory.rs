use crate::backend::Backend;
use crate::error::BackendError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// A process-local backend kept in a sorted map.
///
/// Capacity is measured as the sum of key and value lengths in bytes. With a quota
/// set, a write that would exceed it fails with [`BackendError::QuotaExceeded`] and
/// leaves the map untouched.
///
/// [`MemoryBackend::set_available`] toggles a "sandboxed host" mode in which every
/// call fails with [`BackendError::Unavailable`].
#[derive(Debug)]
pub struct MemoryBackend {
    slots: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
    available: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self { slots: RwLock::new(BTreeMap::new()), quota: None, available: AtomicBool::new(true) }
    }
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that rejects writes beyond `bytes` of keys plus values.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota: Some(bytes), ..Self::default() }
    }

    /// Creates a backend that fails every call, as if the host forbids access.
    #[must_use]
    pub fn unavailable() -> Self {
        let backend = Self::default();
        backend.set_available(false);
        backend
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Bytes currently charged against the quota.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.slots.read().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    fn ensure_available(&self) -> Result<(), BackendError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BackendError::Unavailable {
                message: "memory backend is disabled".into(),
                context: None,
            })
        }
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        self.ensure_available()?;
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        self.ensure_available()?;
        let mut slots = self.slots.write();

        if let Some(quota) = self.quota {
            let replaced = slots.get(key).map_or(0, |old| key.len() + old.len());
            let used: usize = slots.iter().map(|(k, v)| k.len() + v.len()).sum();
            let requested = used - replaced + key.len() + value.len();
            if requested > quota {
                return Err(BackendError::QuotaExceeded {
                    message: format!("{requested} bytes requested, quota is {quota}").into(),
                    context: Some(key.to_owned().into()),
                });
            }
        }

        slots.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.ensure_available()?;
        self.slots.write().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), BackendError> {
        self.ensure_available()?;
        self.slots.write().clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        self.ensure_available()?;
        Ok(self.slots.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let backend = MemoryBackend::new();
        backend.set("a", "1").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));

        backend.remove("a").unwrap();
        assert!(backend.get("a").unwrap().is_none());
        backend.remove("a").unwrap();
    }

    #[test]
    fn keys_are_sorted() {
        let backend = MemoryBackend::new();
        backend.set("b", "2").unwrap();
        backend.set("a", "1").unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn quota_rejects_without_partial_write() {
        let backend = MemoryBackend::with_quota(8);
        backend.set("k", "1234").unwrap();

        let err = backend.set("other", "12345").expect_err("quota should trip");
        assert!(matches!(err, BackendError::QuotaExceeded { .. }));
        assert!(backend.get("other").unwrap().is_none());
        assert_eq!(backend.used_bytes(), 5);
    }

    #[test]
    fn quota_credits_replaced_value() {
        let backend = MemoryBackend::with_quota(6);
        backend.set("k", "12345").unwrap();
        backend.set("k", "54321").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("54321"));
    }

    #[test]
    fn unavailable_fails_every_call() {
        let backend = MemoryBackend::unavailable();
        assert!(matches!(backend.probe(), Err(BackendError::Unavailable { .. })));
        assert!(backend.set("k", "v").is_err());
        assert!(backend.get("k").is_err());
        assert!(backend.clear().is_err());

        backend.set_available(true);
        assert!(backend.probe().is_ok());
    }
}
