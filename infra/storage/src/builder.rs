use crate::error::{BackendError, BackendErrorExt};
use crate::file::FileBackend;
use crate::maintenance;
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

#[derive(Debug, Clone)]
struct FileConfig {
    create: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self { create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct FileBackendBuilder<S: Sealed = NoRoot> {
    state: S,
    config: FileConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> FileBackendBuilder<S> {
    #[must_use = "Sets whether the root directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> FileBackendBuilder<N> {
        FileBackendBuilder { state, config: self.config }
    }
}

impl FileBackendBuilder<NoRoot> {
    #[must_use = "Creates a new file backend builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory that holds the slot files"]
    pub fn root(self, path: impl Into<PathBuf>) -> FileBackendBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl FileBackendBuilder<WithRoot> {
    /// Consumes the configuration and opens the backend.
    ///
    /// Boot sequence:
    /// 1. **Bootstrapping**: creates the root directory if `create(true)` was set.
    /// 2. **Canonicalization**: resolves the root to an absolute physical path.
    /// 3. **Self-Healing**: removes stale temp files left by interrupted writes.
    ///
    /// Cleanup is best effort; failures are logged and do not abort opening.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Io`] if the root does not exist and `create` is false,
    /// or if the process lacks permissions to create or resolve it.
    pub fn open(self) -> Result<FileBackend, BackendError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .context(format!("Failed to bootstrap backend root: {}", root.display()))?;
            info!(path = %root.display(), "Bootstrapped backend root directory");
        }

        let canonical = fs::canonicalize(root)
            .context(format!("Failed to resolve backend root: {}", root.display()))?;

        maintenance::purge_tmp(&canonical);

        Ok(FileBackend::from_parts(canonical, tmp_salt()))
    }
}

static OPENED: AtomicU64 = AtomicU64::new(0);

/// A per-handle tag for temp file names: process id, open time and open sequence.
fn tmp_salt() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.subsec_nanos());
    let seq = OPENED.fetch_add(1, Ordering::Relaxed);
    format!("{:x}-{nanos:x}-{seq:x}", std::process::id())
}
