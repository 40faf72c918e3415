//! Synchronous, string-keyed storage backends.
//!
//! Satchel decorates a plain key-value slot store; this crate defines that contract
//! ([`Backend`]) and ships two implementations:
//!
//! - **[`MemoryBackend`]**: a process-local map with an optional byte quota and a
//!   switch that makes every call fail, modelling hosts that forbid storage access.
//! - **[`FileBackend`]**: a persistent directory where every key lives in its own file.
//!   Writes use an atomic swap (unique temp write + `fsync` + `rename`), and stale temp
//!   files left by crashes are purged when the backend opens.
//!
//! # Examples
//!
//! ```rust
//! use satchel_storage::{Backend, BackendError, FileBackend};
//!
//! fn main() -> Result<(), BackendError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("slots");
//!     let backend = FileBackend::builder().root(&root).create(true).open()?;
//!
//!     backend.set("session", "{\"user\":42}")?;
//!     assert_eq!(backend.get("session")?.as_deref(), Some("{\"user\":42}"));
//!     assert_eq!(backend.keys()?, vec!["session".to_owned()]);
//!
//!     backend.remove("session")?;
//!     assert!(backend.get("session")?.is_none());
//!     Ok(())
//! }
//! ```

mod backend;
mod builder;
mod error;
mod file;
mod key;
mod maintenance;
mod memory;

pub use backend::Backend;
pub use builder::FileBackendBuilder;
pub use error::{BackendError, BackendErrorExt};
pub use file::FileBackend;
pub use memory::MemoryBackend;
