//! # Satchel
//!
//! A decorator over a plain string key-value store that adds three independent features:
//!
//! - **TTL expiry**: entries carry an absolute deadline and vanish once it passes, either
//!   lazily on read or through an explicit [`Satchel::flush`] sweep.
//! - **Obfuscation**: values can be passed through a reversible [`Cipher`] before they are
//!   written. The default [`ShiftCipher`] only deters casual inspection.
//! - **Namespacing**: a prefix is prepended to every key and scopes `clear` and `flush`.
//!
//! Each operation merges the handle's default [`Config`] with an optional per-call
//! [`Options`] override. Overrides distinguish "unspecified" from "explicitly off", so a
//! single call can store without the default ttl or prefix.
//!
//! ## Stored format
//!
//! Entries are JSON. Plain entries hold the value itself. Entries with a ttl are wrapped as
//! `{"\u0000": value, "ttl": expiry_ms}`; the reserved `"\u0000"` member is the only marker
//! of the wrapped shape and the expiry is never obfuscated.
//!
//! ## Failure model
//!
//! Nothing panics or aborts the host. An unusable backend is detected once, on first use,
//! after which `set`/`remove`/`clear`/`flush` return `false` and `get` returns `None`.
//! The `try_*` variants expose the underlying [`SatchelError`].
//!
//! ```rust
//! use satchel::{ManualClock, MemoryBackend, Options, Satchel};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new(0);
//! let satchel = Satchel::builder().backend(MemoryBackend::new()).clock(clock.clone()).build();
//!
//! assert!(satchel.set("otp", &123_456, Some(&Options::new().ttl_secs(30))));
//! assert_eq!(satchel.get::<u32>("otp", None), Some(123_456));
//!
//! clock.advance(Duration::from_secs(31));
//! assert_eq!(satchel.get::<u32>("otp", None), None);
//! ```

mod builder;
mod cipher;
mod clock;
mod codec;
mod engine;
mod error;
pub mod global;
mod guard;
mod resolver;
mod scoped;
mod settings;
mod sweep;

pub use builder::{NoBackend, SatchelBuilder, WithBackend};
pub use cipher::{Cipher, CipherError, CipherErrorExt, DEFAULT_SHIFT, FnCipher, Secret, ShiftCipher};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{EXPIRY_FIELD, SENTINEL};
pub use engine::{Satchel, SatchelInner};
pub use error::{SatchelError, SatchelErrorExt};
pub use resolver::{Config, Options, Setting, resolve};
pub use scoped::ScopedSatchel;
pub use settings::{Settings, load_settings};

pub use satchel_storage as storage;
pub use satchel_storage::{Backend, BackendError, FileBackend, MemoryBackend};
