use parking_lot::RwLock;
use private::Sealed;
use satchel_storage::Backend;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::engine::{Satchel, SatchelInner};
use crate::guard::Availability;
use crate::resolver::Config;

#[derive(Debug, Default)]
pub struct NoBackend;
#[derive(Debug)]
pub struct WithBackend(Arc<dyn Backend>);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoBackend {}
impl Sealed for WithBackend {}

#[allow(private_bounds)]
#[derive(Debug)]
pub struct SatchelBuilder<S: Sealed = NoBackend> {
    state: S,
    clock: Arc<dyn Clock>,
    defaults: Config,
}

impl Default for SatchelBuilder<NoBackend> {
    fn default() -> Self {
        Self { state: NoBackend, clock: Arc::new(SystemClock), defaults: Config::default() }
    }
}

#[allow(private_bounds)]
impl<S: Sealed> SatchelBuilder<S> {
    #[must_use = "Sets the clock used to stamp and check expiry"]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use = "Sets the initial default configuration"]
    pub fn defaults(mut self, defaults: Config) -> Self {
        self.defaults = defaults;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> SatchelBuilder<N> {
        SatchelBuilder { state, clock: self.clock, defaults: self.defaults }
    }
}

impl SatchelBuilder<NoBackend> {
    #[must_use = "Creates a new builder with the system clock and default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the underlying store"]
    pub fn backend(self, backend: impl Backend + 'static) -> SatchelBuilder<WithBackend> {
        self.transition(WithBackend(Arc::new(backend)))
    }
}

impl SatchelBuilder<WithBackend> {
    /// Creates the handle. The backend is not touched until the first operation.
    #[must_use]
    pub fn build(self) -> Satchel {
        Satchel {
            inner: Arc::new(SatchelInner {
                backend: self.state.0,
                clock: self.clock,
                defaults: RwLock::new(self.defaults),
                availability: Availability::default(),
            }),
        }
    }
}
