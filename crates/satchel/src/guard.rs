use std::sync::OnceLock;

/// Lazily determined, never reset availability of the underlying store.
#[derive(Debug, Default)]
pub(crate) struct Availability {
    state: OnceLock<bool>,
}

impl Availability {
    /// Returns the memoized verdict, running `probe` on the very first call.
    ///
    /// The second element is `true` only for the caller whose probe produced the verdict.
    pub(crate) fn check(&self, probe: impl FnOnce() -> bool) -> (bool, bool) {
        let mut decided_here = false;
        let available = *self.state.get_or_init(|| {
            decided_here = true;
            probe()
        });
        (available, decided_here)
    }

    pub(crate) fn known(&self) -> Option<bool> {
        self.state.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_runs_once() {
        let guard = Availability::default();
        let mut calls = 0;

        assert_eq!(guard.check(|| { calls += 1; true }), (true, true));
        assert_eq!(guard.check(|| { calls += 1; false }), (true, false));
        assert_eq!(calls, 1);
    }

    #[test]
    fn unavailable_verdict_sticks() {
        let guard = Availability::default();
        assert_eq!(guard.known(), None);
        assert_eq!(guard.check(|| false), (false, true));
        assert_eq!(guard.check(|| true), (false, false));
        assert_eq!(guard.known(), Some(false));
    }
}
