//! Synchronous log/progress callbacks.
//!
//! The orchestrator invokes these inline between blocking calls. An observer
//! that blocks stalls the whole extraction.

/// Receives human-readable log lines and step progress from a run.
pub trait RunObserver {
    /// A log line for the operator.
    fn log(&self, message: &str);

    /// Step `current` of `total` has started.
    fn progress(&self, current: usize, total: usize, label: &str);
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn log(&self, _message: &str) {}

    fn progress(&self, _current: usize, _total: usize, _label: &str) {}
}

/// Observer built from a pair of closures.
pub struct FnObserver<L, P> {
    log: L,
    progress: P,
}

impl<L, P> FnObserver<L, P>
where
    L: Fn(&str),
    P: Fn(usize, usize, &str),
{
    pub const fn new(log: L, progress: P) -> Self {
        Self { log, progress }
    }
}

impl<L, P> RunObserver for FnObserver<L, P>
where
    L: Fn(&str),
    P: Fn(usize, usize, &str),
{
    fn log(&self, message: &str) {
        (self.log)(message);
    }

    fn progress(&self, current: usize, total: usize, label: &str) {
        (self.progress)(current, total, label);
    }
}
