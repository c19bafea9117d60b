use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Set once when the user interrupts. The countdown sleeps on it so a
/// Ctrl+C between ticks is seen straight away.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    triggered: Mutex<bool>,
    wake: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let mut triggered = self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *triggered = true;
        self.wake.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        *self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `tick`, returning early with `true` if triggered.
    pub fn wait(&self, tick: Duration) -> bool {
        let triggered = self
            .triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let (triggered, _) = self
            .wake
            .wait_timeout_while(triggered, tick, |t| !*t)
            .unwrap_or_else(PoisonError::into_inner);
        *triggered
    }
}
