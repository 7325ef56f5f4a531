use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Shutdown flag that interval waits can block on.
///
/// Cloning shares the flag. Triggered from the signal handler; every
/// sleeping loop wakes up immediately instead of finishing its interval.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        let (lock, cvar) = &*self.state;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.state.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `duration` or until shutdown. Returns `true` if shutdown was
    /// requested.
    pub fn wait(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.state;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Past the end of the clock: only shutdown ends the wait.
        let Some(deadline) = Instant::now().checked_add(duration) else {
            while !*stopped {
                stopped = cvar.wait(stopped).unwrap_or_else(PoisonError::into_inner);
            }
            return true;
        };
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            stopped = cvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *stopped
    }
}
