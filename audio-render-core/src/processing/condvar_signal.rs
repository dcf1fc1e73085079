use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::traits::period_signal::{PeriodSignal, WaitOutcome};

/// Auto-reset event built on a condition variable.
///
/// Backs poll-mode sessions (where only stop requests notify it) and
/// backends without a native event primitive.
#[derive(Debug, Default)]
pub struct CondvarSignal {
    pending: Mutex<bool>,
    cond: Condvar,
}

impl CondvarSignal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PeriodSignal for CondvarSignal {
    fn wait(&self, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();
        while !*pending {
            if self.cond.wait_until(&mut pending, deadline).timed_out() {
                break;
            }
        }
        if *pending {
            *pending = false;
            WaitOutcome::Signaled
        } else {
            WaitOutcome::TimedOut
        }
    }

    fn notify(&self) {
        *self.pending.lock() = true;
        self.cond.notify_one();
    }
}
