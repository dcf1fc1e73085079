use std::time::Duration;

/// Result of waiting on a period signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Signaled,
    TimedOut,
}

/// Auto-reset notification fired once per completed device period.
///
/// Pending notifications are not queued: several `notify` calls before a
/// `wait` wake it once.
pub trait PeriodSignal: Send + Sync {
    /// Block until notified or `timeout` elapses.
    fn wait(&self, timeout: Duration) -> WaitOutcome;

    /// Wake the waiter. Used by the device and by stop requests.
    fn notify(&self);
}
