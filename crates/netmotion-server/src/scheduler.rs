//! Named periodic and one-shot timers.
//!
//! The runtime talks to timers only through [`Scheduler`], so tests can drive
//! time by hand (see `test_support::ManualScheduler`) while the daemon uses the
//! tokio-backed [`crate::Ticker`].

use std::time::Duration;

/// Callback run on every period of a repeating task.
pub type RepeatFn = Box<dyn FnMut() + Send + 'static>;

/// Callback run once when a delayed task fires.
pub type OnceFn = Box<dyn FnOnce() + Send + 'static>;

/// Timer service keyed by task id.
///
/// Scheduling a task under an id that is already in use replaces the previous
/// task. Cancelling an unknown id is a no-op.
pub trait Scheduler: Send + Sync {
    /// Run `task` every `interval`, first firing one interval from now.
    fn every(&self, id: &str, interval: Duration, task: RepeatFn);

    /// Run `task` once after `delay`.
    fn after(&self, id: &str, delay: Duration, task: OnceFn);

    /// Cancel the task registered under `id`.
    fn cancel(&self, id: &str);

    /// Cancel every registered task.
    fn cancel_all(&self);
}
