//! Tokio-backed [`Scheduler`].
//!
//! Each task is a spawned future that sleeps, fires and loops until its
//! cancellation token trips. Cancellation never blocks the caller, so tasks may
//! cancel or reschedule each other from inside their own callbacks.

use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::scheduler::{OnceFn, RepeatFn, Scheduler};

/// Upper bound on how long [`Ticker::clear_async`] waits for each task.
pub const STOP_WAIT_TIMEOUT_MS: u64 = 50;

/// Registered task.
struct TickerEntry {
    /// Trips to end the task.
    token: CancellationToken,
    /// Spawned future driving the task.
    handle: JoinHandle<()>,
}

/// Scheduler that runs its tasks on a tokio runtime.
#[derive(Clone)]
pub struct Ticker {
    /// Runtime the tasks are spawned on.
    rt: Handle,
    /// Live tasks by id.
    entries: Arc<Mutex<HashMap<String, TickerEntry>>>,
}

impl Ticker {
    /// Create a ticker spawning onto `rt`. Tasks may be scheduled from any
    /// thread, including threads outside the runtime.
    pub fn new(rt: Handle) -> Self {
        Self {
            rt,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// True while a task registered under `id` has not finished.
    pub fn is_active(&self, id: &str) -> bool {
        self.entries
            .lock()
            .get(id)
            .is_some_and(|e| !e.handle.is_finished())
    }

    /// Cancel every task and wait briefly for each to wind down.
    pub async fn clear_async(&self) {
        let entries: Vec<TickerEntry> = {
            let mut map = self.entries.lock();
            map.drain().map(|(_, e)| e).collect()
        };
        for e in &entries {
            e.token.cancel();
        }
        for e in entries {
            let _ = time::timeout(Duration::from_millis(STOP_WAIT_TIMEOUT_MS), e.handle).await;
        }
        trace!("ticker_clear_async");
    }

    /// Register `handle` under `id`, replacing (and cancelling) any earlier task.
    fn insert(&self, id: &str, token: CancellationToken, handle: JoinHandle<()>) {
        let old = self
            .entries
            .lock()
            .insert(id.to_string(), TickerEntry { token, handle });
        if let Some(old) = old {
            old.token.cancel();
        }
    }
}

impl Scheduler for Ticker {
    fn every(&self, id: &str, interval: Duration, mut task: RepeatFn) {
        self.cancel(id);

        let token = CancellationToken::new();
        let cancel = token.clone();
        let id_for_log = id.to_string();
        let fut = async move {
            trace!("ticker_start" = %id_for_log, int_ms = interval.as_millis());

            tokio::select! {
                _ = time::sleep(interval) => {}
                _ = cancel.cancelled() => {
                    trace!("ticker_cancelled_initial" = %id_for_log);
                    return;
                }
            }

            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        trace!("ticker_cancelled" = %id_for_log);
                        return;
                    }
                    _ = ticker.tick() => {
                        task();
                    }
                }
            }
        };

        let handle = self.rt.spawn(fut);
        self.insert(id, token, handle);
    }

    fn after(&self, id: &str, delay: Duration, task: OnceFn) {
        self.cancel(id);

        let token = CancellationToken::new();
        let cancel = token.clone();
        let id_for_log = id.to_string();
        let fut = async move {
            tokio::select! {
                _ = time::sleep(delay) => {
                    trace!("ticker_fire_once" = %id_for_log);
                    task();
                }
                _ = cancel.cancelled() => {
                    trace!("ticker_cancelled_once" = %id_for_log);
                }
            }
        };

        let handle = self.rt.spawn(fut);
        self.insert(id, token, handle);
    }

    fn cancel(&self, id: &str) {
        if let Some(entry) = self.entries.lock().remove(id) {
            entry.token.cancel();
            trace!("ticker_stop" = %id);
        }
    }

    fn cancel_all(&self) {
        let entries: Vec<TickerEntry> = {
            let mut map = self.entries.lock();
            map.drain().map(|(_, e)| e).collect()
        };
        for e in &entries {
            e.token.cancel();
        }
        trace!("ticker_cancel_all" = entries.len());
    }
}
