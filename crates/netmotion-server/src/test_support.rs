//! Helpers for driving the runtime deterministically in tests.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use parking_lot::Mutex;

use crate::scheduler::{OnceFn, RepeatFn, Scheduler};

/// A task registered with [`ManualScheduler`].
enum Task {
    /// Repeating task and its period.
    Every(Duration, RepeatFn),
    /// One-shot task and its delay.
    After(Duration, OnceFn),
}

/// Registered tasks plus the bookkeeping needed while one of them runs.
#[derive(Default)]
struct Tasks {
    /// Registered tasks by id.
    by_id: BTreeMap<String, Task>,
    /// Repeating tasks whose callback is running right now.
    firing: BTreeSet<String>,
    /// Running tasks cancelled from inside a callback.
    cancelled: BTreeSet<String>,
}

/// Scheduler that never fires on its own; tests call [`ManualScheduler::fire`].
#[derive(Default)]
pub struct ManualScheduler {
    /// Task table.
    tasks: Mutex<Tasks>,
}

impl ManualScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all registered tasks, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.tasks.lock().by_id.keys().cloned().collect()
    }

    /// Whether a task is registered under `id`.
    pub fn has(&self, id: &str) -> bool {
        self.tasks.lock().by_id.contains_key(id)
    }

    /// Period of the repeating task under `id`.
    pub fn interval(&self, id: &str) -> Option<Duration> {
        match self.tasks.lock().by_id.get(id) {
            Some(Task::Every(interval, _)) => Some(*interval),
            _ => None,
        }
    }

    /// Delay of the one-shot task under `id`.
    pub fn delay(&self, id: &str) -> Option<Duration> {
        match self.tasks.lock().by_id.get(id) {
            Some(Task::After(delay, _)) => Some(*delay),
            _ => None,
        }
    }

    /// Run the task under `id` once. One-shot tasks are removed; repeating
    /// tasks stay registered unless the callback replaced or cancelled them.
    /// Returns false when no task is registered.
    pub fn fire(&self, id: &str) -> bool {
        let task = {
            let mut tasks = self.tasks.lock();
            let Some(task) = tasks.by_id.remove(id) else {
                return false;
            };
            if matches!(task, Task::Every(..)) {
                tasks.firing.insert(id.to_string());
            }
            task
        };
        match task {
            Task::Every(interval, mut f) => {
                f();
                let mut tasks = self.tasks.lock();
                tasks.firing.remove(id);
                let cancelled = tasks.cancelled.remove(id);
                if !cancelled && !tasks.by_id.contains_key(id) {
                    tasks.by_id.insert(id.to_string(), Task::Every(interval, f));
                }
            }
            Task::After(_, f) => f(),
        }
        true
    }

    /// Fire the task under `id` `n` times.
    pub fn fire_n(&self, id: &str, n: usize) {
        for _ in 0..n {
            self.fire(id);
        }
    }

    /// Register `task` under `id`, lifting any cancellation made earlier in
    /// the same callback.
    fn register(&self, id: &str, task: Task) {
        let mut tasks = self.tasks.lock();
        tasks.cancelled.remove(id);
        tasks.by_id.insert(id.to_string(), task);
    }
}

impl Scheduler for ManualScheduler {
    fn every(&self, id: &str, interval: Duration, task: RepeatFn) {
        self.register(id, Task::Every(interval, task));
    }

    fn after(&self, id: &str, delay: Duration, task: OnceFn) {
        self.register(id, Task::After(delay, task));
    }

    fn cancel(&self, id: &str) {
        let mut tasks = self.tasks.lock();
        tasks.by_id.remove(id);
        if tasks.firing.contains(id) {
            tasks.cancelled.insert(id.to_string());
        }
    }

    fn cancel_all(&self) {
        let mut tasks = self.tasks.lock();
        tasks.by_id.clear();
        let firing = tasks.firing.clone();
        tasks.cancelled.extend(firing);
    }
}
