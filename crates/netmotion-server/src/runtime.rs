//! Wires the engine, listener and supervisor onto a [`Scheduler`].

use std::{sync::Arc, time::Duration};

use netmotion_engine::{Engine, MotionProfile, TickOutcome};
use tracing::{debug, info, trace, warn};

use crate::{Listener, ListenerConfig, Scheduler, Supervisor};

/// Task id of the engine tick.
pub const TICK_TASK: &str = "tick";
/// Task id of the periodic listener restart check.
pub const SUPERVISOR_TASK: &str = "supervisor";
/// Task id of the periodic keep-alive refresh.
pub const KEEP_ALIVE_TASK: &str = "keep-alive";
/// Task id of the delayed tick re-arm after reconfiguration.
pub const REARM_TASK: &str = "rearm";

/// Default period of the listener restart check.
pub const DEFAULT_SUPERVISOR_INTERVAL: Duration = Duration::from_secs(10);
/// Default delay between a reconfiguration and the extra tick re-arm.
pub const DEFAULT_REARM_DELAY: Duration = Duration::from_secs(8);

/// Timer periods used by [`Runtime`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timings {
    /// Period of [`Supervisor::ensure_running`].
    pub supervisor_interval: Duration,
    /// Delay before the tick is re-armed once more after [`Runtime::reconfigure`].
    pub rearm_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            supervisor_interval: DEFAULT_SUPERVISOR_INTERVAL,
            rearm_delay: DEFAULT_REARM_DELAY,
        }
    }
}

/// Tick period for `rate` Hz, truncated to whole microseconds.
pub fn tick_interval(rate: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(rate.max(1)))
}

/// Keep-alive refresh period: one second inside the timeout, never below one
/// second.
pub fn keep_alive_interval(timeout: Duration) -> Duration {
    timeout
        .saturating_sub(Duration::from_secs(1))
        .max(Duration::from_secs(1))
}

/// Owns the scheduled tasks that drive the engine and keep the listener up.
pub struct Runtime {
    /// Animation engine.
    engine: Engine,
    /// Command listener.
    listener: Listener,
    /// Restarts the listener and feeds its keep-alive.
    supervisor: Supervisor,
    /// Timer service.
    scheduler: Arc<dyn Scheduler>,
    /// Timer periods.
    timings: Timings,
}

impl Runtime {
    /// Create a runtime. Nothing is scheduled until [`Runtime::install`].
    pub fn new(engine: Engine, listener: Listener, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_timings(engine, listener, scheduler, Timings::default())
    }

    /// Create a runtime with explicit timer periods.
    pub fn with_timings(
        engine: Engine,
        listener: Listener,
        scheduler: Arc<dyn Scheduler>,
        timings: Timings,
    ) -> Self {
        let supervisor = Supervisor::new(listener.clone());
        Self {
            engine,
            listener,
            supervisor,
            scheduler,
            timings,
        }
    }

    /// The engine being driven.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The supervised listener.
    pub fn listener(&self) -> &Listener {
        &self.listener
    }

    /// Start the listener and schedule the tick, supervisor and keep-alive
    /// tasks.
    pub fn install(&self) {
        supervise(&self.supervisor);
        schedule_tick(self.scheduler.as_ref(), &self.engine);

        let supervisor = self.supervisor.clone();
        self.scheduler.every(
            SUPERVISOR_TASK,
            self.timings.supervisor_interval,
            Box::new(move || supervise(&supervisor)),
        );
        self.schedule_keep_alive();
        info!(
            rate = self.engine.update_rate(),
            "runtime_installed"
        );
    }

    /// Apply new settings: replace the profiles and rate, stop the listener so
    /// the supervisor rebinds it with `listener_config`, reschedule the tick at
    /// the new rate and re-arm it once more after the re-arm delay. Motion in
    /// flight keeps going.
    pub fn reconfigure(
        &self,
        profiles: Vec<MotionProfile>,
        update_rate: u32,
        listener_config: ListenerConfig,
    ) {
        self.engine.set_profiles(profiles);
        self.engine.set_update_rate(update_rate);
        self.listener.set_config(listener_config);
        self.listener.stop();
        self.schedule_keep_alive();

        // Restart the tick at the new rate right away; the delayed re-arm
        // schedules it once more after the listener has settled.
        schedule_tick(self.scheduler.as_ref(), &self.engine);
        let scheduler = self.scheduler.clone();
        let engine = self.engine.clone();
        self.scheduler.after(
            REARM_TASK,
            self.timings.rearm_delay,
            Box::new(move || schedule_tick(scheduler.as_ref(), &engine)),
        );
        info!(
            delay_ms = self.timings.rearm_delay.as_millis(),
            "Settings applied, tick re-armed again after the delay"
        );
    }

    /// Cancel every task and force the listener down.
    pub fn shutdown(&self) {
        self.scheduler.cancel_all();
        self.listener.force_stop();
        info!("runtime_shutdown");
    }

    /// (Re)schedule the keep-alive refresh for the current listener timeout.
    fn schedule_keep_alive(&self) {
        let supervisor = self.supervisor.clone();
        let period = keep_alive_interval(self.listener.config().keep_alive_timeout);
        self.scheduler.every(
            KEEP_ALIVE_TASK,
            period,
            Box::new(move || supervisor.keep_alive()),
        );
    }
}

/// One supervisor pass. Failures are logged and retried on the next pass.
fn supervise(supervisor: &Supervisor) {
    if let Err(e) = supervisor.ensure_running() {
        warn!("Listener unavailable, retrying later: {}", e);
    }
}

/// Schedule the engine tick at the engine's current rate.
fn schedule_tick(scheduler: &dyn Scheduler, engine: &Engine) {
    let rate = engine.update_rate();
    let engine = engine.clone();
    scheduler.every(
        TICK_TASK,
        tick_interval(rate),
        Box::new(move || match engine.tick() {
            TickOutcome::Moved { position, .. } => {
                trace!(x = position.x, y = position.y, "tick_moved")
            }
            TickOutcome::Finished { position, .. } => {
                debug!(x = position.x, y = position.y, "tick_finished")
            }
            TickOutcome::Idle | TickOutcome::ElementMissing => {}
        }),
    );
    debug!(rate, "tick_scheduled");
}
