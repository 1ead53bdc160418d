//! netmotion server
//!
//! Everything between the network and the engine:
//! - [`Listener`] receives one command per UDP datagram on its own thread and
//!   hands it to a [`CommandSink`] (the [`netmotion_engine::Engine`])
//! - [`Supervisor`] restarts the listener and feeds its keep-alive
//! - [`Scheduler`] abstracts named timers; [`Ticker`] runs them on tokio
//! - [`Runtime`] schedules the engine tick and supervision, and applies
//!   reconfiguration and shutdown
mod error;
mod listener;
mod runtime;
mod scheduler;
mod supervisor;
pub mod test_support;
mod ticker;

pub use error::{Error, Result};
pub use listener::{
    CommandSink, DATAGRAM_BUF, DEFAULT_KEEP_ALIVE_TIMEOUT, DEFAULT_RECV_TIMEOUT, Listener,
    ListenerConfig, ListenerState, decode_latin1,
};
pub use runtime::{
    DEFAULT_REARM_DELAY, DEFAULT_SUPERVISOR_INTERVAL, KEEP_ALIVE_TASK, REARM_TASK, Runtime,
    SUPERVISOR_TASK, TICK_TASK, Timings, keep_alive_interval, tick_interval,
};
pub use scheduler::{OnceFn, RepeatFn, Scheduler};
pub use supervisor::Supervisor;
pub use ticker::Ticker;
