use tracing::{debug, trace};

use crate::{Listener, ListenerState, Result};

/// Keeps the listener alive: restarts it after it has stopped and refreshes
/// the keep-alive it watches.
#[derive(Clone)]
pub struct Supervisor {
    /// Supervised listener.
    listener: Listener,
}

impl Supervisor {
    /// Supervise `listener`.
    pub fn new(listener: Listener) -> Self {
        Self { listener }
    }

    /// Start the listener if it is `Stopped`. Returns whether a start was
    /// attempted and succeeded; a listener that is running or still winding
    /// down is left alone.
    pub fn ensure_running(&self) -> Result<bool> {
        let state = self.listener.state();
        if state != ListenerState::Stopped {
            trace!(?state, "supervisor_listener_busy");
            return Ok(false);
        }
        debug!("supervisor_restarting_listener");
        self.listener.start()?;
        Ok(true)
    }

    /// Record a keep-alive for the listener.
    pub fn keep_alive(&self) {
        self.listener.refresh_keep_alive();
    }
}
