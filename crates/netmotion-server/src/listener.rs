//! UDP command listener.
//!
//! One datagram carries one command string. The receive loop runs on its own
//! thread with a current-thread tokio runtime so a slow host never stalls the
//! scheduler, and so cancellation can interrupt a blocked receive.
//!
//! The loop closes itself when no keep-alive has been recorded within the
//! configured timeout; the [`crate::Supervisor`] is expected to refresh the
//! keep-alive and restart the listener once it is back in `Stopped`.

use std::{
    net::{SocketAddr, UdpSocket as StdUdpSocket},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{Receiver, Sender, channel},
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use netmotion_engine::Engine;
use parking_lot::Mutex;
use tokio::{net::UdpSocket, runtime::Builder, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{Error, Result};

/// Largest datagram payload read per receive.
pub const DATAGRAM_BUF: usize = 1024;

/// Default receive timeout; bounds how long a quiet loop waits between
/// keep-alive checks.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Default keep-alive timeout.
pub const DEFAULT_KEEP_ALIVE_TIMEOUT: Duration = Duration::from_secs(8);

/// How long [`Listener::force_stop`] waits for the loop to acknowledge.
pub const STOP_WAIT_TIMEOUT_MS: u64 = 250;

/// Name of the receive-loop thread.
const THREAD_NAME: &str = "netmotion-listener";

/// Consumer of decoded command strings.
pub trait CommandSink: Send + Sync {
    /// Handle one non-empty command.
    fn dispatch(&self, command: &str);
}

impl CommandSink for Engine {
    fn dispatch(&self, command: &str) {
        self.route(command);
    }
}

/// Listener lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    /// No socket is bound.
    Stopped,
    /// A bind is in progress.
    Starting,
    /// The receive loop owns a bound socket.
    Running,
    /// Cancellation was requested; the loop has not exited yet.
    Stopping,
}

/// Network settings for the listener. Changes apply on the next start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Host name or IP to bind.
    pub address: String,
    /// UDP port to bind; 0 picks an ephemeral port.
    pub port: u16,
    /// The loop exits when no keep-alive arrives within this window.
    pub keep_alive_timeout: Duration,
    /// Maximum wait for a single datagram.
    pub recv_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 12345,
            keep_alive_timeout: DEFAULT_KEEP_ALIVE_TIMEOUT,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }
}

impl ListenerConfig {
    /// `address:port` as used in logs and bind errors.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// A running receive loop.
struct Session {
    /// Trips to end the loop.
    token: CancellationToken,
    /// Signalled once when the loop has exited and dropped its socket.
    done_rx: Receiver<()>,
    /// Loop thread.
    thread: JoinHandle<()>,
}

impl Session {
    /// Cancel the loop and wait up to [`STOP_WAIT_TIMEOUT_MS`] for it to exit.
    fn cancel_and_wait(self) {
        self.token.cancel();
        let acked = self
            .done_rx
            .recv_timeout(Duration::from_millis(STOP_WAIT_TIMEOUT_MS))
            .is_ok();
        if acked || self.thread.is_finished() {
            let _ = self.thread.join();
        } else {
            warn!("Listener thread did not stop within {}ms", STOP_WAIT_TIMEOUT_MS);
        }
    }
}

/// State shared between the control handle and the receive loop.
struct Shared {
    /// Network settings used by the next start.
    config: Mutex<ListenerConfig>,
    /// Current lifecycle state.
    state: Mutex<ListenerState>,
    /// When the keep-alive was last refreshed.
    last_keep_alive: Mutex<Instant>,
    /// Bound address while running.
    local_addr: Mutex<Option<SocketAddr>>,
    /// Live session; also serializes start and stop.
    session: Mutex<Option<Session>>,
    /// Bumped on every start and forced stop; a loop only publishes its exit
    /// while its generation is current.
    generation: AtomicU64,
    /// Receiver of decoded commands.
    sink: Arc<dyn CommandSink>,
}

impl Shared {
    /// Whether the keep-alive window has lapsed.
    fn keep_alive_expired(&self, timeout: Duration) -> bool {
        self.last_keep_alive.lock().elapsed() >= timeout
    }

    /// Record a loop exit. Stale loops leave the state alone.
    fn finish(&self, generation: u64) {
        if self.generation.load(Ordering::SeqCst) == generation {
            *self.state.lock() = ListenerState::Stopped;
            *self.local_addr.lock() = None;
        }
    }
}

/// Handle to the UDP listener. Clones share the same listener.
#[derive(Clone)]
pub struct Listener {
    /// Shared state.
    shared: Arc<Shared>,
}

impl Listener {
    /// Create a stopped listener that forwards commands to `sink`.
    pub fn new(config: ListenerConfig, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: Mutex::new(config),
                state: Mutex::new(ListenerState::Stopped),
                last_keep_alive: Mutex::new(Instant::now()),
                local_addr: Mutex::new(None),
                session: Mutex::new(None),
                generation: AtomicU64::new(0),
                sink,
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ListenerState {
        *self.shared.state.lock()
    }

    /// Address the socket is bound to while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        *self.shared.local_addr.lock()
    }

    /// Current network settings.
    pub fn config(&self) -> ListenerConfig {
        self.shared.config.lock().clone()
    }

    /// Replace the network settings. A running loop keeps its socket until it
    /// is restarted.
    pub fn set_config(&self, config: ListenerConfig) {
        *self.shared.config.lock() = config;
    }

    /// Record that the supervisor is alive.
    pub fn refresh_keep_alive(&self) {
        *self.shared.last_keep_alive.lock() = Instant::now();
    }

    /// Bind the configured endpoint and start the receive loop.
    ///
    /// A no-op while already running. On bind failure the listener stays
    /// `Stopped` and the error is returned.
    pub fn start(&self) -> Result<()> {
        let mut session = self.shared.session.lock();
        if matches!(
            self.state(),
            ListenerState::Running | ListenerState::Starting
        ) {
            return Ok(());
        }
        // A loop still winding down after `stop` holds the port.
        if let Some(old) = session.take() {
            old.cancel_and_wait();
        }

        self.set_state(ListenerState::Starting);
        let config = self.config();
        let socket = match bind(&config) {
            Ok(socket) => socket,
            Err(e) => {
                self.set_state(ListenerState::Stopped);
                warn!("{}", e);
                return Err(e);
            }
        };
        let local = socket.local_addr().ok();

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let (done_tx, done_rx) = channel::<()>();
        *self.shared.local_addr.lock() = local;
        self.refresh_keep_alive();
        self.set_state(ListenerState::Running);

        let shared = self.shared.clone();
        let cancel = token.clone();
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run_loop(&shared, socket, &cancel, generation, &config, &done_tx));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.set_state(ListenerState::Stopped);
                *self.shared.local_addr.lock() = None;
                error!("Failed to spawn listener thread: {}", e);
                return Err(Error::Runtime(e));
            }
        };

        *session = Some(Session {
            token,
            done_rx,
            thread,
        });
        match local {
            Some(addr) => info!("Listening for commands on {}", addr),
            None => info!("Listening for commands on {}", self.config().endpoint()),
        }
        Ok(())
    }

    /// Ask the loop to exit without waiting for it. The state reaches
    /// `Stopped` once the loop has released its socket.
    pub fn stop(&self) {
        let session = self.shared.session.lock();
        if let Some(s) = session.as_ref() {
            {
                // Checked and set under one lock so an exiting loop cannot
                // leave the state stuck in `Stopping`.
                let mut state = self.shared.state.lock();
                if *state == ListenerState::Running {
                    *state = ListenerState::Stopping;
                }
            }
            s.token.cancel();
            debug!("listener_stop_requested");
        }
    }

    /// Cancel the loop, wait briefly for it to exit and mark the listener
    /// `Stopped`. Used on shutdown.
    pub fn force_stop(&self) {
        let session = self.shared.session.lock().take();
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(s) = session {
            self.set_state(ListenerState::Stopping);
            s.cancel_and_wait();
        }
        self.set_state(ListenerState::Stopped);
        *self.shared.local_addr.lock() = None;
        debug!("listener_force_stopped");
    }

    /// Set the lifecycle state.
    fn set_state(&self, state: ListenerState) {
        *self.shared.state.lock() = state;
    }
}

/// Bind a UDP socket on the configured endpoint, ready for tokio.
fn bind(config: &ListenerConfig) -> Result<StdUdpSocket> {
    let bind_err = |source| Error::Bind {
        addr: config.endpoint(),
        source,
    };
    let socket = StdUdpSocket::bind((config.address.as_str(), config.port)).map_err(bind_err)?;
    socket.set_nonblocking(true)?;
    Ok(socket)
}

/// Decode a datagram payload. Every byte maps to the code point of equal
/// value, so arbitrary input never fails to decode.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Body of the listener thread.
fn run_loop(
    shared: &Shared,
    socket: StdUdpSocket,
    cancel: &CancellationToken,
    generation: u64,
    config: &ListenerConfig,
    done_tx: &Sender<()>,
) {
    match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt.block_on(receive(shared, socket, cancel, config)),
        Err(e) => error!("Failed to build listener runtime: {}", e),
    }
    shared.finish(generation);
    let _ = done_tx.send(());
    trace!("listener_loop_exit" = generation);
}

/// Receive datagrams until cancelled, the socket fails or the keep-alive lapses.
async fn receive(
    shared: &Shared,
    socket: StdUdpSocket,
    cancel: &CancellationToken,
    config: &ListenerConfig,
) {
    let socket = match UdpSocket::from_std(socket) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to register listener socket: {}", e);
            return;
        }
    };
    let mut buf = [0u8; DATAGRAM_BUF];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                trace!("listener_cancelled");
                return;
            }
            res = time::timeout(config.recv_timeout, socket.recv_from(&mut buf)) => match res {
                Err(_) => trace!("listener_recv_timeout"),
                Ok(Ok((n, peer))) => {
                    let command = decode_latin1(&buf[..n]);
                    if !command.is_empty() {
                        trace!(peer = %peer, command = %command, "listener_datagram");
                        shared.sink.dispatch(&command);
                    }
                }
                Ok(Err(e)) => {
                    warn!("Listener socket failed: {}", e);
                    return;
                }
            }
        }
        if shared.keep_alive_expired(config.keep_alive_timeout) {
            info!(
                "No keep-alive within {}s, closing listener",
                config.keep_alive_timeout.as_secs()
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_maps_bytes_to_code_points() {
        assert_eq!(decode_latin1(b"MoveUp"), "MoveUp");
        assert_eq!(decode_latin1(&[0x47, 0xE9, 0xFF]), "G\u{e9}\u{ff}");
        assert_eq!(decode_latin1(&[]), "");
    }

    #[test]
    fn endpoint_formats_address_and_port() {
        let config = ListenerConfig::default();
        assert_eq!(config.endpoint(), "localhost:12345");
    }
}
