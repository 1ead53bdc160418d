//! `netmotion run`: the long-running daemon.
//!
//! The element being driven is an in-memory stand-in seeded from the settings
//! file; every move it receives is visible in the debug log.

use std::{path::Path, sync::Arc};

use config::Settings;
use netmotion_engine::{Engine, MemoryElement};
use netmotion_server::{Listener, ListenerConfig, Runtime, Ticker};
use tokio::{
    runtime::{Builder, Handle},
    signal, task,
};
use tracing::{info, warn};

use crate::{cli::RunArgs, error::Result};

/// Load settings and serve until interrupted.
pub fn run(args: &RunArgs) -> Result<()> {
    let path = config::resolve_config_path(args.config.as_deref())?;
    let settings = load(&path, args)?;

    let rt = Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(serve(&path, settings, args))
}

/// Read the settings file and apply command-line overrides.
fn load(path: &Path, args: &RunArgs) -> Result<Settings> {
    let mut settings = config::load_from_path(path)?;
    if let Some(address) = &args.address {
        settings.address.clone_from(address);
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    Ok(settings)
}

/// Listener settings derived from the settings file.
pub fn listener_config(settings: &Settings) -> ListenerConfig {
    ListenerConfig {
        address: settings.address.clone(),
        port: settings.port,
        keep_alive_timeout: settings.keep_alive_timeout(),
        ..ListenerConfig::default()
    }
}

/// Build the engine and runtime, then wait for signals.
async fn serve(path: &Path, settings: Settings, args: &RunArgs) -> Result<()> {
    let el = settings.element;
    let host = Arc::new(MemoryElement::new(el.position, el.scale, el.base));
    let engine = Engine::new(host, settings.profiles(), settings.update_rate_hz);
    let listener = Listener::new(listener_config(&settings), Arc::new(engine.clone()));
    let ticker = Ticker::new(Handle::current());
    let runtime = Runtime::new(engine, listener, Arc::new(ticker.clone()));

    runtime.install();
    info!(
        source = %settings.source,
        animations = settings.animations.len(),
        "netmotion running; Ctrl-C to stop"
    );

    let waited = wait_for_shutdown(&runtime, path, args).await;
    task::block_in_place(|| runtime.shutdown());
    ticker.clear_async().await;
    waited
}

/// Reload settings from disk and apply them. Invalid settings are reported and
/// the running configuration is kept.
fn reload(runtime: &Runtime, path: &Path, args: &RunArgs) {
    match load(path, args) {
        Ok(settings) => {
            info!("Reloading settings from {}", path.display());
            runtime.reconfigure(
                settings.profiles(),
                settings.update_rate_hz,
                listener_config(&settings),
            );
        }
        Err(e) => warn!("Keeping current settings: {}", e.pretty()),
    }
}

/// Block until Ctrl-C, reloading settings on SIGHUP.
#[cfg(unix)]
async fn wait_for_shutdown(runtime: &Runtime, path: &Path, args: &RunArgs) -> Result<()> {
    use tokio::signal::unix::{self, SignalKind};

    let mut hangup = unix::signal(SignalKind::hangup())?;
    loop {
        tokio::select! {
            res = signal::ctrl_c() => {
                res?;
                info!("Interrupted, shutting down");
                return Ok(());
            }
            _ = hangup.recv() => reload(runtime, path, args),
        }
    }
}

/// Block until Ctrl-C.
#[cfg(not(unix))]
async fn wait_for_shutdown(_runtime: &Runtime, _path: &Path, _args: &RunArgs) -> Result<()> {
    signal::ctrl_c().await?;
    info!("Interrupted, shutting down");
    Ok(())
}
