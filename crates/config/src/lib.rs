//! Settings for the netmotion daemon: RON model, defaults, validation.
use std::path::{Path, PathBuf};

mod error;
mod loader;
mod settings;

#[cfg(test)]
mod test_parse;

pub use error::{Error, Result, excerpt_at};
pub use loader::{from_ron_str, load_from_path, load_from_str};
pub use settings::{
    ElementSettings, MAX_ANIMATIONS, MAX_UPDATE_RATE_HZ, MIN_KEEP_ALIVE_SECS, Settings,
};

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "netmotion.ron";

/// Resolve the effective settings path.
///
/// Policy:
/// 1) Use `explicit` when provided.
/// 2) Else use `./netmotion.ron` when it exists.
/// 3) Else return a clear "no config found" error.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let preferred = PathBuf::from(DEFAULT_CONFIG_FILE);
    if preferred.exists() {
        return Ok(preferred);
    }

    Err(Error::Read {
        path: Some(preferred),
        message: format!(
            "No config found. Create ./{} or pass --config",
            DEFAULT_CONFIG_FILE
        ),
    })
}
