//! Parse and load settings files.

use std::{fs, path::Path};

use tracing::debug;

use crate::{Error, Result, Settings};

/// Parse and validate settings from RON text.
pub fn from_ron_str(source: &str) -> Result<Settings> {
    load_from_str(source, None)
}

/// Parse and validate settings from RON text, attributing errors to `path`.
pub fn load_from_str(source: &str, path: Option<&Path>) -> Result<Settings> {
    let settings: Settings =
        ron::from_str(source).map_err(|e| Error::from_ron(source, path, &e))?;
    settings.check().map_err(|msg| Error::invalid(path, msg))?;
    Ok(settings)
}

/// Read, parse and validate the settings file at `path`.
pub fn load_from_path(path: &Path) -> Result<Settings> {
    let source = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    let settings = load_from_str(&source, Some(path))?;
    debug!(
        path = %path.display(),
        animations = settings.animations.len(),
        "settings_loaded"
    );
    Ok(settings)
}
