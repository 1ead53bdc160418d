//! `netmotion check`: validate a settings file.

use std::io::{self, Write};

use crate::{cli::CheckArgs, error::Result};

/// Load and validate the settings file, optionally dumping the profiles.
pub fn run(args: &CheckArgs) -> Result<()> {
    let path = config::resolve_config_path(args.path.as_deref())?;
    let settings = config::load_from_path(&path)?;

    let mut out = io::stdout().lock();
    if args.dump {
        serde_json::to_writer_pretty(&mut out, &settings.profiles())?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "{}: ok ({} animations, {}:{}, {} Hz)",
            path.display(),
            settings.animations.len(),
            settings.address,
            settings.port,
            settings.update_rate_hz
        )?;
    }
    Ok(())
}
