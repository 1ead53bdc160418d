//! On-disk settings model.

use std::time::Duration;

use netmotion_engine::{MotionProfile, Vector2};
use serde::{Deserialize, Serialize};

/// Most animation slots a settings file may declare.
pub const MAX_ANIMATIONS: usize = 25;
/// Highest accepted tick rate.
pub const MAX_UPDATE_RATE_HZ: u32 = 1000;
/// Smallest accepted keep-alive timeout. The refresh runs one second inside
/// the timeout, so anything lower leaves no room for it.
pub const MIN_KEEP_ALIVE_SECS: u64 = 2;

/// Initial state of the simulated element driven by the daemon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementSettings {
    /// Top-left corner.
    pub position: Vector2,
    /// Scale factors.
    pub scale: Vector2,
    /// Unscaled width and height.
    pub base: Vector2,
}

impl Default for ElementSettings {
    fn default() -> Self {
        Self {
            position: Vector2::ZERO,
            scale: Vector2::new(1.0, 1.0),
            base: Vector2::new(1920.0, 1080.0),
        }
    }
}

/// Complete settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Host name or IP the listener binds.
    pub address: String,
    /// UDP port the listener binds.
    pub port: u16,
    /// Name of the element being animated.
    pub source: String,
    /// Ticks per second.
    pub update_rate_hz: u32,
    /// Listener closes when not refreshed within this many seconds.
    pub keep_alive_timeout_secs: u64,
    /// Simulated element.
    pub element: ElementSettings,
    /// Animation slots, addressed by index.
    pub animations: Vec<MotionProfile>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 12345,
            source: String::new(),
            update_rate_hz: netmotion_engine::DEFAULT_UPDATE_RATE,
            keep_alive_timeout_secs: 8,
            element: ElementSettings::default(),
            animations: vec![MotionProfile::default()],
        }
    }
}

impl Settings {
    /// Profiles in configured order, as consumed by the engine.
    pub fn profiles(&self) -> Vec<MotionProfile> {
        self.animations.clone()
    }

    /// Keep-alive timeout as a duration.
    pub fn keep_alive_timeout(&self) -> Duration {
        Duration::from_secs(self.keep_alive_timeout_secs)
    }

    /// Check ranges the type system cannot express. Returns the first problem.
    pub(crate) fn check(&self) -> Result<(), String> {
        let n = self.animations.len();
        if n == 0 || n > MAX_ANIMATIONS {
            return Err(format!(
                "animations: expected 1 to {} entries, found {}",
                MAX_ANIMATIONS, n
            ));
        }
        for (i, p) in self.animations.iter().enumerate() {
            if p.speed.is_nan() || p.speed <= 0.0 {
                return Err(format!("animations[{}].speed must be > 0, got {}", i, p.speed));
            }
            let points = [
                p.start_position,
                p.start_size,
                p.destination,
                p.destination_size,
            ];
            if !points.iter().all(|v| v.is_finite()) {
                return Err(format!("animations[{}] has a non-finite coordinate", i));
            }
        }
        if !(1..=MAX_UPDATE_RATE_HZ).contains(&self.update_rate_hz) {
            return Err(format!(
                "update_rate_hz must be within 1..={}, got {}",
                MAX_UPDATE_RATE_HZ, self.update_rate_hz
            ));
        }
        if self.keep_alive_timeout_secs < MIN_KEEP_ALIVE_SECS {
            return Err(format!(
                "keep_alive_timeout_secs must be at least {}, got {}",
                MIN_KEEP_ALIVE_SECS, self.keep_alive_timeout_secs
            ));
        }
        if self.address.trim().is_empty() {
            return Err("address must not be empty".to_string());
        }
        Ok(())
    }
}
