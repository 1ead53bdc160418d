//! netmotion engine
//!
//! The engine decides where a host-owned visual element should be on every
//! scheduler tick:
//! - holds the configured [`MotionProfile`] list and the live [`TargetState`]
//! - routes command strings to profiles ([`Engine::route`])
//! - computes per-axis forces when an animation is triggered
//! - integrates position (whole units with a carried remainder) and scale
//!   toward their targets on [`Engine::tick`]
//!
//! Profiles and target state sit behind one mutex, so commands arriving on a
//! listener thread and ticks from the scheduler never interleave mid-update.
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

mod error;
pub mod force;
pub mod geom;
pub mod host;
pub mod profile;
pub mod router;
mod target;

pub use error::{Error, Result};
pub use geom::Vector2;
pub use host::{ElementState, HostElement, MemoryElement};
pub use profile::{Direction, MotionProfile, MovementPolicy, VariationKind};
pub use router::Route;
pub use target::TargetState;

use force::{linear_force, scale_force};
use host::{scale_for_size, size_for_scale};

/// Default scheduler tick rate in Hz.
pub const DEFAULT_UPDATE_RATE: u32 = 60;

/// What [`Engine::route`] did with a command.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// An animation was started for the profile.
    Triggered {
        /// Index of the matched profile.
        profile: usize,
    },
    /// Motion was frozen in place by the profile's stop command.
    Frozen {
        /// Index of the profile whose stop command matched.
        profile: usize,
    },
    /// The profile matched but the animation could not start.
    Failed {
        /// Index of the matched profile.
        profile: usize,
        /// Why the trigger was refused.
        error: Error,
    },
    /// A `PositionFreeAll` suffix matched but the prefix names no direction.
    UnparsableDirection {
        /// Index of the profile whose suffix matched.
        profile: usize,
        /// The prefix that failed to parse.
        token: String,
    },
    /// No profile matched. Unknown input is ignored.
    Unroutable,
}

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The host could not find the element; nothing changed.
    ElementMissing,
    /// No animation in flight; state was refreshed from the host only.
    Idle,
    /// The element moved and the animation continues.
    Moved {
        /// Position written to the host.
        position: Vector2,
        /// Scale written to the host.
        scale: Vector2,
    },
    /// The element reached its target on this tick.
    Finished {
        /// Final position.
        position: Vector2,
        /// Final scale.
        scale: Vector2,
    },
}

struct EngineState {
    target: TargetState,
    profiles: Vec<MotionProfile>,
    update_rate: u32,
}

/// Animation engine shared between the scheduler and the command listener.
///
/// Cloning is cheap; clones share the same state and host.
#[derive(Clone)]
pub struct Engine {
    state: Arc<Mutex<EngineState>>,
    host: Arc<dyn HostElement>,
}

impl Engine {
    /// Create an engine driving `host` with the given profiles.
    pub fn new(host: Arc<dyn HostElement>, profiles: Vec<MotionProfile>, update_rate: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState {
                target: TargetState::default(),
                profiles,
                update_rate: update_rate.max(1),
            })),
            host,
        }
    }

    /// Replace the profile list. An animation already in flight continues.
    pub fn set_profiles(&self, profiles: Vec<MotionProfile>) {
        debug!(count = profiles.len(), "profiles_replaced");
        self.state.lock().profiles = profiles;
    }

    /// Snapshot of the configured profiles.
    pub fn profiles(&self) -> Vec<MotionProfile> {
        self.state.lock().profiles.clone()
    }

    /// Set the tick rate the scheduler will call [`Engine::tick`] at.
    pub fn set_update_rate(&self, hz: u32) {
        self.state.lock().update_rate = hz.max(1);
    }

    /// Current tick rate in Hz.
    pub fn update_rate(&self) -> u32 {
        self.state.lock().update_rate
    }

    /// Copy of the current target state.
    pub fn snapshot(&self) -> TargetState {
        self.state.lock().target.clone()
    }

    /// True while an animation is in flight.
    pub fn is_animating(&self) -> bool {
        self.state.lock().target.in_progress
    }

    /// Start the animation of the profile at `index` (UI-initiated trigger).
    pub fn trigger(&self, index: usize) -> Result<()> {
        let mut st = self.state.lock();
        self.trigger_locked(&mut st, index)
    }

    /// Stop any motion and hold the element where it currently is.
    pub fn freeze(&self) {
        let mut st = self.state.lock();
        self.freeze_locked(&mut st);
    }

    /// Copy the element's current position and rendered size into the
    /// destination of the profile at `index`.
    pub fn capture_destination(&self, index: usize) -> Result<()> {
        let mut st = self.state.lock();
        let profile = st
            .profiles
            .get_mut(index)
            .ok_or(Error::NoSuchProfile(index))?;
        let el = self.host.element().ok_or(Error::ElementUnavailable)?;
        profile.destination = el.position;
        profile.destination_size = el.size();
        debug!(
            profile = index,
            x = el.position.x,
            y = el.position.y,
            w = profile.destination_size.x,
            h = profile.destination_size.y,
            "destination_captured"
        );
        Ok(())
    }

    /// Route a command string to the matching profile and act on it.
    pub fn route(&self, command: &str) -> RouteOutcome {
        let mut st = self.state.lock();
        let outcome = match router::resolve(command, &st.profiles) {
            Route::Trigger { profile, direction } => {
                if let Some(direction) = direction {
                    st.profiles[profile].direction = direction;
                }
                match self.trigger_locked(&mut st, profile) {
                    Ok(()) => RouteOutcome::Triggered { profile },
                    Err(error) => RouteOutcome::Failed { profile, error },
                }
            }
            Route::Freeze { profile } => {
                self.freeze_locked(&mut st);
                RouteOutcome::Frozen { profile }
            }
            Route::BadDirection { profile, token } => {
                RouteOutcome::UnparsableDirection { profile, token }
            }
            Route::Unmatched => RouteOutcome::Unroutable,
        };
        drop(st);

        match &outcome {
            RouteOutcome::Triggered { profile } => {
                debug!("route_triggered" = %command, profile)
            }
            RouteOutcome::Frozen { profile } => debug!("route_frozen" = %command, profile),
            RouteOutcome::Failed { profile, error } => {
                warn!("route_failed" = %command, profile, error = %error)
            }
            RouteOutcome::UnparsableDirection { profile, token } => {
                debug!("route_bad_direction" = %command, profile, token = %token)
            }
            RouteOutcome::Unroutable => trace!("route_unmatched" = %command),
        }
        outcome
    }

    /// Advance the in-flight animation by one tick and write the result back
    /// to the host. Always refreshes position/scale from the host first so
    /// external edits are picked up.
    pub fn tick(&self) -> TickOutcome {
        let mut st = self.state.lock();
        let rate = f64::from(st.update_rate);
        let Some(el) = self.host.element() else {
            trace!("tick_element_missing");
            return TickOutcome::ElementMissing;
        };

        let t = &mut st.target;
        t.pos = el.position;
        t.scale = el.scale;
        t.size = el.size();
        if !t.in_progress {
            return TickOutcome::Idle;
        }

        t.integrate(rate);
        t.size = size_for_scale(el.base, t.scale);
        self.host.set_position(t.pos);
        self.host.set_scale(t.scale);

        if t.in_progress {
            TickOutcome::Moved {
                position: t.pos,
                scale: t.scale,
            }
        } else {
            debug!(x = t.pos.x, y = t.pos.y, "animation_finished");
            TickOutcome::Finished {
                position: t.pos,
                scale: t.scale,
            }
        }
    }

    fn freeze_locked(&self, st: &mut EngineState) {
        if let Some(el) = self.host.element() {
            st.target.pos = el.position;
            st.target.scale = el.scale;
            st.target.size = el.size();
        }
        st.target.freeze();
    }

    fn trigger_locked(&self, st: &mut EngineState, index: usize) -> Result<()> {
        let profile = st
            .profiles
            .get(index)
            .cloned()
            .ok_or(Error::NoSuchProfile(index))?;
        if profile.variation == VariationKind::SizeFree {
            return Err(Error::UnsupportedVariation(profile.variation));
        }
        let el = self.host.element().ok_or(Error::ElementUnavailable)?;

        let mut position = el.position;
        let mut scale = el.scale;
        if profile.custom_start && !profile.variation.is_free() {
            if profile.variation.animates_position() {
                position = profile.start_position;
                self.host.set_position(position);
            }
            if profile.variation.animates_size() {
                scale = scale_for_size(el.base, profile.start_size, scale);
                self.host.set_scale(scale);
            }
        }
        let size = size_for_scale(el.base, scale);

        let t = &mut st.target;
        t.pos = position;
        t.size = size;
        t.scale = scale;
        t.target_pos = position;
        t.target_size = size;
        t.target_scale = scale;
        t.pos_remainder = Vector2::ZERO;
        t.force_pos = Vector2::ZERO;
        t.force_scale = Vector2::ZERO;
        t.speed = profile.speed;

        match profile.variation {
            VariationKind::Position => {
                t.target_pos = profile.destination;
                let lf = linear_force(
                    t.pos,
                    t.target_pos,
                    profile.movement,
                    profile.speed,
                    profile.duration,
                );
                t.force_pos = lf.force;
                t.speed = lf.speed;
            }
            VariationKind::PositionFree | VariationKind::PositionFreeAll => {
                t.target_pos = profile.direction.project(position);
                let lf = linear_force(
                    t.pos,
                    t.target_pos,
                    profile.movement,
                    profile.speed,
                    profile.duration,
                );
                t.force_pos = lf.force;
                t.speed = lf.speed;
            }
            VariationKind::Size | VariationKind::PositionAndSize => {
                let both = profile.variation == VariationKind::PositionAndSize;
                t.target_size = profile.destination_size;
                t.target_scale = scale_for_size(el.base, profile.destination_size, scale);
                if both {
                    t.target_pos = profile.destination;
                } else if profile.change_size_in_place {
                    t.target_pos = position - ((t.target_size - size) / 2.0).floor();
                }
                if both || profile.change_size_in_place {
                    // Position follows the resize so both arrive together.
                    let lf = linear_force(
                        t.pos,
                        t.target_pos,
                        MovementPolicy::Duration,
                        profile.speed,
                        profile.duration,
                    );
                    t.force_pos = lf.force;
                    t.speed = lf.speed;
                }
                t.force_scale = scale_force(t.scale, t.target_scale, profile.duration);
            }
            VariationKind::SizeFree => {
                return Err(Error::UnsupportedVariation(profile.variation));
            }
        }
        t.in_progress = !t.at_target();

        debug!(
            profile = index,
            variation = %profile.variation,
            tx = t.target_pos.x,
            ty = t.target_pos.y,
            fx = t.force_pos.x,
            fy = t.force_pos.y,
            "animation_triggered"
        );
        Ok(())
    }
}
