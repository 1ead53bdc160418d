//! Live target state and the per-tick integrator.

use serde::Serialize;

use crate::geom::Vector2;

/// Live state of the controlled element and the motion currently in flight.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TargetState {
    /// Current position, always whole units while animating.
    pub pos: Vector2,
    /// Current rendered size.
    pub size: Vector2,
    /// Current scale.
    pub scale: Vector2,
    /// Position the motion ends on.
    pub target_pos: Vector2,
    /// Rendered size the motion ends on.
    pub target_size: Vector2,
    /// Scale the motion ends on.
    pub target_scale: Vector2,
    /// Fractional motion not yet applied; position moves in whole units.
    pub pos_remainder: Vector2,
    /// Units per second along x/y.
    pub force_pos: Vector2,
    /// Scale units per second along width/height.
    pub force_scale: Vector2,
    /// Effective speed resolved for the current motion.
    pub speed: f64,
    /// An animation is in flight.
    pub in_progress: bool,
}

/// Advance one quantized position channel. Returns the new value and remainder.
fn step_position(pos: f64, target: f64, force: f64, remainder: f64, rate: f64) -> (f64, f64) {
    let fraction = force / rate + remainder;
    let step = fraction.floor();
    let remainder = fraction - step;
    let next = pos + step;
    if (step > 0.0 && next > target) || (step < 0.0 && next < target) {
        (target, remainder)
    } else {
        (next, remainder)
    }
}

/// Advance one continuous scale channel.
fn step_scale(scale: f64, target: f64, force: f64, rate: f64) -> f64 {
    let delta = force / rate;
    let next = scale + delta;
    if (delta > 0.0 && next > target) || (delta < 0.0 && next < target) {
        target
    } else {
        next
    }
}

impl TargetState {
    /// True when position and scale both sit on their targets.
    pub fn at_target(&self) -> bool {
        self.pos == self.target_pos && self.scale == self.target_scale
    }

    /// Hold everything where it is: targets become the current values, forces
    /// are cleared and the motion ends.
    pub fn freeze(&mut self) {
        self.target_pos = self.pos;
        self.target_size = self.size;
        self.target_scale = self.scale;
        self.force_pos = Vector2::ZERO;
        self.force_scale = Vector2::ZERO;
        self.pos_remainder = Vector2::ZERO;
        self.in_progress = false;
    }

    /// Integrate one tick at `rate` ticks per second.
    ///
    /// Steps that would pass the target snap onto it, so coarse tick rates
    /// cannot oscillate around the destination. Clears `in_progress` when all
    /// four channels have arrived. No-op when nothing is in flight.
    pub fn integrate(&mut self, rate: f64) {
        if !self.in_progress {
            return;
        }

        if self.pos.x != self.target_pos.x {
            let (x, r) = step_position(
                self.pos.x,
                self.target_pos.x,
                self.force_pos.x,
                self.pos_remainder.x,
                rate,
            );
            self.pos.x = x;
            self.pos_remainder.x = r;
        }
        if self.pos.y != self.target_pos.y {
            let (y, r) = step_position(
                self.pos.y,
                self.target_pos.y,
                self.force_pos.y,
                self.pos_remainder.y,
                rate,
            );
            self.pos.y = y;
            self.pos_remainder.y = r;
        }
        if self.scale.x != self.target_scale.x {
            self.scale.x = step_scale(self.scale.x, self.target_scale.x, self.force_scale.x, rate);
        }
        if self.scale.y != self.target_scale.y {
            self.scale.y = step_scale(self.scale.y, self.target_scale.y, self.force_scale.y, rate);
        }

        if self.at_target() {
            self.in_progress = false;
        }
    }
}
