//! Force computation.
//!
//! A "force" here is a velocity in units per second. The integrator divides it
//! by the tick rate, so the values below are independent of how often the
//! scheduler ticks.

use crate::{geom::Vector2, profile::MovementPolicy};

/// Positional force toward a target together with the speed it resolved to.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearForce {
    /// Units per second along x/y.
    pub force: Vector2,
    /// Resolved scalar speed.
    pub speed: f64,
}

/// Resolve the effective speed for a move of `distance` units.
///
/// A zero duration yields a duration speed equal to the distance, so the
/// move takes one second of ticks.
pub fn resolve_speed(
    distance: f64,
    policy: MovementPolicy,
    configured_speed: f64,
    duration: u32,
) -> f64 {
    let duration_speed = if duration == 0 {
        distance
    } else {
        distance / f64::from(duration)
    };
    match policy {
        MovementPolicy::Speed => configured_speed,
        MovementPolicy::Duration => duration_speed,
        MovementPolicy::Quickest => configured_speed.max(duration_speed),
    }
}

/// Constant-speed straight-line force from `current` to `target`.
pub fn linear_force(
    current: Vector2,
    target: Vector2,
    policy: MovementPolicy,
    configured_speed: f64,
    duration: u32,
) -> LinearForce {
    let distance = current.distance(target);
    let speed = resolve_speed(distance, policy, configured_speed, duration);
    if distance == 0.0 {
        return LinearForce {
            force: Vector2::ZERO,
            speed,
        };
    }
    LinearForce {
        force: (target - current) * (speed / distance),
        speed,
    }
}

/// Linear interpolation force for scale over `duration` seconds.
pub fn scale_force(current: Vector2, target: Vector2, duration: u32) -> Vector2 {
    let delta = target - current;
    if duration == 0 {
        delta
    } else {
        delta / f64::from(duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn duration_policy_covers_distance_in_duration() {
        let f = linear_force(
            Vector2::new(0.0, 0.0),
            Vector2::new(300.0, 400.0),
            MovementPolicy::Duration,
            10.0,
            5,
        );
        assert!(approx(f.speed, 100.0));
        assert!(approx(f.force.x, 60.0));
        assert!(approx(f.force.y, 80.0));
    }

    #[test]
    fn speed_policy_ignores_duration() {
        let f = linear_force(
            Vector2::new(0.0, 0.0),
            Vector2::new(0.0, -500.0),
            MovementPolicy::Speed,
            25.0,
            1,
        );
        assert!(approx(f.speed, 25.0));
        assert!(approx(f.force.x, 0.0));
        assert!(approx(f.force.y, -25.0));
    }

    #[test]
    fn quickest_takes_the_larger_speed() {
        let from = Vector2::new(0.0, 0.0);
        let to = Vector2::new(100.0, 0.0);
        // Duration speed 10 < configured 40.
        let f = linear_force(from, to, MovementPolicy::Quickest, 40.0, 10);
        assert!(approx(f.speed, 40.0));
        assert!(approx(f.force.length(), 40.0));
        // Duration speed 50 > configured 40.
        let f = linear_force(from, to, MovementPolicy::Quickest, 40.0, 2);
        assert!(approx(f.speed, 50.0));
        assert!(approx(f.force.length(), 50.0));
    }

    #[test]
    fn force_is_collinear_with_delta() {
        let from = Vector2::new(12.0, -7.0);
        let to = Vector2::new(-230.0, 91.0);
        let f = linear_force(from, to, MovementPolicy::Speed, 33.0, 4);
        let d = to - from;
        // Cross product of force and delta vanishes; dot product is positive.
        assert!(approx(f.force.x * d.y - f.force.y * d.x, 0.0));
        assert!(f.force.x * d.x + f.force.y * d.y > 0.0);
        assert!(approx(f.force.length(), 33.0));
    }

    #[test]
    fn zero_distance_has_zero_force() {
        let p = Vector2::new(5.0, 5.0);
        let f = linear_force(p, p, MovementPolicy::Speed, 10.0, 0);
        assert_eq!(f.force, Vector2::ZERO);
    }

    #[test]
    fn zero_duration_uses_distance_as_speed() {
        assert!(approx(resolve_speed(250.0, MovementPolicy::Duration, 1.0, 0), 250.0));
    }

    #[test]
    fn scale_force_zero_duration_is_full_delta() {
        let f = scale_force(Vector2::new(1.0, 1.0), Vector2::new(0.5, 2.0), 0);
        assert_eq!(f, Vector2::new(-0.5, 1.0));
        let f = scale_force(Vector2::new(1.0, 1.0), Vector2::new(0.5, 2.0), 2);
        assert_eq!(f, Vector2::new(-0.25, 0.5));
    }
}
