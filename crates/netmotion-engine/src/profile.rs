//! Motion profile model: what a configured animation slot moves, how fast, and
//! which command strings start or stop it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::Vector2;

/// Distance projected along the direction of a free animation. Free motion
/// runs until a stop command arrives, so this only needs to be far off-screen.
pub const FREE_TRAVEL: f64 = 5000.0;

/// Which aspect of the element a profile animates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariationKind {
    /// Move to a fixed destination.
    #[default]
    Position,
    /// Resize to a fixed size.
    Size,
    /// Move and resize together.
    PositionAndSize,
    /// Open-ended motion along the profile's configured direction.
    PositionFree,
    /// Reserved. Declared by the settings model but has no trigger semantics.
    SizeFree,
    /// Open-ended motion whose direction is carried in the command prefix.
    PositionFreeAll,
}

impl VariationKind {
    /// True when the element's position is driven by this kind.
    pub fn animates_position(self) -> bool {
        matches!(
            self,
            Self::Position | Self::PositionAndSize | Self::PositionFree | Self::PositionFreeAll
        )
    }

    /// True when the element's size (scale) is driven by this kind.
    pub fn animates_size(self) -> bool {
        matches!(self, Self::Size | Self::PositionAndSize | Self::SizeFree)
    }

    /// Free kinds have no destination and stop only on a stop command.
    pub fn is_free(self) -> bool {
        matches!(self, Self::PositionFree | Self::SizeFree | Self::PositionFreeAll)
    }
}

impl fmt::Display for VariationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// How the effective speed of a positional motion is resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementPolicy {
    /// Use the configured speed as-is.
    Speed,
    /// Derive the speed from distance and duration.
    #[default]
    Duration,
    /// Whichever of the two is faster.
    Quickest,
}

/// Direction of a free animation, in screen coordinates (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward negative y.
    Up,
    /// Toward positive y.
    Down,
    /// Toward negative x.
    Left,
    /// Toward positive x.
    #[default]
    Right,
    /// Diagonal up and left.
    UpLeft,
    /// Diagonal up and right.
    UpRight,
    /// Diagonal down and left.
    DownLeft,
    /// Diagonal down and right.
    DownRight,
}

/// Wire tokens accepted for each direction, longest first so trailing-token
/// matching prefers `DownLeft` over `Left`.
const DIRECTION_TOKENS: &[(&str, Direction)] = &[
    ("Down_Right", Direction::DownRight),
    ("Down_Left", Direction::DownLeft),
    ("DownRight", Direction::DownRight),
    ("DownLeft", Direction::DownLeft),
    ("Up_Right", Direction::UpRight),
    ("Up_Left", Direction::UpLeft),
    ("UpRight", Direction::UpRight),
    ("UpLeft", Direction::UpLeft),
    ("Right", Direction::Right),
    ("Left", Direction::Left),
    ("Down", Direction::Down),
    ("Up", Direction::Up),
];

impl Direction {
    /// Parse an exact wire token (`Up`, `UpLeft`, `Up_Left`, ...). Case-sensitive.
    pub fn from_token(token: &str) -> Option<Self> {
        DIRECTION_TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, d)| *d)
    }

    /// Parse a command prefix. An exact token wins; otherwise the longest
    /// token the prefix ends with is used, so `MoveUp` resolves to `Up`.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::from_token(prefix).or_else(|| {
            DIRECTION_TOKENS
                .iter()
                .find(|(t, _)| prefix.ends_with(t))
                .map(|(_, d)| *d)
        })
    }

    /// Unit step on each axis (-1, 0 or 1).
    pub fn unit(self) -> Vector2 {
        let (x, y) = match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
            Self::UpLeft => (-1.0, -1.0),
            Self::UpRight => (1.0, -1.0),
            Self::DownLeft => (-1.0, 1.0),
            Self::DownRight => (1.0, 1.0),
        };
        Vector2::new(x, y)
    }

    /// Point `FREE_TRAVEL` units away from `from` along this direction. Cardinal
    /// directions keep the other axis fixed.
    pub fn project(self, from: Vector2) -> Vector2 {
        from + self.unit() * FREE_TRAVEL
    }
}

/// One configured animation slot. Profiles are identified by their index in
/// the configured list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionProfile {
    /// What the profile animates.
    pub variation: VariationKind,
    /// How positional speed is resolved.
    pub movement: MovementPolicy,
    /// Use `start_position`/`start_size` instead of the live element state.
    pub custom_start: bool,
    /// Position jumped to on trigger when `custom_start` is set.
    pub start_position: Vector2,
    /// Size jumped to on trigger when `custom_start` is set.
    pub start_size: Vector2,
    /// Target position for `Position` and `PositionAndSize`.
    pub destination: Vector2,
    /// Target rendered size for `Size` and `PositionAndSize`.
    pub destination_size: Vector2,
    /// Seconds. Zero means "arrive within one second of ticks".
    pub duration: u32,
    /// Pixels per second.
    pub speed: f64,
    /// Keep a resized element centered on its old center (pure `Size` only).
    pub change_size_in_place: bool,
    /// Heading of `PositionFree` motion. Rewritten by `PositionFreeAll`
    /// commands.
    pub direction: Direction,
    /// Command string that starts this profile.
    pub command: String,
    /// Command string that freezes free motion.
    pub stop_command: String,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            variation: VariationKind::Position,
            movement: MovementPolicy::Duration,
            custom_start: false,
            start_position: Vector2::ZERO,
            start_size: Vector2::ZERO,
            destination: Vector2::ZERO,
            destination_size: Vector2::ZERO,
            duration: 3,
            speed: 10.0,
            change_size_in_place: false,
            direction: Direction::Right,
            command: String::new(),
            stop_command: String::new(),
        }
    }
}

impl MotionProfile {
    /// Convenience constructor for a fixed-destination position profile.
    pub fn position(command: impl Into<String>, destination: Vector2, duration: u32) -> Self {
        Self {
            variation: VariationKind::Position,
            destination,
            duration,
            command: command.into(),
            ..Self::default()
        }
    }

    /// Convenience constructor for a free profile.
    pub fn free(
        variation: VariationKind,
        command: impl Into<String>,
        stop_command: impl Into<String>,
        speed: f64,
    ) -> Self {
        Self {
            variation,
            movement: MovementPolicy::Speed,
            speed,
            command: command.into(),
            stop_command: stop_command.into(),
            ..Self::default()
        }
    }
}
