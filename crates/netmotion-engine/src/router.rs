//! Command routing: map an incoming command string onto a profile action.
//!
//! Rules are evaluated in order, each across all profiles in configured order:
//! 1. exact `command` match triggers the profile;
//! 2. exact `stop_command` match on a `PositionFree`/`SizeFree` profile freezes;
//! 3. `PositionFreeAll` profiles match by suffix: `<direction><command>`
//!    triggers in that direction, `<stop><command>` or `...<stop_command>`
//!    freezes.
//!
//! The first match wins. A `PositionFreeAll` suffix match whose prefix names
//! no direction is itself a match: it resolves to [`Route::BadDirection`] and
//! later profiles are not consulted. Empty command strings never match.

use crate::profile::{Direction, MotionProfile, VariationKind};

/// Resolved action for a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Trigger `profile`, first rewriting its direction when `Some`.
    Trigger {
        /// Index of the matched profile.
        profile: usize,
        /// Direction parsed from a `PositionFreeAll` prefix.
        direction: Option<Direction>,
    },
    /// Freeze the element in place.
    Freeze {
        /// Index of the profile whose stop command matched.
        profile: usize,
    },
    /// The suffix matched a `PositionFreeAll` profile but the prefix names no
    /// direction.
    BadDirection {
        /// Index of the matched profile.
        profile: usize,
        /// The unparsed prefix.
        token: String,
    },
    /// Nothing matched.
    Unmatched,
}

/// Match `command` against `profiles`.
pub fn resolve(command: &str, profiles: &[MotionProfile]) -> Route {
    if command.is_empty() {
        return Route::Unmatched;
    }

    if let Some(profile) = profiles
        .iter()
        .position(|p| !p.command.is_empty() && p.command == command)
    {
        return Route::Trigger {
            profile,
            direction: None,
        };
    }

    if let Some(profile) = profiles.iter().position(|p| {
        matches!(p.variation, VariationKind::PositionFree | VariationKind::SizeFree)
            && !p.stop_command.is_empty()
            && p.stop_command == command
    }) {
        return Route::Freeze { profile };
    }

    for (profile, p) in profiles.iter().enumerate() {
        if p.variation != VariationKind::PositionFreeAll {
            continue;
        }
        let stop = p.stop_command.as_str();
        if let Some(prefix) = strip_suffix_nonempty(command, &p.command) {
            if let Some(direction) = Direction::from_prefix(prefix) {
                return Route::Trigger {
                    profile,
                    direction: Some(direction),
                };
            }
            if !stop.is_empty() && prefix.ends_with(stop) {
                return Route::Freeze { profile };
            }
            return Route::BadDirection {
                profile,
                token: prefix.to_string(),
            };
        } else if strip_suffix_nonempty(command, stop).is_some() {
            return Route::Freeze { profile };
        }
    }

    Route::Unmatched
}

fn strip_suffix_nonempty<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() {
        None
    } else {
        text.strip_suffix(suffix)
    }
}
