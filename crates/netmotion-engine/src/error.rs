use std::result::Result as StdResult;

use thiserror::Error;

use crate::profile::VariationKind;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while triggering an animation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The variation kind is declared but has no trigger semantics.
    #[error("variation {0} is not supported")]
    UnsupportedVariation(VariationKind),

    /// The host could not find the controlled element.
    #[error("element unavailable in the current scene")]
    ElementUnavailable,

    /// A trigger referenced a profile index outside the configured list.
    #[error("no animation profile at index {0}")]
    NoSuchProfile(usize),
}
