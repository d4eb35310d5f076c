//! Build errors for the machine builder.

use crate::core::StateKey;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BuildError<K: StateKey> {
    #[error("Initial state '{}' is not registered. Add it with .state() before .build()", .0.name())]
    UnknownInitialState(K),
}
