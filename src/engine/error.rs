//! Run failures.

use crate::core::StateKey;
use thiserror::Error;

/// Errors that end a [`Machine::run`](crate::Machine::run).
///
/// Transitions committed before the failure stay in effect.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MachineError<K: StateKey> {
    #[error("Machine has no registered states and no start state was given")]
    Empty,

    #[error("State '{}' is not registered{}", .state.name(), origin(.from))]
    UnknownState { state: K, from: Option<K> },

    #[error("Transition from '{}' to '{}' is not allowed", label(.from), .to.name())]
    InvalidTransition { from: Option<K>, to: K },
}

impl<K: StateKey> MachineError<K> {
    /// The state the failed step was attempting to reach, if any.
    pub fn target(&self) -> Option<K> {
        match self {
            Self::Empty => None,
            Self::UnknownState { state, .. } => Some(*state),
            Self::InvalidTransition { to, .. } => Some(*to),
        }
    }
}

fn label<K: StateKey>(state: &Option<K>) -> String {
    state.as_ref().map_or_else(|| "<none>".to_string(), |s| s.name().to_string())
}

fn origin<K: StateKey>(from: &Option<K>) -> String {
    from.as_ref()
        .map(|s| format!(" (returned by '{}')", s.name()))
        .unwrap_or_default()
}
