//! Transition history tracking.
//!
//! A machine built with history enabled appends one record per committed
//! transition, inside the same critical section that swaps the current
//! state, so the history and the current state always agree.

use super::key::StateKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use waypoint::core::StateTransition;
/// use waypoint::state_key;
///
/// state_key! {
///     enum Task {
///         Pending,
///         Running,
///     }
/// }
///
/// let transition = StateTransition {
///     from: Some(Task::Pending),
///     to: Task::Running,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.to, Task::Running);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<K: StateKey> {
    /// The state that was current, `None` for the first entry
    pub from: Option<K>,
    /// The state that became current
    pub to: K,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use waypoint::core::{StateHistory, StateTransition};
/// use waypoint::state_key;
///
/// state_key! {
///     enum Work {
///         Start,
///         Middle,
///         End,
///     }
/// }
///
/// let mut history = StateHistory::new();
/// history.record(StateTransition {
///     from: None,
///     to: Work::Start,
///     timestamp: Utc::now(),
/// });
/// history.record(StateTransition {
///     from: Some(Work::Start),
///     to: Work::Middle,
///     timestamp: Utc::now(),
/// });
/// history.record(StateTransition {
///     from: Some(Work::Middle),
///     to: Work::End,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![Work::Start, Work::Middle, Work::End]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateHistory<K: StateKey> {
    transitions: Vec<StateTransition<K>>,
}

impl<K: StateKey> Default for StateHistory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> StateHistory<K> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Append a transition.
    pub fn record(&mut self, transition: StateTransition<K>) {
        self.transitions.push(transition);
    }

    /// Get the path of states traversed.
    ///
    /// The `from` of the first record is included when present, followed
    /// by the `to` of every record.
    pub fn get_path(&self) -> Vec<K> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(from) = self.transitions.first().and_then(|t| t.from) {
            path.push(from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Time between the first and the last recorded transition.
    ///
    /// Returns `None` for an empty history.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.first()?, self.transitions.last()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// The most recent transition.
    pub fn last(&self) -> Option<&StateTransition<K>> {
        self.transitions.last()
    }

    /// All recorded transitions, oldest first.
    pub fn transitions(&self) -> &[StateTransition<K>] {
        &self.transitions
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
