//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::core::{State, StateKey};
use crate::engine::Machine;
use std::sync::Arc;

/// Builder for constructing machines with a fluent API.
pub struct MachineBuilder<K: StateKey> {
    states: Vec<Arc<dyn State<K>>>,
    initial: Option<K>,
    record_history: bool,
}

impl<K: StateKey> MachineBuilder<K> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            initial: None,
            record_history: false,
        }
    }

    /// Register a state owned by the machine.
    pub fn state<S>(self, state: S) -> Self
    where
        S: State<K> + 'static,
    {
        self.shared(Arc::new(state))
    }

    /// Register a state the host keeps a handle to.
    pub fn shared(mut self, state: Arc<dyn State<K>>) -> Self {
        self.states.push(state);
        self
    }

    /// Register multiple shared states at once.
    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn State<K>>>,
    {
        self.states.extend(states);
        self
    }

    /// Set the state `run(None)` starts from.
    ///
    /// Defaults to the first registered state.
    pub fn initial(mut self, id: K) -> Self {
        self.initial = Some(id);
        self
    }

    /// Record every committed transition in the machine's history.
    pub fn record_history(mut self, enabled: bool) -> Self {
        self.record_history = enabled;
        self
    }

    /// Build the machine.
    /// Returns an error if the initial state is not registered.
    pub fn build(self) -> Result<Arc<Machine<K>>, BuildError<K>> {
        if let Some(initial) = self.initial {
            if !self.states.iter().any(|s| s.id() == initial) {
                return Err(BuildError::UnknownInitialState(initial));
            }
        }

        Ok(Machine::assemble(
            self.states,
            self.initial,
            self.record_history,
        ))
    }
}

impl<K: StateKey> Default for MachineBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}
