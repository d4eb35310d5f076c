//! State machine that sequences registered states.

use crate::core::{State, StateHistory, StateKey, StateTransition};
use crate::engine::error::MachineError;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

type StateRef<K> = Arc<dyn State<K>>;

/// Current state plus the optional history, guarded together so a reader
/// never sees one updated without the other.
struct Cursor<K: StateKey> {
    current: Option<StateRef<K>>,
    history: Option<StateHistory<K>>,
}

/// Registry of states plus the state currently active.
///
/// Machines are always handed out in an [`Arc`]: states embedding a
/// [`BaseState`](crate::core::BaseState) keep a weak link to it, and hosts
/// typically share one machine across threads.
///
/// The current state changes only through [`enter`](Machine::enter) and
/// [`run`](Machine::run). Reads take a shared lock; a transition holds the
/// exclusive lock only while swapping the current state, never while a
/// hook or a state's work runs, so states may call back into the machine.
pub struct Machine<K: StateKey> {
    states: HashMap<K, StateRef<K>>,
    initial: Option<K>,
    cursor: RwLock<Cursor<K>>,
}

impl<K: StateKey> Machine<K> {
    /// Create a machine from a set of states.
    ///
    /// States are keyed by [`State::id`]; a later state with the same key
    /// replaces an earlier one. The first state given is the implicit
    /// start of [`run`](Machine::run). Each registered state embedding a
    /// [`BaseState`](crate::core::BaseState) is attached to this machine;
    /// an instance replaced by a later registration stays unattached.
    pub fn new<I>(states: I) -> Arc<Self>
    where
        I: IntoIterator<Item = StateRef<K>>,
    {
        Self::assemble(states.into_iter().collect(), None, false)
    }

    pub(crate) fn assemble(
        states: Vec<StateRef<K>>,
        initial: Option<K>,
        record_history: bool,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let initial = initial.or_else(|| states.first().map(|s| s.id()));
            let mut registry = HashMap::with_capacity(states.len());

            for state in states {
                let id = state.id();
                if registry.insert(id, state).is_some() {
                    tracing::trace!(state = id.name(), "Replaced registered state");
                }
            }

            // Only instances that survived replacement are attached.
            for (id, state) in &registry {
                if let Some(base) = state.base() {
                    if !base.attach(weak) {
                        tracing::debug!(
                            state = id.name(),
                            "State is already owned by another machine"
                        );
                    }
                }
            }

            Self {
                states: registry,
                initial,
                cursor: RwLock::new(Cursor {
                    current: None,
                    history: record_history.then(StateHistory::new),
                }),
            }
        })
    }

    /// Look up a registered state by key.
    pub fn state(&self, id: K) -> Option<StateRef<K>> {
        self.states.get(&id).cloned()
    }

    /// Whether a state is registered under `id`.
    pub fn contains(&self, id: K) -> bool {
        self.states.contains_key(&id)
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no states are registered.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The state [`run`](Machine::run) starts from when given no start.
    pub fn initial(&self) -> Option<K> {
        self.initial
    }

    /// The active state, or `None` before the first successful transition.
    pub fn current_state(&self) -> Option<StateRef<K>> {
        self.cursor.read().current.clone()
    }

    /// Key of the active state.
    pub fn current_id(&self) -> Option<K> {
        self.cursor.read().current.as_ref().map(|s| s.id())
    }

    /// Snapshot of the recorded transitions.
    ///
    /// Empty unless the machine was built with history recording enabled.
    pub fn history(&self) -> StateHistory<K> {
        self.cursor.read().history.clone().unwrap_or_default()
    }

    /// Whether the state registered under `id` may become current.
    ///
    /// False when nothing is registered under `id` or the registered state
    /// is owned by another machine. Otherwise true when there is no current
    /// state, and up to the current state's
    /// [`is_valid_next_state`](State::is_valid_next_state) when there is.
    pub fn can_enter(&self, id: K) -> bool {
        self.resolve_enterable(id).is_some()
    }

    fn resolve_enterable(&self, id: K) -> Option<StateRef<K>> {
        let candidate = self.states.get(&id)?;
        if !self.owns(candidate.as_ref()) {
            return None;
        }

        let current = self.current_state();
        let allowed = current
            .as_ref()
            .is_none_or(|current| current.is_valid_next_state(candidate.as_ref()));

        allowed.then(|| Arc::clone(candidate))
    }

    fn owns(&self, state: &dyn State<K>) -> bool {
        state.base().is_none_or(|base| base.is_owned_by(self))
    }

    /// Perform a single transition to the state registered under `id`.
    ///
    /// Returns false, with no effect, when [`can_enter`](Machine::can_enter)
    /// is false. Otherwise calls the current state's
    /// [`will_exit`](State::will_exit) while it is still current, swaps the
    /// current state, then calls the new state's
    /// [`did_enter`](State::did_enter). The new state's work is not run.
    pub fn enter(&self, id: K) -> bool {
        let Some(next) = self.resolve_enterable(id) else {
            tracing::debug!(to = id.name(), "Rejected transition");
            return false;
        };

        if let Some(current) = self.current_state() {
            current.will_exit(Some(next.as_ref()));
        }

        let previous = self.swap(&next);
        next.did_enter(previous.as_deref());
        true
    }

    /// Drive the machine until a state's work yields no next state.
    ///
    /// Starts from `start`, or from [`initial`](Machine::initial) when
    /// `start` is `None`. Each hop validates the target against the current
    /// state, makes it current, calls `did_enter(previous)`, runs
    /// `process()`, resolves the returned key and calls
    /// `will_exit(next)` before looping. When `process()` returns `None`
    /// the state's `will_exit(None)` is called and the run succeeds.
    ///
    /// A failure leaves the last successfully entered state current.
    pub fn run(&self, start: Option<K>) -> Result<(), MachineError<K>> {
        let start = start.or(self.initial).ok_or(MachineError::Empty)?;
        let mut target = self.state(start).ok_or(MachineError::UnknownState {
            state: start,
            from: None,
        })?;

        tracing::debug!(start = start.name(), "Starting run");

        loop {
            let from = self.current_id();
            let to = target.id();
            let Some(entered) = self.resolve_enterable(to) else {
                let err = MachineError::InvalidTransition { from, to };
                tracing::debug!(error = %err, "Run failed");
                return Err(err);
            };

            let previous = self.swap(&entered);
            entered.did_enter(previous.as_deref());

            let Some(next_id) = entered.process() else {
                entered.will_exit(None);
                tracing::debug!(last = to.name(), "Run finished");
                return Ok(());
            };

            let Some(next) = self.state(next_id) else {
                let err = MachineError::UnknownState {
                    state: next_id,
                    from: Some(to),
                };
                tracing::debug!(error = %err, "Run failed");
                return Err(err);
            };

            entered.will_exit(Some(next.as_ref()));
            target = next;
        }
    }

    /// Make `next` current, returning the state it replaced.
    fn swap(&self, next: &StateRef<K>) -> Option<StateRef<K>> {
        let mut cursor = self.cursor.write();
        let previous = cursor.current.replace(Arc::clone(next));
        let from = previous.as_ref().map(|s| s.id());
        let to = next.id();

        if let Some(history) = cursor.history.as_mut() {
            history.record(StateTransition {
                from,
                to,
                timestamp: Utc::now(),
            });
        }
        drop(cursor);

        tracing::trace!(
            from = from.as_ref().map(StateKey::name),
            to = to.name(),
            "State transition"
        );
        previous
    }
}

impl<K: StateKey> fmt::Debug for Machine<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut states: Vec<&K> = self.states.keys().collect();
        states.sort_by(|a, b| a.name().cmp(b.name()));

        f.debug_struct("Machine")
            .field("states", &states)
            .field("initial", &self.initial)
            .field("current", &self.current_id())
            .finish()
    }
}
