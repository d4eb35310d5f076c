//! The State trait driven by the machine, and the embeddable base value
//! that carries a state's link back to its owning machine.

use super::key::StateKey;
use crate::engine::Machine;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// A unit of behavior the machine sequences.
///
/// A state is identified by its [`StateKey`], decides which states may
/// follow it, and produces the key of the state to run next. Only the
/// *current* state's [`is_valid_next_state`](State::is_valid_next_state)
/// decides whether a transition is legal, so the outgoing edges of the
/// graph live with their source state.
///
/// Hooks and work take `&self`. Machines are shared across threads, so a
/// state that needs to mutate data does so through interior mutability.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use waypoint::core::State;
/// use waypoint::{state_key, Machine};
///
/// state_key! {
///     enum Step {
///         Fetch,
///         Parse,
///     }
/// }
///
/// struct Fetch;
///
/// impl State<Step> for Fetch {
///     fn id(&self) -> Step {
///         Step::Fetch
///     }
///
///     fn is_valid_next_state(&self, next: &dyn State<Step>) -> bool {
///         next.id() == Step::Parse
///     }
///
///     fn process(&self) -> Option<Step> {
///         Some(Step::Parse)
///     }
/// }
///
/// struct Parse;
///
/// impl State<Step> for Parse {
///     fn id(&self) -> Step {
///         Step::Parse
///     }
///
///     fn is_valid_next_state(&self, _next: &dyn State<Step>) -> bool {
///         false
///     }
/// }
///
/// let machine = Machine::new(vec![
///     Arc::new(Fetch) as Arc<dyn State<Step>>,
///     Arc::new(Parse),
/// ]);
///
/// machine.run(None).unwrap();
/// assert_eq!(machine.current_id(), Some(Step::Parse));
/// ```
pub trait State<K: StateKey>: Send + Sync {
    /// The key this state is registered under.
    fn id(&self) -> K;

    /// Whether `next` may become current while this state is current.
    ///
    /// `next` is always the instance registered with the machine.
    fn is_valid_next_state(&self, next: &dyn State<K>) -> bool;

    /// Called right after this state became current. `from` is the state
    /// that was current before, or `None` on the first entry.
    fn did_enter(&self, _from: Option<&dyn State<K>>) {}

    /// Performs the state's work and nominates the next state.
    ///
    /// Returning `None` ends the run.
    fn process(&self) -> Option<K> {
        None
    }

    /// Called before this state stops being current. `to` is the state
    /// about to be entered, or `None` when the run is ending.
    fn will_exit(&self, _to: Option<&dyn State<K>>) {}

    /// The embedded [`BaseState`], if this state tracks its owner.
    ///
    /// States that return one are attached to the machine they are
    /// registered with, and are only enterable on that machine.
    fn base(&self) -> Option<&BaseState<K>> {
        None
    }
}

/// Embeddable back-reference from a state to its owning machine.
///
/// The link is weak and set once, when the state is first registered. It
/// never keeps the machine alive. A state registered with a second machine
/// stays owned by the first.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use waypoint::core::{BaseState, State};
/// use waypoint::{state_key, Machine};
///
/// state_key! {
///     enum Node {
///         Only,
///     }
/// }
///
/// #[derive(Default)]
/// struct Only {
///     base: BaseState<Node>,
/// }
///
/// impl State<Node> for Only {
///     fn id(&self) -> Node {
///         Node::Only
///     }
///
///     fn is_valid_next_state(&self, _next: &dyn State<Node>) -> bool {
///         false
///     }
///
///     fn base(&self) -> Option<&BaseState<Node>> {
///         Some(&self.base)
///     }
/// }
///
/// let only = Arc::new(Only::default());
/// let machine = Machine::new(vec![only.clone() as Arc<dyn State<Node>>]);
///
/// assert!(only.base.is_owned_by(&machine));
/// ```
pub struct BaseState<K: StateKey> {
    machine: OnceLock<Weak<Machine<K>>>,
}

impl<K: StateKey> BaseState<K> {
    /// Create an unattached base.
    pub const fn new() -> Self {
        Self {
            machine: OnceLock::new(),
        }
    }

    /// The owning machine, if attached and still alive.
    pub fn machine(&self) -> Option<Arc<Machine<K>>> {
        self.machine.get().and_then(Weak::upgrade)
    }

    /// Whether this state has been registered with any machine.
    pub fn is_attached(&self) -> bool {
        self.machine.get().is_some()
    }

    /// Whether `machine` is the owner of this state.
    pub fn is_owned_by(&self, machine: &Machine<K>) -> bool {
        self.machine
            .get()
            .is_some_and(|owner| std::ptr::eq(owner.as_ptr(), machine))
    }

    /// Attach to `machine` unless already owned by another one.
    ///
    /// Returns whether `machine` owns this state afterwards.
    pub(crate) fn attach(&self, machine: &Weak<Machine<K>>) -> bool {
        let owner = self.machine.get_or_init(|| machine.clone());
        Weak::ptr_eq(owner, machine)
    }
}

impl<K: StateKey> Default for BaseState<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: StateKey> fmt::Debug for BaseState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseState")
            .field("attached", &self.is_attached())
            .finish()
    }
}
