//! State identity keys.
//!
//! A machine indexes its registered states by a host-defined key rather
//! than by any runtime type information. Two states with different keys
//! never collide; registering a second state under the same key replaces
//! the first.

use std::fmt::Debug;
use std::hash::Hash;

/// Identity of a state kind within a machine.
///
/// Keys are small copyable tags, typically a fieldless enum declared with
/// [`state_key!`](crate::state_key).
///
/// # Example
///
/// ```rust
/// use waypoint::core::StateKey;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum Phase {
///     Boot,
///     Serve,
/// }
///
/// impl StateKey for Phase {
///     fn name(&self) -> &str {
///         match self {
///             Self::Boot => "Boot",
///             Self::Serve => "Serve",
///         }
///     }
/// }
///
/// assert_eq!(Phase::Serve.name(), "Serve");
/// ```
pub trait StateKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Human readable name used in errors and log events.
    fn name(&self) -> &str;
}
