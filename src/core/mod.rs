//! Core state machine types.
//!
//! This module contains the pieces a host implements or embeds:
//! - State identity via the `StateKey` trait
//! - State behavior via the `State` trait, with no-op hook defaults
//! - The `BaseState` back-reference to an owning machine
//! - Transition history records

mod history;
mod key;
mod state;

pub use history::{StateHistory, StateTransition};
pub use key::StateKey;
pub use state::{BaseState, State};
