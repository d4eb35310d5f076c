//! The machine that registers states and drives transitions between them.
//!
//! # Key Concepts
//!
//! - **Registry**: states keyed by their `StateKey`, last registration wins
//! - **Transition**: a swap of the current state, gated by the current
//!   state's `is_valid_next_state`
//! - **Run loop**: enter, process, exit, repeated until a state's work
//!   yields no next state
//!
//! Everything runs synchronously on the caller's thread. A concurrent
//! `enter` from another thread may interleave with the hops of a `run`;
//! hosts that need run isolation keep a single writer per machine.

mod error;
mod machine;

pub use error::MachineError;
pub use machine::Machine;
