//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder for configuring machines and the
//! `state_key!` macro for declaring state identities with minimal
//! boilerplate.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;
