//! Waypoint: a minimal embeddable state machine engine
//!
//! A host registers a set of states with a [`Machine`] and then either
//! steps it manually with [`Machine::enter`] or lets [`Machine::run`] chain
//! the states: each state's work nominates the state that follows it, and
//! the state that is current decides whether that successor is allowed.
//!
//! # Core Concepts
//!
//! - **StateKey**: identity of a state kind, typically a fieldless enum
//! - **State**: transition rule, enter/exit hooks and work for one state
//! - **Machine**: registry, current state and the run loop
//! - **History**: optional record of committed transitions
//!
//! # Example
//!
//! ```rust
//! use waypoint::core::State;
//! use waypoint::{state_key, MachineBuilder};
//!
//! state_key! {
//!     enum Order {
//!         Placed,
//!         Packed,
//!         Shipped,
//!     }
//! }
//!
//! struct Stage(Order);
//!
//! impl State<Order> for Stage {
//!     fn id(&self) -> Order {
//!         self.0
//!     }
//!
//!     fn is_valid_next_state(&self, next: &dyn State<Order>) -> bool {
//!         matches!(
//!             (self.0, next.id()),
//!             (Order::Placed, Order::Packed) | (Order::Packed, Order::Shipped)
//!         )
//!     }
//!
//!     fn process(&self) -> Option<Order> {
//!         match self.0 {
//!             Order::Placed => Some(Order::Packed),
//!             Order::Packed => Some(Order::Shipped),
//!             Order::Shipped => None,
//!         }
//!     }
//! }
//!
//! let machine = MachineBuilder::new()
//!     .state(Stage(Order::Placed))
//!     .state(Stage(Order::Packed))
//!     .state(Stage(Order::Shipped))
//!     .record_history(true)
//!     .build()
//!     .unwrap();
//!
//! machine.run(None).unwrap();
//! assert_eq!(machine.current_id(), Some(Order::Shipped));
//! assert_eq!(machine.history().len(), 3);
//! ```

pub mod builder;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use core::{BaseState, State, StateHistory, StateKey, StateTransition};
pub use engine::{Machine, MachineError};
