//! Statewise: declarative state machines for domain objects
//!
//! A domain object whose valid operations depend on what state it is in
//! is described once, as data: the states, the starting state, and for
//! each state the events it accepts grouped by the state they lead to.
//! Compiling the description produces an immutable table shared by any
//! number of machine instances.
//!
//! # Core Concepts
//!
//! - **Description**: declarative input built with [`builder::Description`]
//! - **State table**: compiled, immutable, shareable handlers per state
//! - **Machine**: an instance that only accepts the events of its current state
//! - **Introspection**: recover the full transition graph from the table
//!
//! # Example
//!
//! ```rust
//! use statewise::{Description, DispatchError, HandlerError};
//!
//! #[derive(Clone, Default)]
//! struct Account {
//!     balance: u64,
//! }
//!
//! fn deposit(account: &mut Account, amount: u64) -> Result<(), HandlerError> {
//!     account.balance += amount;
//!     Ok(())
//! }
//!
//! let compiled = Description::<Account, u64>::new(Account::default())
//!     .starting("open")
//!     .state("open", |s| s.on("deposit", deposit).to("held").on("place_hold", |_, _| Ok(())))
//!     .state("held", |s| s.to("open").on("remove_hold", |_, _| Ok(())))
//!     .compile()
//!     .unwrap();
//!
//! let mut account = compiled.spawn();
//! account.dispatch("deposit", 100).unwrap();
//! account.trigger("place_hold").unwrap();
//!
//! let err = account.dispatch("deposit", 5).unwrap_err();
//! assert!(matches!(err, DispatchError::InvalidEvent { .. }));
//! assert_eq!(account.data().balance, 100);
//!
//! let graph = account.describe();
//! assert_eq!(graph.events_between("held", "open"), Some(&["remove_hold".to_string()][..]));
//! ```

pub mod builder;
pub mod core;
pub mod introspect;
pub mod runtime;

// Re-export commonly used types
pub use builder::{Compiled, Description, DescriptionError, MalformedDescription};
pub use crate::core::{
    transitions_to, DispatchHistory, DispatchRecord, Handler, HandlerError, StateTable,
};
pub use introspect::{describe, StateGraph};
pub use runtime::{DispatchError, Machine};
