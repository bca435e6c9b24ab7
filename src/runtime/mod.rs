//! Machine instances and event dispatch.
//!
//! A [`Machine`] pairs a shared, immutable [`StateTable`](crate::core::StateTable)
//! with its own current state and data. Dispatch is synchronous and
//! staged: state and data change together or not at all.

mod error;
mod machine;

pub use error::DispatchError;
pub use machine::Machine;
