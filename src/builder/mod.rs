//! Builder API for declaring and compiling state machines.
//!
//! A [`Description`] lists states, their events grouped by destination,
//! a starting state and the properties instances start with. Compiling
//! it validates everything at once and produces a shared table.

pub mod description;
pub mod error;

pub use description::{Compiled, Description, StateBuilder};
pub use error::{DescriptionError, MalformedDescription};
