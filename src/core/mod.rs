//! Core state table types.
//!
//! This module contains the pieces every machine is made of:
//! - Handlers and the `transitions_to` wrapper
//! - The immutable, shareable state table
//! - Immutable dispatch history

mod handler;
mod history;
mod table;

pub use handler::{stays, transitions_to, Action, Handler, HandlerError, Receiver};
pub use history::{DispatchHistory, DispatchRecord};
pub use table::{StateTable, TableBuilder};

pub(crate) use handler::wrap_action;
pub(crate) use table::StateEntry;
