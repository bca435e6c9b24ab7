//! Introspection of compiled state tables.
//!
//! Turns a table back into the `(source, destination) -> events` graph it
//! was compiled from, for tools such as diagram generators. Only data
//! recorded on the handlers is read; closures are never inspected.

mod graph;

pub use graph::{describe, StateGraph};
