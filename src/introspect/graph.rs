//! Transition graph recovered from a state table.

use crate::core::StateTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Diagram-ready view of a state table.
///
/// `edges[source][destination]` lists the events that move from `source`
/// to `destination`, in declaration order. Every declared state is a key
/// of `edges`; states without outgoing events map to an empty map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateGraph {
    pub starting_state: String,
    pub edges: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl StateGraph {
    /// All state names, sorted.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.edges.keys().map(String::as_str)
    }

    /// States with no outgoing events.
    pub fn terminal_states(&self) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, targets)| targets.is_empty())
            .map(|(state, _)| state.as_str())
            .collect()
    }

    /// Events that move from `source` to `destination`.
    pub fn events_between(&self, source: &str, destination: &str) -> Option<&[String]> {
        self.edges
            .get(source)?
            .get(destination)
            .map(Vec::as_slice)
    }

    /// Serialize for an external diagram generator.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Rebuild the transition graph of `table`.
///
/// Reads only the destinations recorded on each handler. Handlers that
/// never move the state pointer show up as self-loops.
///
/// # Example
///
/// ```
/// use statewise::core::{transitions_to, StateTable};
/// use statewise::introspect::describe;
///
/// let table = StateTable::<()>::builder()
///     .handler("green", "timer", transitions_to("yellow", |_: &mut (), _: ()| Ok(())))
///     .handler("yellow", "timer", transitions_to("red", |_: &mut (), _: ()| Ok(())))
///     .handler("red", "timer", transitions_to("green", |_: &mut (), _: ()| Ok(())))
///     .build()
///     .unwrap();
///
/// let graph = describe(&table, "green");
/// assert_eq!(graph.starting_state, "green");
/// assert_eq!(graph.events_between("red", "green"), Some(&["timer".to_string()][..]));
/// ```
pub fn describe<D, A, R>(table: &StateTable<D, A, R>, starting: &str) -> StateGraph {
    let mut edges: BTreeMap<String, BTreeMap<String, Vec<String>>> = BTreeMap::new();

    for entry in table.entries() {
        let targets = edges.entry(entry.name.clone()).or_default();
        for (event, handler) in &entry.handlers {
            let destination = handler.destination().unwrap_or(entry.name.as_str());
            targets
                .entry(destination.to_string())
                .or_default()
                .push(event.clone());
        }
    }

    StateGraph {
        starting_state: starting.to_string(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{stays, transitions_to, Handler};

    fn to(destination: &str) -> Handler<(), (), ()> {
        transitions_to(destination, |_: &mut (), _: ()| Ok(()))
    }

    fn table() -> StateTable<(), (), ()> {
        StateTable::builder()
            .handler("open", "deposit", to("open"))
            .handler("open", "withdraw", to("open"))
            .handler("open", "close", to("closed"))
            .handler("closed", "reopen", to("open"))
            .handler("closed", "audit", stays(|_: &mut (), _: ()| Ok(())))
            .state("archived")
            .build()
            .unwrap()
    }

    #[test]
    fn groups_events_by_destination() {
        let graph = describe(&table(), "open");

        assert_eq!(
            graph.events_between("open", "open"),
            Some(&["deposit".to_string(), "withdraw".to_string()][..])
        );
        assert_eq!(
            graph.events_between("open", "closed"),
            Some(&["close".to_string()][..])
        );
        assert_eq!(graph.events_between("open", "archived"), None);
    }

    #[test]
    fn handlers_without_destination_are_self_loops() {
        let graph = describe(&table(), "open");
        assert_eq!(
            graph.events_between("closed", "closed"),
            Some(&["audit".to_string()][..])
        );
    }

    #[test]
    fn lists_terminal_states() {
        let graph = describe(&table(), "open");
        assert_eq!(graph.states().collect::<Vec<_>>(), vec!["archived", "closed", "open"]);
        assert_eq!(graph.terminal_states(), vec!["archived"]);
    }

    #[test]
    fn json_output_has_edges_and_start() {
        let graph = describe(&table(), "open");
        let json = graph.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["starting_state"], "open");
        assert_eq!(value["edges"]["closed"]["open"][0], "reopen");
        assert!(value["edges"]["archived"].as_object().unwrap().is_empty());
    }
}
