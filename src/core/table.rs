//! The compiled state table.
//!
//! A table maps each declared state to the handlers legal in it. It is
//! immutable once built and is shared (behind an `Arc`) by every machine
//! spawned from it.

use crate::builder::{DescriptionError, MalformedDescription};
use crate::core::handler::Handler;
use crate::introspect::{describe, StateGraph};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;

pub(crate) struct StateEntry<D, A, R> {
    pub(crate) name: String,
    pub(crate) handlers: Vec<(String, Handler<D, A, R>)>,
}

impl<D, A, R> StateEntry<D, A, R> {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            handlers: Vec::new(),
        }
    }
}

/// Immutable table of states and their event handlers.
pub struct StateTable<D, A = (), R = ()> {
    states: Vec<StateEntry<D, A, R>>,
}

impl<D, A, R> StateTable<D, A, R> {
    /// Start a hand-authored table.
    ///
    /// # Example
    ///
    /// ```
    /// use statewise::core::{transitions_to, StateTable};
    ///
    /// let table = StateTable::<u32>::builder()
    ///     .handler("idle", "start", transitions_to("running", |_: &mut u32, _: ()| Ok(())))
    ///     .handler("running", "stop", transitions_to("idle", |_: &mut u32, _: ()| Ok(())))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(table.handler("idle", "start").is_some());
    /// assert!(table.handler("idle", "stop").is_none());
    /// ```
    pub fn builder() -> TableBuilder<D, A, R> {
        TableBuilder::new()
    }

    /// Look up the handler for `event` in `state`.
    pub fn handler(&self, state: &str, event: &str) -> Option<&Handler<D, A, R>> {
        self.entry(state)?
            .handlers
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, handler)| handler)
    }

    pub fn contains_state(&self, state: &str) -> bool {
        self.entry(state).is_some()
    }

    /// Declared state names in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(|entry| entry.name.as_str())
    }

    /// Events legal in `state`, in declaration order. Empty for unknown
    /// states.
    pub fn events_in(&self, state: &str) -> Vec<&str> {
        self.entry(state)
            .map(|entry| entry.handlers.iter().map(|(e, _)| e.as_str()).collect())
            .unwrap_or_default()
    }

    /// Union of the events of every state, first occurrence first.
    pub fn events(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.states
            .iter()
            .flat_map(|entry| entry.handlers.iter().map(|(e, _)| e.as_str()))
            .filter(|event| seen.insert(*event))
            .collect()
    }

    /// True when `state` has no outgoing events.
    pub fn is_terminal(&self, state: &str) -> bool {
        self.entry(state)
            .is_some_and(|entry| entry.handlers.is_empty())
    }

    /// Recover the transition graph as seen from `starting`.
    pub fn describe(&self, starting: &str) -> StateGraph {
        describe(self, starting)
    }

    pub(crate) fn entries(&self) -> &[StateEntry<D, A, R>] {
        &self.states
    }

    fn entry(&self, state: &str) -> Option<&StateEntry<D, A, R>> {
        self.states.iter().find(|entry| entry.name == state)
    }
}

/// Builder for hand-authored state tables.
pub struct TableBuilder<D, A = (), R = ()> {
    states: Vec<StateEntry<D, A, R>>,
}

impl<D, A, R> TableBuilder<D, A, R> {
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Declare a state. Needed for states without outgoing events.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.states.push(StateEntry::new(name.into()));
        self
    }

    /// Register `handler` for `event` in `state`, declaring the state if
    /// it is not declared yet.
    pub fn handler(
        mut self,
        state: impl Into<String>,
        event: impl Into<String>,
        handler: Handler<D, A, R>,
    ) -> Self {
        self.push_handler(state.into(), event.into(), handler);
        self
    }

    pub(crate) fn push_entry(&mut self, entry: StateEntry<D, A, R>) {
        self.states.push(entry);
    }

    fn push_handler(&mut self, state: String, event: String, handler: Handler<D, A, R>) {
        match self.states.iter_mut().find(|entry| entry.name == state) {
            Some(entry) => entry.handlers.push((event, handler)),
            None => {
                let mut entry = StateEntry::new(state);
                entry.handlers.push((event, handler));
                self.states.push(entry);
            }
        }
    }

    /// Validate and freeze the table.
    ///
    /// Every problem is reported at once.
    pub fn build(self) -> Result<StateTable<D, A, R>, MalformedDescription> {
        match validate(&self.states) {
            Validation::Success(_) => {
                debug!(
                    states = self.states.len(),
                    events = self.states.iter().map(|e| e.handlers.len()).sum::<usize>(),
                    "state table built"
                );
                Ok(StateTable {
                    states: self.states,
                })
            }
            Validation::Failure(errors) => {
                Err(MalformedDescription::new(errors.iter().cloned().collect()))
            }
        }
    }
}

impl<D, A, R> Default for TableBuilder<D, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

type Check = Validation<(), NonEmptyVec<DescriptionError>>;

fn validate<D, A, R>(states: &[StateEntry<D, A, R>]) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    if states.is_empty() {
        checks.push(Validation::fail(DescriptionError::NoStates));
    }

    let declared: HashSet<&str> = states.iter().map(|entry| entry.name.as_str()).collect();
    let mut seen_states = HashSet::new();

    for entry in states {
        if !seen_states.insert(entry.name.as_str()) {
            checks.push(Validation::fail(DescriptionError::DuplicateState {
                state: entry.name.clone(),
            }));
        }

        let mut seen_events = HashSet::new();
        for (event, handler) in &entry.handlers {
            if !seen_events.insert(event.as_str()) {
                checks.push(Validation::fail(DescriptionError::DuplicateEvent {
                    state: entry.name.clone(),
                    event: event.clone(),
                }));
            }

            match handler.destination() {
                Some(destination) if !declared.contains(destination) => {
                    checks.push(Validation::fail(DescriptionError::UndeclaredDestination {
                        state: entry.name.clone(),
                        event: event.clone(),
                        destination: destination.to_string(),
                    }));
                }
                _ => checks.push(Validation::success(())),
            }
        }
    }

    if checks.is_empty() {
        return Validation::success(());
    }

    Validation::all_vec(checks).map(|_| ())
}
