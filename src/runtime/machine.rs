//! Live machine instances.

use crate::builder::{DescriptionError, MalformedDescription};
use crate::core::{DispatchHistory, DispatchRecord, Receiver, StateTable};
use crate::introspect::StateGraph;
use crate::runtime::error::DispatchError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// A machine instance bound to a shared state table.
///
/// The instance owns its current-state name and its data. Every event of
/// every state can be dispatched; events that are not legal in the
/// current state are rejected with [`DispatchError::InvalidEvent`].
pub struct Machine<D, A = (), R = ()> {
    id: Uuid,
    table: Arc<StateTable<D, A, R>>,
    starting: String,
    current: String,
    data: D,
    history: DispatchHistory,
}

impl<D, A, R> Machine<D, A, R> {
    /// Create a machine in `starting` with its own copy of `properties`.
    pub fn new(
        table: Arc<StateTable<D, A, R>>,
        starting: impl Into<String>,
        properties: D,
    ) -> Result<Self, MalformedDescription> {
        let starting = starting.into();
        if !table.contains_state(&starting) {
            return Err(DescriptionError::UnknownStartingState { state: starting }.into());
        }
        Ok(Self::from_validated(table, starting, properties))
    }

    pub(crate) fn from_validated(
        table: Arc<StateTable<D, A, R>>,
        starting: String,
        properties: D,
    ) -> Self {
        let id = Uuid::new_v4();
        trace!(machine = %id, state = %starting, "machine created");
        Self {
            id,
            table,
            current: starting.clone(),
            starting,
            data: properties,
            history: DispatchHistory::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the current state.
    pub fn state(&self) -> &str {
        &self.current
    }

    pub fn starting_state(&self) -> &str {
        &self.starting
    }

    pub fn table(&self) -> &Arc<StateTable<D, A, R>> {
        &self.table
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn into_data(self) -> D {
        self.data
    }

    pub fn history(&self) -> &DispatchHistory {
        &self.history
    }

    /// Reserve room for `additional` more records in the history.
    pub fn with_history_capacity(mut self, additional: usize) -> Self {
        self.history.reserve(additional);
        self
    }

    /// Hand the recorded history to the caller and start a fresh one.
    pub fn take_history(&mut self) -> DispatchHistory {
        std::mem::take(&mut self.history)
    }

    pub fn clear_history(&mut self) {
        self.history = DispatchHistory::new();
    }

    /// Events legal in the current state.
    pub fn available_events(&self) -> Vec<&str> {
        self.table.events_in(&self.current)
    }

    /// Every event the machine knows, across all states.
    pub fn events(&self) -> Vec<&str> {
        self.table.events()
    }

    /// Whether `event` is legal in the current state.
    pub fn can(&self, event: &str) -> bool {
        self.table.handler(&self.current, event).is_some()
    }

    /// True when the current state has no outgoing events.
    pub fn is_terminal(&self) -> bool {
        self.table.is_terminal(&self.current)
    }

    /// The full transition graph, independent of the current state.
    pub fn describe(&self) -> StateGraph {
        self.table.describe(&self.starting)
    }
}

impl<D: Clone, A, R> Machine<D, A, R> {
    /// Dispatch `event` with `args` to the current state's handler.
    ///
    /// The handler runs against a staged copy of the state and data.
    /// Only a successful handler commits both, so a rejected event or a
    /// failing handler leaves the machine untouched.
    pub fn dispatch(&mut self, event: &str, args: A) -> Result<R, DispatchError> {
        trace!(machine = %self.id, state = %self.current, event = %event, "dispatch");

        let table = Arc::clone(&self.table);
        let Some(handler) = table.handler(&self.current, event) else {
            debug!(machine = %self.id, state = %self.current, event = %event, "event rejected");
            return Err(DispatchError::InvalidEvent {
                event: event.to_string(),
                state: self.current.clone(),
            });
        };

        let mut receiver = Receiver::new(self.current.clone(), self.data.clone());
        let output = handler.call(&mut receiver, args).map_err(|source| {
            warn!(
                machine = %self.id,
                state = %self.current,
                event = %event,
                error = %source,
                "handler failed"
            );
            DispatchError::Handler {
                event: event.to_string(),
                state: self.current.clone(),
                source,
            }
        })?;

        let (to, data) = receiver.into_parts();
        debug!(machine = %self.id, event = %event, from = %self.current, to = %to, "transition");
        self.history.push(DispatchRecord {
            event: event.to_string(),
            from: std::mem::replace(&mut self.current, to.clone()),
            to,
            timestamp: Utc::now(),
        });
        self.data = data;

        Ok(output)
    }
}

impl<D: Clone, A: Default, R> Machine<D, A, R> {
    /// Dispatch an event that takes no meaningful argument.
    pub fn trigger(&mut self, event: &str) -> Result<R, DispatchError> {
        self.dispatch(event, A::default())
    }
}
