//! Declarative transition descriptions and their compilation.

use crate::builder::error::{DescriptionError, MalformedDescription};
use crate::core::{wrap_action, Action, HandlerError, StateEntry, StateTable, TableBuilder};
use crate::introspect::StateGraph;
use crate::runtime::Machine;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

struct Bucket<D, A, R> {
    destination: String,
    events: Vec<(String, Action<D, A, R>)>,
}

/// The events of one state, grouped by destination state.
///
/// Events added with [`on`](Self::on) go into the current bucket. The
/// first bucket targets the state itself; [`to`](Self::to) switches to
/// another destination.
pub struct StateBuilder<D, A, R> {
    name: String,
    buckets: Vec<Bucket<D, A, R>>,
    current: usize,
}

impl<D, A, R> StateBuilder<D, A, R> {
    fn new(name: String) -> Self {
        let buckets = vec![Bucket {
            destination: name.clone(),
            events: Vec::new(),
        }];
        Self {
            name,
            buckets,
            current: 0,
        }
    }

    /// Direct the following events to `destination`.
    pub fn to(mut self, destination: impl Into<String>) -> Self {
        let destination = destination.into();
        self.current = match self
            .buckets
            .iter()
            .position(|bucket| bucket.destination == destination)
        {
            Some(index) => index,
            None => {
                self.buckets.push(Bucket {
                    destination,
                    events: Vec::new(),
                });
                self.buckets.len() - 1
            }
        };
        self
    }

    /// Add an event to the current destination bucket.
    pub fn on<F>(mut self, event: impl Into<String>, action: F) -> Self
    where
        F: Fn(&mut D, A) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        if let Some(bucket) = self.buckets.get_mut(self.current) {
            bucket.events.push((event.into(), Arc::new(action)));
        }
        self
    }
}

/// A declarative state machine description.
///
/// Holds the declared states, their events grouped by destination, the
/// starting state and the state-independent properties every instance
/// starts from.
///
/// # Example
///
/// ```
/// use statewise::builder::Description;
///
/// let compiled = Description::<i64, i64, i64>::new(0)
///     .starting("open")
///     .state("open", |s| {
///         s.on("deposit", |balance: &mut i64, amount: i64| {
///             *balance += amount;
///             Ok(*balance)
///         })
///         .to("closed")
///         .on("close", |balance: &mut i64, _| Ok(*balance))
///     })
///     .state("closed", |s| s.to("open").on("reopen", |balance: &mut i64, _| Ok(*balance)))
///     .compile()
///     .unwrap();
///
/// let mut account = compiled.spawn();
/// assert_eq!(account.dispatch("deposit", 40).unwrap(), 40);
/// account.dispatch("close", 0).unwrap();
/// assert_eq!(account.state(), "closed");
/// ```
pub struct Description<D, A = (), R = ()> {
    starting: Option<String>,
    states: Vec<StateBuilder<D, A, R>>,
    properties: D,
}

impl<D, A, R> Description<D, A, R>
where
    D: 'static,
    A: 'static,
    R: 'static,
{
    /// Start a description whose instances begin with `properties`.
    pub fn new(properties: D) -> Self {
        Self {
            starting: None,
            states: Vec::new(),
            properties,
        }
    }

    /// Set the starting state (required).
    pub fn starting(mut self, state: impl Into<String>) -> Self {
        self.starting = Some(state.into());
        self
    }

    /// Declare a state and its events.
    pub fn state<F>(mut self, name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(StateBuilder<D, A, R>) -> StateBuilder<D, A, R>,
    {
        self.states.push(build(StateBuilder::new(name.into())));
        self
    }

    /// Declare a state with no outgoing events.
    pub fn terminal(self, name: impl Into<String>) -> Self {
        self.state(name, |s| s)
    }

    /// Compile into a shared state table.
    ///
    /// Every event handler is wrapped so that it moves the instance to
    /// its bucket's destination after the action succeeds. All problems
    /// in the description are reported together.
    pub fn compile(self) -> Result<Compiled<D, A, R>, MalformedDescription> {
        let mut problems = Vec::new();
        let starting = match self.starting {
            Some(starting) => {
                if !self.states.is_empty() && !self.states.iter().any(|s| s.name == starting) {
                    problems.push(DescriptionError::UnknownStartingState {
                        state: starting.clone(),
                    });
                }
                Some(starting)
            }
            None => {
                problems.push(DescriptionError::MissingStartingState);
                None
            }
        };

        let declared: HashSet<String> = self.states.iter().map(|s| s.name.clone()).collect();
        let mut builder = TableBuilder::new();
        for state in self.states {
            let mut entry = StateEntry::new(state.name);
            for bucket in state.buckets {
                // Buckets with events are checked per handler by the table.
                if bucket.events.is_empty() && !declared.contains(&bucket.destination) {
                    problems.push(DescriptionError::UndeclaredBucket {
                        state: entry.name.clone(),
                        destination: bucket.destination.clone(),
                    });
                }
                for (event, action) in bucket.events {
                    let handler = wrap_action(bucket.destination.clone(), action);
                    entry.handlers.push((event, handler));
                }
            }
            builder.push_entry(entry);
        }

        let table = match builder.build() {
            Ok(table) => Some(table),
            Err(malformed) => {
                problems.extend_from_slice(malformed.errors());
                None
            }
        };

        match (table, starting) {
            (Some(table), Some(starting)) if problems.is_empty() => {
                debug!(starting = %starting, "description compiled");
                Ok(Compiled {
                    table: Arc::new(table),
                    starting,
                    properties: self.properties,
                })
            }
            _ => Err(MalformedDescription::new(problems)),
        }
    }
}

/// Output of [`Description::compile`].
///
/// Owns the shared table, the starting state and the property prototype
/// cloned into every spawned machine.
pub struct Compiled<D, A = (), R = ()> {
    table: Arc<StateTable<D, A, R>>,
    starting: String,
    properties: D,
}

impl<D, A, R> Compiled<D, A, R> {
    pub fn table(&self) -> &Arc<StateTable<D, A, R>> {
        &self.table
    }

    pub fn starting_state(&self) -> &str {
        &self.starting
    }

    pub fn properties(&self) -> &D {
        &self.properties
    }

    pub fn describe(&self) -> StateGraph {
        self.table.describe(&self.starting)
    }

    /// Split into table, starting state and properties.
    pub fn into_parts(self) -> (Arc<StateTable<D, A, R>>, String, D) {
        (self.table, self.starting, self.properties)
    }
}

impl<D: Clone, A, R> Compiled<D, A, R> {
    /// Create a new machine in the starting state with a private copy of
    /// the properties.
    pub fn spawn(&self) -> Machine<D, A, R> {
        Machine::from_validated(
            Arc::clone(&self.table),
            self.starting.clone(),
            self.properties.clone(),
        )
    }
}
