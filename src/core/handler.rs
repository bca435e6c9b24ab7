//! Event handlers and the `transitions_to` wrapper.
//!
//! A user supplies plain actions that only see the instance data. The
//! wrapper turns an action into a [`Handler`] that, once the action has
//! returned successfully, moves the receiver to a destination state.
//! The destination is kept as data on the handler so it can be read back
//! without inspecting the closure.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Error type returned by user actions.
pub type HandlerError = Box<dyn Error + Send + Sync + 'static>;

/// A user-supplied event action.
///
/// Actions receive the instance data and the dispatch argument. They know
/// nothing about states.
pub type Action<D, A, R> = Arc<dyn Fn(&mut D, A) -> Result<R, HandlerError> + Send + Sync>;

type CompiledFn<D, A, R> =
    Arc<dyn Fn(&mut Receiver<D>, A) -> Result<R, HandlerError> + Send + Sync>;

/// The value a compiled handler runs against.
///
/// Holds the current-state name and the instance data for the duration
/// of one dispatch. The state name can only be reassigned by handlers
/// built with [`transitions_to`].
#[derive(Debug, Clone)]
pub struct Receiver<D> {
    state: String,
    data: D,
}

impl<D> Receiver<D> {
    /// A receiver in `state` holding `data`, for calling a [`Handler`]
    /// outside a machine.
    pub fn new(state: impl Into<String>, data: D) -> Self {
        Self {
            state: state.into(),
            data,
        }
    }

    /// Name of the state the receiver currently occupies.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub(crate) fn move_to(&mut self, destination: &str) {
        destination.clone_into(&mut self.state);
    }

    pub(crate) fn into_parts(self) -> (String, D) {
        (self.state, self.data)
    }
}

/// A ready-to-call event handler stored in a state table.
pub struct Handler<D, A, R> {
    destination: Option<String>,
    call: CompiledFn<D, A, R>,
}

impl<D, A, R> Handler<D, A, R> {
    /// The state this handler moves to, or `None` when it never
    /// reassigns the state pointer.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Run the handler against a receiver.
    pub fn call(&self, receiver: &mut Receiver<D>, args: A) -> Result<R, HandlerError> {
        (self.call)(receiver, args)
    }
}

impl<D, A, R> Clone for Handler<D, A, R> {
    fn clone(&self) -> Self {
        Self {
            destination: self.destination.clone(),
            call: Arc::clone(&self.call),
        }
    }
}

impl<D, A, R> fmt::Debug for Handler<D, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

/// Wrap an action so that it moves the receiver to `destination`.
///
/// The action runs first. Only if it returns `Ok` is the state pointer
/// reassigned, so a failing action never leaves the receiver half-way
/// through a transition. Self-transitions reassign too.
///
/// # Example
///
/// ```
/// use statewise::core::{transitions_to, Handler, HandlerError};
///
/// let close: Handler<u64, (), ()> =
///     transitions_to("closed", |_balance: &mut u64, _: ()| Ok::<_, HandlerError>(()));
///
/// assert_eq!(close.destination(), Some("closed"));
/// ```
pub fn transitions_to<D, A, R, F>(destination: impl Into<String>, action: F) -> Handler<D, A, R>
where
    D: 'static,
    A: 'static,
    R: 'static,
    F: Fn(&mut D, A) -> Result<R, HandlerError> + Send + Sync + 'static,
{
    wrap_action(destination.into(), Arc::new(action))
}

/// Wrap an action that never changes the current state.
///
/// Only useful for hand-authored tables; compiled descriptions always
/// record an explicit destination.
pub fn stays<D, A, R, F>(action: F) -> Handler<D, A, R>
where
    D: 'static,
    A: 'static,
    R: 'static,
    F: Fn(&mut D, A) -> Result<R, HandlerError> + Send + Sync + 'static,
{
    Handler {
        destination: None,
        call: Arc::new(move |receiver: &mut Receiver<D>, args: A| {
            action(receiver.data_mut(), args)
        }),
    }
}

pub(crate) fn wrap_action<D, A, R>(destination: String, action: Action<D, A, R>) -> Handler<D, A, R>
where
    D: 'static,
    A: 'static,
    R: 'static,
{
    let target = destination.clone();
    Handler {
        destination: Some(destination),
        call: Arc::new(move |receiver: &mut Receiver<D>, args: A| {
            let output = action(receiver.data_mut(), args)?;
            receiver.move_to(&target);
            Ok(output)
        }),
    }
}
