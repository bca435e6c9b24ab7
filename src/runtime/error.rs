//! Dispatch errors.

use crate::core::HandlerError;
use thiserror::Error;

/// Errors returned by [`Machine::dispatch`](crate::runtime::Machine::dispatch).
///
/// In both cases the machine is left exactly as it was before the call.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Event '{event}' is not valid in state '{state}'")]
    InvalidEvent { event: String, state: String },

    #[error("Handler for '{event}' failed in state '{state}': {source}")]
    Handler {
        event: String,
        state: String,
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    pub fn is_invalid_event(&self) -> bool {
        matches!(self, Self::InvalidEvent { .. })
    }

    /// The error raised by the user action, if that is what failed.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler { source, .. } => Some(source.as_ref()),
            Self::InvalidEvent { .. } => None,
        }
    }
}
