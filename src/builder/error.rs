//! Errors raised while compiling a transition description.

use thiserror::Error;

/// A single problem found in a description or hand-authored table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptionError {
    #[error("No states declared. Add at least one state")]
    NoStates,

    #[error("Starting state not specified. Call .starting(name) before .compile()")]
    MissingStartingState,

    #[error("Starting state '{state}' is not a declared state")]
    UnknownStartingState { state: String },

    #[error("State '{state}' is declared more than once")]
    DuplicateState { state: String },

    #[error("Event '{event}' in state '{state}' targets undeclared state '{destination}'")]
    UndeclaredDestination {
        state: String,
        event: String,
        destination: String,
    },

    #[error("State '{state}' directs events to undeclared state '{destination}'")]
    UndeclaredBucket { state: String, destination: String },

    #[error("Event '{event}' is declared more than once in state '{state}'")]
    DuplicateEvent { state: String, event: String },
}

/// Compilation failed. Carries every problem found, not just the first.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed state machine description: {}", summarize(.errors))]
pub struct MalformedDescription {
    errors: Vec<DescriptionError>,
}

impl MalformedDescription {
    pub(crate) fn new(errors: Vec<DescriptionError>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[DescriptionError] {
        &self.errors
    }

    /// True when at least one event is declared twice within one state.
    pub fn is_duplicate_event(&self) -> bool {
        self.errors
            .iter()
            .any(|e| matches!(e, DescriptionError::DuplicateEvent { .. }))
    }

    /// True when at least one transition targets an undeclared state.
    pub fn is_undeclared_destination(&self) -> bool {
        self.errors
            .iter()
            .any(|e| {
                matches!(
                    e,
                    DescriptionError::UndeclaredDestination { .. }
                        | DescriptionError::UndeclaredBucket { .. }
                )
            })
    }
}

impl From<DescriptionError> for MalformedDescription {
    fn from(error: DescriptionError) -> Self {
        Self::new(vec![error])
    }
}

fn summarize(errors: &[DescriptionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
