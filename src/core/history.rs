//! Dispatch history tracking.
//!
//! Every committed dispatch is one `(event, from, to)` triple. `record`
//! builds a new history and leaves the old one alone; a machine owns its
//! history and appends to it in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed dispatch.
///
/// # Example
///
/// ```rust
/// use statewise::core::DispatchRecord;
/// use chrono::Utc;
///
/// let record = DispatchRecord {
///     event: "place_hold".to_string(),
///     from: "open".to_string(),
///     to: "held".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert!(!record.is_self_loop());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchRecord {
    /// The event that was dispatched
    pub event: String,
    /// The state the instance was in before dispatch
    pub from: String,
    /// The state the instance was in after dispatch
    pub to: String,
    /// When the dispatch was committed
    pub timestamp: DateTime<Utc>,
}

impl DispatchRecord {
    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// Ordered history of committed dispatches.
///
/// `record` returns a new history with the dispatch appended and leaves
/// the original untouched.
///
/// # Example
///
/// ```rust
/// use statewise::core::{DispatchHistory, DispatchRecord};
/// use chrono::Utc;
///
/// let history = DispatchHistory::new();
/// let next = history.record(DispatchRecord {
///     event: "close".to_string(),
///     from: "open".to_string(),
///     to: "closed".to_string(),
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.transitions().len(), 0);
/// assert_eq!(next.get_path(), vec!["open", "closed"]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DispatchHistory {
    transitions: Vec<DispatchRecord>,
}

impl DispatchHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// An empty history with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
        }
    }

    /// Record a dispatch, returning a new history.
    pub fn record(&self, record: DispatchRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(record);
        Self { transitions }
    }

    /// Append in place. Used by the machine that owns the history.
    pub(crate) fn push(&mut self, record: DispatchRecord) {
        self.transitions.push(record);
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.transitions.reserve(additional);
    }

    /// Get the path of states traversed.
    ///
    /// The first entry is the `from` state of the first record, followed
    /// by the `to` state of every record. Empty when nothing was recorded.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for record in &self.transitions {
            path.push(record.to.as_str());
        }
        path
    }

    /// Time between the first and last committed dispatch.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Get all records in dispatch order.
    pub fn transitions(&self) -> &[DispatchRecord] {
        &self.transitions
    }

    /// How many times `event` was committed.
    pub fn count(&self, event: &str) -> usize {
        self.transitions.iter().filter(|r| r.event == event).count()
    }
}
