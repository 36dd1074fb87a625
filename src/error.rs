//! Errors returned by this crate

use chrono::{DateTime, Utc};

/// The error type used for I/O-bound operations (network, storage, notifications).
///
/// These errors are usually logged and turned into "no data from this source" at the boundary of each component.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An action of the user that has been rejected. Nothing has been committed when this is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("the end of an event ({end}) must be after its start ({start})")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("a task cannot have an empty text")]
    EmptyTaskText,
    #[error("a countdown cannot have an empty title")]
    EmptyCountdownTitle,
}
