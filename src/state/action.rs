//! Progress values returned by the non-blocking entry points.

use std::time::Duration;

use crate::ready::Ready;

/// What a suspended operation is waiting for.
///
/// The caller should watch the connection socket for `ready.io()`, arm a
/// timer for `timeout` if present, and call the matching `continue_*`
/// method with what it observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    /// Conditions to wait on. May combine I/O and timeout.
    pub ready: Ready,
    /// Present iff `ready` includes [`Ready::TIMEOUT`].
    pub timeout: Option<Duration>,
}

impl Wait {
    pub fn new(ready: Ready, timeout: Option<Duration>) -> Self {
        Self { ready, timeout }
    }
}

/// Result of a `start_*` or `continue_*` call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending operation must be driven to completion"]
pub enum Progress<T> {
    /// The operation finished; the connection is idle again.
    Complete(T),
    /// The operation is suspended until the described conditions occur.
    Pending(Wait),
}

impl<T> Progress<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, Progress::Complete(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Progress::Pending(_))
    }

    /// The wait description, if still pending.
    pub fn wait(&self) -> Option<Wait> {
        match self {
            Progress::Complete(_) => None,
            Progress::Pending(wait) => Some(*wait),
        }
    }

    /// The output, if complete.
    pub fn complete(self) -> Option<T> {
        match self {
            Progress::Complete(value) => Some(value),
            Progress::Pending(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Progress<U> {
        match self {
            Progress::Complete(value) => Progress::Complete(f(value)),
            Progress::Pending(wait) => Progress::Pending(wait),
        }
    }
}

/// Outcome of a row fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// A row is current and can be read with `row()`.
    Row,
    /// The cursor moved past the last row.
    EndOfResults,
}

/// Output of a completed operation, as returned by the generic `resume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Connected,
    Closed,
    DatabaseSelected,
    QueryAccepted,
    ResultStored,
    /// `true` if another result is available
    NextResult(bool),
    ResultFreed,
    Fetched(Fetched),
}
