//! Sans-I/O tracking of the one suspended operation per connection.
//!
//! The state machine never calls the client library. The connection feeds it
//! the [`Step`] each library call returned and gets back either the step's
//! output (state back to `Idle`) or a [`Wait`] (state `Pending`).

pub mod action;

use core::fmt;

use crate::error::{Error, Result};
use crate::raw::Step;
use crate::raw::types::WaitStatus;
use crate::ready::Ready;

pub use action::{Completion, Fetched, Progress, Wait};

/// Which suspendable operation is in flight. Selects the continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Connect,
    Close,
    SelectDb,
    Query,
    StoreResult,
    NextResult,
    FreeResult,
    FetchRow,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Connect => "connect",
            OperationKind::Close => "close",
            OperationKind::SelectDb => "select DB",
            OperationKind::Query => "query",
            OperationKind::StoreResult => "store result",
            OperationKind::NextResult => "next result",
            OperationKind::FreeResult => "free result",
            OperationKind::FetchRow => "fetch row",
        })
    }
}

/// Operation state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationState {
    #[default]
    Idle,
    Pending {
        kind: OperationKind,
        status: WaitStatus,
    },
}

/// Single in-flight operation tracker.
#[derive(Debug, Default)]
pub struct OperationStateMachine {
    state: OperationState,
}

impl OperationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OperationState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, OperationState::Pending { .. })
    }

    /// Kind of the suspended operation, if any.
    pub fn pending_kind(&self) -> Option<OperationKind> {
        match self.state {
            OperationState::Idle => None,
            OperationState::Pending { kind, .. } => Some(kind),
        }
    }

    /// Fails if an operation is suspended.
    pub fn ensure_idle(&self) -> Result<()> {
        match self.state {
            OperationState::Idle => Ok(()),
            OperationState::Pending { kind, .. } => Err(Error::OperationAlreadyPending(kind)),
        }
    }

    /// The operation to resume. Fails when idle.
    pub fn resumable(&self) -> Result<OperationKind> {
        self.pending_kind().ok_or(Error::NoPendingOperation)
    }

    /// Like [`resumable`](Self::resumable), but also checks the kind.
    pub fn resumable_as(&self, expected: OperationKind) -> Result<()> {
        let pending = self.resumable()?;
        if pending == expected {
            Ok(())
        } else {
            Err(Error::PendingMismatch { expected, pending })
        }
    }

    /// Record the outcome of a library step for `kind`.
    ///
    /// A finished step returns the state to `Idle` and hands its output back.
    /// A waiting step leaves `kind` pending and returns the readiness to wait
    /// for; the caller fills in the timeout.
    pub fn advance<T>(&mut self, kind: OperationKind, step: Step<T>) -> Result<Progress<T>> {
        match step {
            Step::Done(output) => {
                if self.is_pending() {
                    tracing::trace!("{} completed", kind);
                }
                self.state = OperationState::Idle;
                Ok(Progress::Complete(output))
            }
            Step::Wait(0) => {
                self.state = OperationState::Idle;
                Err(Error::Protocol(format!(
                    "{} reported a wait with an empty status",
                    kind
                )))
            }
            Step::Wait(status) => {
                tracing::trace!("{} waiting on status {:#x}", kind, status);
                self.state = OperationState::Pending { kind, status };
                Ok(Progress::Pending(Wait::new(
                    Ready::from_wait_status(status),
                    None,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::types::wait;

    #[test]
    fn test_done_on_start_stays_idle() {
        let mut sm = OperationStateMachine::new();
        let progress = sm.advance(OperationKind::Query, Step::Done(0)).unwrap();
        assert_eq!(progress, Progress::Complete(0));
        assert_eq!(sm.state(), OperationState::Idle);
    }

    #[test]
    fn test_wait_then_done() {
        let mut sm = OperationStateMachine::new();
        let progress = sm
            .advance::<()>(OperationKind::Connect, Step::Wait(wait::WRITE))
            .unwrap();
        assert_eq!(progress.wait().unwrap().ready, Ready::WRITE);
        assert_eq!(sm.pending_kind(), Some(OperationKind::Connect));
        assert_eq!(
            sm.state(),
            OperationState::Pending {
                kind: OperationKind::Connect,
                status: wait::WRITE
            }
        );
        assert!(matches!(
            sm.ensure_idle(),
            Err(Error::OperationAlreadyPending(OperationKind::Connect))
        ));

        assert_eq!(sm.resumable().unwrap(), OperationKind::Connect);
        let progress = sm.advance(OperationKind::Connect, Step::Done(())).unwrap();
        assert!(progress.is_complete());
        assert!(!sm.is_pending());
        assert_eq!(sm.state(), OperationState::Idle);
    }

    #[test]
    fn test_resume_when_idle() {
        let sm = OperationStateMachine::new();
        assert!(matches!(sm.resumable(), Err(Error::NoPendingOperation)));
        assert!(matches!(
            sm.resumable_as(OperationKind::Query),
            Err(Error::NoPendingOperation)
        ));
    }

    #[test]
    fn test_resume_kind_mismatch() {
        let mut sm = OperationStateMachine::new();
        let _ = sm
            .advance::<i32>(OperationKind::Query, Step::Wait(wait::READ))
            .unwrap();
        assert!(matches!(
            sm.resumable_as(OperationKind::FetchRow),
            Err(Error::PendingMismatch {
                expected: OperationKind::FetchRow,
                pending: OperationKind::Query,
            })
        ));
        assert!(sm.is_pending());
    }

    #[test]
    fn test_empty_wait_is_protocol_error() {
        let mut sm = OperationStateMachine::new();
        let _ = sm
            .advance::<i32>(OperationKind::Query, Step::Wait(wait::READ))
            .unwrap();
        let err = sm
            .advance::<i32>(OperationKind::Query, Step::Wait(0))
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
        assert!(!sm.is_pending());
    }

    #[test]
    fn test_mask_combines_io_and_timeout() {
        let mut sm = OperationStateMachine::new();
        let progress = sm
            .advance::<bool>(OperationKind::FetchRow, Step::Wait(wait::READ | wait::TIMEOUT))
            .unwrap();
        assert_eq!(progress.wait().unwrap().ready, Ready::READ | Ready::TIMEOUT);
    }
}
