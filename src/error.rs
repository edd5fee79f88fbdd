//! Error types for zero-mariadb.

use thiserror::Error;

use crate::field::FieldType;
use crate::state::OperationKind;

/// Result type for zero-mariadb operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for zero-mariadb.
#[derive(Debug, Error)]
pub enum Error {
    /// The client library could not allocate a connection handle
    #[error("Failed to create MariaDB handle")]
    Init,

    /// Per-thread library initialization failed
    #[error("Failed to init MariaDB threads")]
    ThreadInit,

    /// The library rejected an option (carries the attempted setting)
    #[error("Failed to set MariaDB option: {0}")]
    Configuration(String),

    /// Connect was rejected by the server or failed on the network
    #[error("Failed to connect: {0}")]
    Connection(String),

    /// The server rejected the database selection
    #[error("Failed to select DB: {0}")]
    DatabaseSelection(String),

    /// The server rejected the query
    #[error("Query failed: {0}")]
    Query(String),

    /// No result set is available after the query
    #[error("Failed to store result: {0}")]
    ResultAcquisition(String),

    /// Multi-statement result sequence is out of sync
    #[error("Failed to get next result: {0}")]
    MultiResult(String),

    /// A non-blocking operation is already suspended on this connection
    #[error("Non-blocking {0} still pending")]
    OperationAlreadyPending(OperationKind),

    /// `continue` was called while no operation is suspended
    #[error("No non-blocking operation pending")]
    NoPendingOperation,

    /// A typed `continue` does not match the suspended operation
    #[error("Cannot continue {expected}: {pending} is pending")]
    PendingMismatch {
        /// Operation the caller tried to continue
        expected: OperationKind,
        /// Operation actually suspended
        pending: OperationKind,
    },

    /// The connection is not established
    #[error("Not connected")]
    NotConnected,

    /// A non-blocking entry point was used on a blocking connection
    #[error("Connection is not in non-blocking mode")]
    NotNonBlocking,

    /// No result is held; call `query()` and `store_result()` or `use_result()` first
    #[error("Don't have result, must call query() and use_result() or store_result()")]
    NoResultHeld,

    /// A result is already held; call `free_result()` first
    #[error("Already have result, must call free_result()")]
    ResultAlreadyHeld,

    /// No current row; call `fetch_row()` first
    #[error("Don't have row, must call fetch_row()")]
    NoRow,

    /// The cursor already reported the end of its rows
    #[error("Result cursor is exhausted")]
    CursorExhausted,

    /// Other protocol violation by the caller
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Row count and seeking need a buffered result
    #[error("Must use store_result() before seeking or counting rows")]
    NotBuffered,

    /// Seek target beyond the last row
    #[error("Row seek out of range {row} (row count {row_count})")]
    RowOutOfRange {
        /// Requested row
        row: u64,
        /// Rows in the result
        row_count: u64,
    },

    /// Column index outside `[0, field_count)`
    #[error("Out of field range {index} (field count {field_count})")]
    FieldIndex {
        /// Requested column
        index: usize,
        /// Columns in the result
        field_count: usize,
    },

    /// The declared column type does not fit the requested decoding
    #[error("Field {index} is not {expected} (declared {actual:?})")]
    TypeMismatch {
        /// Column index
        index: usize,
        /// What the accessor needs, e.g. "an integer"
        expected: &'static str,
        /// Declared column type
        actual: FieldType,
    },

    /// NULL value decoded into a non-optional type
    #[error("Field {0} is NULL")]
    UnexpectedNull(usize),

    /// Temporal decoding requested on a non-temporal column
    #[error("Invalid time type {0:?}")]
    UnsupportedTemporalType(FieldType),

    /// Field bytes could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The client library broke its own contract
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error while waiting for readiness
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true for caller protocol violations (the connection itself is fine).
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            Error::OperationAlreadyPending(_)
                | Error::NoPendingOperation
                | Error::PendingMismatch { .. }
                | Error::NotConnected
                | Error::NotNonBlocking
                | Error::NoResultHeld
                | Error::ResultAlreadyHeld
                | Error::NoRow
                | Error::CursorExhausted
                | Error::InvalidState(_)
        )
    }

    /// Returns true if the error carries a diagnostic reported by the server or network.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Error::Connection(_)
                | Error::DatabaseSelection(_)
                | Error::Query(_)
                | Error::ResultAcquisition(_)
                | Error::MultiResult(_)
        )
    }

    pub(crate) fn type_mismatch(index: usize, expected: &'static str, actual: FieldType) -> Self {
        Error::TypeMismatch {
            index,
            expected,
            actual,
        }
    }
}
