//! Interface to the underlying MariaDB client library.
//!
//! The library is consumed, not reimplemented: a binding implements
//! [`RawClient`] for its connection handle, [`RawResult`] for its result set
//! and [`ClientLibrary`] for the process-wide entry points. Every suspendable
//! call comes as a `*_start` / `*_cont` pair returning a [`Step`].

pub mod types;

use std::os::fd::RawFd;

use crate::field::Field;
use crate::opts::{ClientOption, Opts};

use types::WaitStatus;

/// Outcome of one library step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// The call finished and produced its output.
    Done(T),
    /// The call would block; resume it with the matching `*_cont` once the
    /// conditions in the status are met.
    Wait(WaitStatus),
}

/// Process-wide library entry points.
pub trait ClientLibrary {
    /// Initialize library state for the calling thread. Returns false on failure.
    fn thread_init() -> bool;

    /// Release library state for the calling thread.
    fn thread_end();

    /// Whether the library was built thread-safe.
    fn thread_safe() -> bool;
}

/// An opaque connection handle (`MYSQL *`).
///
/// Return codes follow the C API: `0` is success for the `i32` returning
/// calls; `next_result` uses `0` for "another result", `-1` for "no more
/// results" and a positive value for an error. Dropping the handle releases
/// it.
pub trait RawClient: Sized {
    /// Result set type produced by this handle.
    type Result: RawResult;

    /// Allocate a new handle. `None` if allocation fails.
    fn init() -> Option<Self>;

    /// Write an option into the handle's option buffer. Returns false if rejected.
    fn set_option(&mut self, option: &ClientOption) -> bool;

    /// Switch the handle to non-blocking operation. Returns false if rejected.
    fn enable_nonblocking(&mut self) -> bool;

    /// Current error text of the handle. Overwritten by the next call.
    fn error(&self) -> String;

    /// Information about the most recent query, if the server sent any.
    fn info(&self) -> Option<String>;

    /// Socket descriptor of the connection.
    fn socket(&self) -> RawFd;

    /// Timeout to wait for when a step reports `wait::TIMEOUT`, in milliseconds.
    fn timeout_value_ms(&self) -> u32;

    /// Whether the current query has more results.
    fn more_results(&self) -> bool;

    /// Escape a string for use inside quotes, honouring the connection charset.
    fn escape_string(&self, from: &[u8]) -> Vec<u8>;

    /// Hex-encode bytes the way the library does (uppercase, no prefix).
    fn hex_string(from: &[u8]) -> String {
        const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
        let mut out = String::with_capacity(from.len() * 2);
        for byte in from {
            out.push(char::from(DIGITS[usize::from(byte >> 4)]));
            out.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
        }
        out
    }

    // === Blocking calls ===

    /// Returns false on failure.
    fn connect(&mut self, opts: &Opts) -> bool;
    fn close(&mut self);
    fn select_db(&mut self, database: &str) -> i32;
    fn real_query(&mut self, query: &[u8]) -> i32;
    fn store_result(&mut self) -> Option<Self::Result>;
    fn use_result(&mut self) -> Option<Self::Result>;
    fn next_result(&mut self) -> i32;

    // === Non-blocking calls ===

    /// Output is false when the connect failed.
    fn connect_start(&mut self, opts: &Opts) -> Step<bool>;
    fn connect_cont(&mut self, ready: WaitStatus) -> Step<bool>;
    fn close_start(&mut self) -> Step<()>;
    fn close_cont(&mut self, ready: WaitStatus) -> Step<()>;
    fn select_db_start(&mut self, database: &str) -> Step<i32>;
    fn select_db_cont(&mut self, ready: WaitStatus) -> Step<i32>;
    fn real_query_start(&mut self, query: &[u8]) -> Step<i32>;
    fn real_query_cont(&mut self, ready: WaitStatus) -> Step<i32>;
    fn store_result_start(&mut self) -> Step<Option<Self::Result>>;
    fn store_result_cont(&mut self, ready: WaitStatus) -> Step<Option<Self::Result>>;
    fn next_result_start(&mut self) -> Step<i32>;
    fn next_result_cont(&mut self, ready: WaitStatus) -> Step<i32>;
}

/// An opaque result set (`MYSQL_RES *`).
///
/// Dropping the value releases it. After `free_cont` (or `free_start`)
/// reports completion the value is dropped without further calls.
pub trait RawResult {
    /// Column metadata.
    fn fields(&self) -> &[Field];

    /// Rows in a buffered result.
    fn num_rows(&self) -> u64;

    /// Advance to the next row. Returns false past the last row.
    fn fetch_row(&mut self) -> bool;

    /// Output is false past the last row.
    fn fetch_row_start(&mut self) -> Step<bool>;
    fn fetch_row_cont(&mut self, ready: WaitStatus) -> Step<bool>;

    fn free_start(&mut self) -> Step<()>;
    fn free_cont(&mut self, ready: WaitStatus) -> Step<()>;

    /// Position a buffered result before row `row`.
    fn data_seek(&mut self, row: u64);

    /// Value of column `index` in the current row. `None` is SQL NULL.
    ///
    /// The slice length is authoritative; the bytes may contain zeros.
    fn value(&self, index: usize) -> Option<&[u8]>;
}
