//! A resumable MariaDB client core for event-driven programs.
//!
//! # Features
//!
//! - **Sans-I/O operation tracking**: every suspendable call is a
//!   `start_*` / `continue_*` pair; the connection never blocks or polls
//! - **Event loop agnostic**: pending operations report a socket readiness
//!   mask and an optional timeout, which any reactor can wait on
//! - **Blocking mode too**: the same connection offers plain blocking calls
//! - **Typed field access**: integers, floats, strings, BIT, SET and
//!   temporal values decoded by their declared column type
//!
//! The client library itself sits behind the [`raw::RawClient`] trait.
//!
//! # Example
//!
//! ```no_run
//! use zero_mariadb::raw::RawClient;
//! use zero_mariadb::{Conn, Fetched, Opts, Progress, Ready};
//!
//! fn select_one<C: RawClient>(opts: &Opts) -> zero_mariadb::Result<i64> {
//!     let mut conn = Conn::<C>::init()?;
//!     conn.enable_nonblocking()?;
//!
//!     let mut progress = conn.start_connect(opts)?;
//!     while let Progress::Pending(wait) = progress {
//!         // Wait on `conn.socket()` for `wait.ready` here.
//!         progress = conn.continue_connect(wait.ready)?;
//!     }
//!
//!     conn.query("SELECT 1")?;
//!     conn.store_result()?;
//!     assert_eq!(conn.fetch_row()?, Fetched::Row);
//!     let value = conn.row()?.get::<i64>(0)?;
//!     conn.free_result()?;
//!     Ok(value)
//! }
//! ```

pub mod binder;
pub mod conn;
pub mod conversion;
pub mod error;
pub mod field;
pub mod opts;
pub mod raw;
pub mod ready;
pub mod result;
pub mod row;
pub mod state;
pub mod thread;

#[cfg(feature = "tokio")]
pub mod tokio;

pub use binder::{EventBinder, Reactor};
pub use conn::Conn;
pub use conversion::{FromField, Temporal};
pub use error::{Error, Result};
pub use field::{Field, FieldType};
pub use opts::{ClientOption, Opts};
pub use raw::types::Protocol;
pub use ready::Ready;
pub use result::{ResultCursor, ResultMode};
pub use row::{FromRow, Row};
pub use state::{Completion, Fetched, OperationKind, OperationState, Progress, Wait};
pub use thread::ThreadGuard;
