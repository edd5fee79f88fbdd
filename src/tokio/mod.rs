//! Asynchronous MariaDB client using Tokio.

mod conn;

pub use conn::Conn;
