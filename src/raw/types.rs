//! Common client library types.

/// Wait status code exchanged with the client library's `*_start` / `*_cont` calls.
///
/// `0` means the step completed; any other value is a bit set of [`wait`] flags.
pub type WaitStatus = i32;

/// Wait status bits (`MYSQL_WAIT_*`).
pub mod wait {
    use super::WaitStatus;

    /// Wait for the socket to become readable
    pub const READ: WaitStatus = 1;
    /// Wait for the socket to become writable
    pub const WRITE: WaitStatus = 2;
    /// Wait for an exceptional condition on the socket
    pub const EXCEPT: WaitStatus = 4;
    /// Wait for the library's timeout value to elapse
    pub const TIMEOUT: WaitStatus = 8;
}

/// Client capability flags passed to connect (`CLIENT_*`).
pub mod client_flag {
    /// Return the number of found (matched) rows, not affected rows
    pub const FOUND_ROWS: u64 = 1 << 1;
    /// Allow `database.table.column`
    pub const NO_SCHEMA: u64 = 1 << 4;
    /// Use compression in the protocol
    pub const COMPRESS: u64 = 1 << 5;
    /// Allow `LOAD DATA LOCAL`
    pub const LOCAL_FILES: u64 = 1 << 7;
    /// Ignore spaces before `(`
    pub const IGNORE_SPACE: u64 = 1 << 8;
    /// Interactive timeout instead of wait timeout
    pub const INTERACTIVE: u64 = 1 << 10;
    /// Use SSL encryption for the session
    pub const SSL: u64 = 1 << 11;
    /// Allow several statements separated by `;` in one query
    pub const MULTI_STATEMENTS: u64 = 1 << 16;
    /// Enable multi-result support
    pub const MULTI_RESULTS: u64 = 1 << 17;
    /// Multi-results for prepared statements
    pub const PS_MULTI_RESULTS: u64 = 1 << 18;
}

/// Transport used to reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// TCP/IP
    Tcp,
    /// Unix domain socket
    Socket,
    /// Windows named pipe
    Pipe,
}

impl Protocol {
    /// Parse the URL spelling of a protocol.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tcp" | "TCP" => Some(Protocol::Tcp),
            "socket" | "SOCKET" => Some(Protocol::Socket),
            "pipe" | "PIPE" => Some(Protocol::Pipe),
            _ => None,
        }
    }
}
