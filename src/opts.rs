//! Connection options.

use core::fmt;
use std::time::Duration;

use no_panic::no_panic;
use url::Url;

use crate::error::Error;
use crate::raw::types::{Protocol, client_flag};

/// A client option written into the handle's option buffer before connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOption {
    /// SQL executed right after connecting (`MYSQL_INIT_COMMAND`)
    InitCommand(String),
    /// Compressed protocol (`MYSQL_OPT_COMPRESS`)
    Compress,
    /// Connect timeout, whole seconds (`MYSQL_OPT_CONNECT_TIMEOUT`)
    ConnectTimeout(u32),
    /// Read timeout, whole seconds (`MYSQL_OPT_READ_TIMEOUT`)
    ReadTimeout(u32),
    /// Write timeout, whole seconds (`MYSQL_OPT_WRITE_TIMEOUT`)
    WriteTimeout(u32),
    /// `LOAD DATA LOCAL INFILE` (`MYSQL_OPT_LOCAL_INFILE`)
    LocalInfile(bool),
    /// Named pipe transport on Windows (`MYSQL_OPT_NAMED_PIPE`)
    NamedPipe,
    /// Transport selection (`MYSQL_OPT_PROTOCOL`)
    Protocol(Protocol),
    /// Automatic reconnection (`MYSQL_OPT_RECONNECT`)
    Reconnect(bool),
    /// Option file to read instead of `my.cnf` (`MYSQL_READ_DEFAULT_FILE`)
    DefaultFile(String),
    /// Option file group to read (`MYSQL_READ_DEFAULT_GROUP`)
    DefaultGroup(String),
    /// Report data truncation for prepared statements (`MYSQL_REPORT_DATA_TRUNCATION`)
    ReportDataTruncation(bool),
    /// Default character set (`MYSQL_SET_CHARSET_NAME`)
    CharacterSet(String),
}

impl fmt::Display for ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toggle = |on: bool| if on { "enable" } else { "disable" };
        match self {
            ClientOption::InitCommand(cmd) => write!(f, "init command {}", cmd),
            ClientOption::Compress => f.write_str("enable compression"),
            ClientOption::ConnectTimeout(secs) => write!(f, "connect timeout to {}", secs),
            ClientOption::ReadTimeout(secs) => write!(f, "read timeout to {}", secs),
            ClientOption::WriteTimeout(secs) => write!(f, "write timeout to {}", secs),
            ClientOption::LocalInfile(on) => write!(f, "{} local infile", toggle(*on)),
            ClientOption::NamedPipe => f.write_str("enable named pipe"),
            ClientOption::Protocol(protocol) => write!(f, "protocol to {:?}", protocol),
            ClientOption::Reconnect(on) => write!(f, "{} auto reconnect", toggle(*on)),
            ClientOption::DefaultFile(path) => write!(f, "default file to {}", path),
            ClientOption::DefaultGroup(group) => write!(f, "default group {}", group),
            ClientOption::ReportDataTruncation(on) => {
                write!(f, "{} data truncation reporting", toggle(*on))
            }
            ClientOption::CharacterSet(name) => write!(f, "character set to {}", name),
        }
    }
}

/// Connection options for MariaDB.
#[derive(Debug, Clone)]
pub struct Opts {
    /// Hostname or IP address.
    ///
    /// Default: `""` (the library's default, usually `localhost`)
    pub host: String,

    /// Port number for the server.
    ///
    /// Default: `3306`
    pub port: u16,

    /// Unix socket path.
    ///
    /// Default: `None`
    pub socket: Option<String>,

    /// Username for authentication.
    ///
    /// Default: `""`
    pub user: String,

    /// Password for authentication.
    ///
    /// Default: `None`
    pub password: Option<String>,

    /// Database to select after connecting.
    ///
    /// Default: `None`
    pub database: Option<String>,

    /// Bit set of [`client_flag`] values.
    ///
    /// Default: `0`
    pub flags: u64,

    /// Options applied by [`Conn::configure`](crate::Conn::configure).
    ///
    /// Default: `[]`
    pub options: Vec<ClientOption>,

    /// Switch the connection to non-blocking mode in
    /// [`Conn::configure`](crate::Conn::configure).
    ///
    /// Default: `false`
    pub nonblocking: bool,
}

impl Default for Opts {
    #[no_panic]
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 3306,
            socket: None,
            user: String::new(),
            password: None,
            database: None,
            flags: 0,
            options: Vec::new(),
            nonblocking: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "true" | "True" | "1" | "yes" | "on" => Ok(true),
        "false" | "False" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::Configuration(format!("Invalid {}: {}", key, value))),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u32, Error> {
    value
        .parse()
        .map_err(|_| Error::Configuration(format!("Invalid {}: {}", key, value)))
}

impl TryFrom<&Url> for Opts {
    type Error = Error;

    /// Parse a MariaDB connection URL.
    ///
    /// Format: `mysql://[user[:password]@]host[:port][/database][?param1=value1&..]`
    ///
    /// Supported query parameters:
    /// - `socket`: Unix socket path
    /// - `nonblocking`, `compress`, `reconnect`, `local_infile`, `multi_statements`:
    ///   true/True/1/yes/on or false/False/0/no/off
    /// - `connect_timeout`, `read_timeout`, `write_timeout`: seconds
    /// - `charset`: character set name
    /// - `init_command`: SQL run after connecting
    /// - `protocol`: tcp, socket, pipe
    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        if !["mysql", "mariadb"].contains(&url.scheme()) {
            return Err(Error::Configuration(format!(
                "Invalid scheme: expected 'mysql://' or 'mariadb://', got '{}://'",
                url.scheme()
            )));
        }

        let mut opts = Opts {
            host: url.host_str().unwrap_or("localhost").to_string(),
            port: url.port().unwrap_or(3306),
            user: url.username().to_string(),
            password: url.password().map(|s| s.to_string()),
            database: url.path().strip_prefix('/').and_then(|s| {
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }),
            ..Opts::default()
        };

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "socket" => opts.socket = Some(value.to_string()),
                "nonblocking" => opts.nonblocking = parse_bool(&key, &value)?,
                "compress" => {
                    if parse_bool(&key, &value)? {
                        opts.options.push(ClientOption::Compress);
                    }
                }
                "reconnect" => {
                    let on = parse_bool(&key, &value)?;
                    opts.options.push(ClientOption::Reconnect(on));
                }
                "local_infile" => {
                    let on = parse_bool(&key, &value)?;
                    opts.options.push(ClientOption::LocalInfile(on));
                }
                "multi_statements" => {
                    if parse_bool(&key, &value)? {
                        opts.flags |= client_flag::MULTI_STATEMENTS | client_flag::MULTI_RESULTS;
                    }
                }
                "connect_timeout" => {
                    let secs = parse_secs(&key, &value)?;
                    opts.options.push(ClientOption::ConnectTimeout(secs));
                }
                "read_timeout" => {
                    let secs = parse_secs(&key, &value)?;
                    opts.options.push(ClientOption::ReadTimeout(secs));
                }
                "write_timeout" => {
                    let secs = parse_secs(&key, &value)?;
                    opts.options.push(ClientOption::WriteTimeout(secs));
                }
                "charset" => opts
                    .options
                    .push(ClientOption::CharacterSet(value.to_string())),
                "init_command" => opts
                    .options
                    .push(ClientOption::InitCommand(value.to_string())),
                "protocol" => {
                    let protocol = Protocol::from_name(&value).ok_or_else(|| {
                        Error::Configuration(format!(
                            "Invalid protocol: expected one of ['tcp', 'socket', 'pipe'], got {}",
                            value
                        ))
                    })?;
                    opts.options.push(ClientOption::Protocol(protocol));
                }
                _ => {
                    return Err(Error::Configuration(format!(
                        "Unknown connection parameter: {}",
                        key
                    )));
                }
            }
        }

        Ok(opts)
    }
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let url =
            Url::parse(s).map_err(|e| Error::Configuration(format!("Invalid URL: {}", e)))?;
        Self::try_from(&url)
    }
}

/// Whole seconds of a duration, saturating at `u32::MAX`.
pub(crate) fn duration_secs(duration: Duration) -> u32 {
    u32::try_from(duration.as_secs()).unwrap_or(u32::MAX)
}
