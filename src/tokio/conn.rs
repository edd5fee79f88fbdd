//! Asynchronous MariaDB connection.

use std::io;
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, RawFd};

use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use crate::conn::Conn as CoreConn;
use crate::error::{Error, Result};
use crate::opts::Opts;
use crate::raw::RawClient;
use crate::ready::Ready;
use crate::row::FromRow;
use crate::state::{Completion, Fetched, Progress, Wait};

/// Socket owned by the client handle, borrowed for one wait. Never closed here.
struct SocketFd<'a>(BorrowedFd<'a>);

impl<'a> SocketFd<'a> {
    fn borrow<C: RawClient>(conn: &'a CoreConn<C>) -> Result<Self> {
        let fd = conn.socket();
        if fd < 0 {
            return Err(Error::Protocol("no socket to wait on".into()));
        }
        // SAFETY: the fd is open and owned by the client handle, which
        // outlives the `'a` borrow of `conn`.
        Ok(Self(unsafe { BorrowedFd::borrow_raw(fd) }))
    }
}

impl AsFd for SocketFd<'_> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.0
    }
}

impl AsRawFd for SocketFd<'_> {
    fn as_raw_fd(&self) -> RawFd {
        self.0.as_raw_fd()
    }
}

type Continue<C, T> = fn(&mut CoreConn<C>, Ready) -> Result<Progress<T>>;

/// Asynchronous MariaDB connection.
///
/// Drives the non-blocking entry points of [`crate::Conn`] on the Tokio
/// reactor.
pub struct Conn<C: RawClient> {
    inner: CoreConn<C>,
}

impl<C: RawClient> Conn<C> {
    /// Allocate a handle and switch it to non-blocking mode.
    pub fn init() -> Result<Self> {
        Self::from_conn(CoreConn::init()?)
    }

    /// Wrap an unconnected connection, switching it to non-blocking mode.
    pub fn from_conn(mut inner: CoreConn<C>) -> Result<Self> {
        inner.enable_nonblocking()?;
        Ok(Self { inner })
    }

    /// Allocate, configure from `opts` and connect.
    pub async fn new<O: TryInto<Opts>>(opts: O) -> Result<Self>
    where
        Error: From<O::Error>,
    {
        let opts = opts.try_into()?;
        let mut inner = CoreConn::init()?;
        inner.configure(&opts)?;
        let mut conn = Self::from_conn(inner)?;
        conn.connect(&opts).await?;
        Ok(conn)
    }

    pub fn inner(&self) -> &CoreConn<C> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut CoreConn<C> {
        &mut self.inner
    }

    pub fn into_inner(self) -> CoreConn<C> {
        self.inner
    }

    pub async fn connect(&mut self, opts: &Opts) -> Result<()> {
        let progress = self.inner.start_connect(opts)?;
        self.drive(progress, CoreConn::continue_connect).await
    }

    pub async fn close(&mut self) -> Result<()> {
        let progress = self.inner.start_close()?;
        self.drive(progress, CoreConn::continue_close).await
    }

    pub async fn select_db(&mut self, database: &str) -> Result<()> {
        let progress = self.inner.start_select_db(database)?;
        self.drive(progress, CoreConn::continue_select_db).await
    }

    pub async fn query(&mut self, query: impl AsRef<[u8]>) -> Result<()> {
        let progress = self.inner.start_query(query)?;
        self.drive(progress, CoreConn::continue_query).await
    }

    pub async fn store_result(&mut self) -> Result<()> {
        let progress = self.inner.start_store_result()?;
        self.drive(progress, CoreConn::continue_store_result).await
    }

    pub async fn next_result(&mut self) -> Result<bool> {
        let progress = self.inner.start_next_result()?;
        self.drive(progress, CoreConn::continue_next_result).await
    }

    pub async fn free_result(&mut self) -> Result<()> {
        let progress = self.inner.start_free_result()?;
        self.drive(progress, CoreConn::continue_free_result).await
    }

    pub async fn fetch_row(&mut self) -> Result<Fetched> {
        let progress = self.inner.start_fetch_row()?;
        self.drive(progress, CoreConn::continue_fetch_row).await
    }

    /// Run a query and decode every row of its result.
    pub async fn query_collect<T>(&mut self, query: impl AsRef<[u8]>) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r>,
    {
        self.query(query).await?;
        self.store_result().await?;
        let rows = self.collect_rows().await;
        self.free_result().await?;
        rows
    }

    async fn collect_rows<T>(&mut self) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r>,
    {
        let mut rows = Vec::new();
        while self.fetch_row().await? == Fetched::Row {
            rows.push(self.inner.row()?.decode()?);
        }
        Ok(rows)
    }

    /// Drive an operation left pending by a dropped call or a failed wait.
    ///
    /// Every call above fails with `OperationAlreadyPending` until the
    /// leftover operation is finished here.
    pub async fn finish_pending(&mut self) -> Result<Completion> {
        loop {
            let Some(wait) = self.inner.wait() else {
                return Err(Error::NoPendingOperation);
            };
            let fired = wait_for(&self.inner, wait).await?;
            if let Progress::Complete(completion) = self.inner.resume(fired)? {
                return Ok(completion);
            }
        }
    }

    async fn drive<T>(&mut self, mut progress: Progress<T>, cont: Continue<C, T>) -> Result<T> {
        loop {
            match progress {
                Progress::Complete(output) => return Ok(output),
                Progress::Pending(wait) => {
                    let fired = wait_for(&self.inner, wait).await?;
                    progress = cont(&mut self.inner, fired)?;
                }
            }
        }
    }
}

/// Wait until `wait` is satisfied on the connection's socket and report
/// what happened.
async fn wait_for<C: RawClient>(conn: &CoreConn<C>, wait: Wait) -> Result<Ready> {
    let io = wait.ready.io();
    let interest = match (io.is_readable(), io.is_writable()) {
        (true, true) => Interest::READABLE | Interest::WRITABLE,
        (true, false) => Interest::READABLE,
        (false, true) => Interest::WRITABLE,
        (false, false) => {
            let Some(timeout) = wait.timeout else {
                return Err(Error::Protocol(
                    "wait with neither I/O nor timeout".into(),
                ));
            };
            tokio::time::sleep(timeout).await;
            return Ok(Ready::TIMEOUT);
        }
    };

    let async_fd = AsyncFd::with_interest(SocketFd::borrow(conn)?, interest)?;
    let fired = match wait.timeout {
        Some(timeout) => match tokio::time::timeout(timeout, io_ready(&async_fd, interest)).await {
            Ok(ready) => ready?,
            Err(_) => Ready::TIMEOUT,
        },
        None => io_ready(&async_fd, interest).await?,
    };
    tracing::trace!("socket {} fired {:?}", async_fd.as_raw_fd(), fired);
    Ok(fired)
}

async fn io_ready(async_fd: &AsyncFd<SocketFd<'_>>, interest: Interest) -> io::Result<Ready> {
    let mut guard = async_fd.ready(interest).await?;
    let ready = guard.ready();
    let mut fired = Ready::EMPTY;
    if ready.is_readable() || ready.is_read_closed() {
        fired |= Ready::READ;
    }
    if ready.is_writable() || ready.is_write_closed() {
        fired |= Ready::WRITE;
    }
    guard.clear_ready();
    Ok(fired)
}
