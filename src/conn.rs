//! MariaDB connection: handle ownership, blocking calls and the
//! non-blocking start/continue entry points.

use std::os::fd::RawFd;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::opts::{ClientOption, Opts, duration_secs};
use crate::raw::types::Protocol;
use crate::raw::{RawClient, RawResult, Step};
use crate::ready::Ready;
use crate::result::{ResultCursor, ResultMode};
use crate::row::Row;
use crate::state::{
    Completion, Fetched, OperationKind, OperationState, OperationStateMachine, Progress, Wait,
};

/// A MariaDB connection.
///
/// Owns the client handle, the operation state and at most one result set.
/// Every operation exists in a blocking form (`query`) and, once
/// [`enable_nonblocking`](Self::enable_nonblocking) was called, in a
/// non-blocking form (`start_query` / `continue_query`). Only one
/// non-blocking operation can be in flight at a time.
pub struct Conn<C: RawClient> {
    // Declared before `client` so the result is released first.
    result: Option<ResultCursor<C::Result>>,
    client: C,
    state: OperationStateMachine,
    nonblocking: bool,
    connected: bool,
}

impl<C: RawClient> Conn<C> {
    /// Allocate a new client handle.
    pub fn init() -> Result<Self> {
        C::init().map(Self::from_raw).ok_or(Error::Init)
    }

    /// Take ownership of an allocated handle.
    pub fn from_raw(client: C) -> Self {
        Self {
            result: None,
            client,
            state: OperationStateMachine::new(),
            nonblocking: false,
            connected: false,
        }
    }

    /// Release the handle.
    ///
    /// Refused while an operation is pending or a result is held; the
    /// connection is handed back with the error.
    pub fn destroy(self) -> core::result::Result<(), (Self, Error)> {
        if let Some(kind) = self.state.pending_kind() {
            return Err((self, Error::OperationAlreadyPending(kind)));
        }
        if self.result.is_some() {
            return Err((self, Error::ResultAlreadyHeld));
        }
        drop(self);
        Ok(())
    }

    /// The underlying handle.
    pub fn raw(&self) -> &C {
        &self.client
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Kind of the suspended operation, if any.
    pub fn pending(&self) -> Option<OperationKind> {
        self.state.pending_kind()
    }

    pub fn state(&self) -> OperationState {
        self.state.state()
    }

    /// What the suspended operation waits for, if any.
    pub fn wait(&self) -> Option<Wait> {
        match self.state.state() {
            OperationState::Idle => None,
            OperationState::Pending { status, .. } => {
                Some(self.with_timeout(Wait::new(Ready::from_wait_status(status), None)))
            }
        }
    }

    /// Socket descriptor to watch for readiness.
    pub fn socket(&self) -> RawFd {
        self.client.socket()
    }

    /// Timeout requested by the library for a `Ready::TIMEOUT` wait.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.client.timeout_value_ms()))
    }

    /// Server information about the most recent query.
    pub fn info(&self) -> Option<String> {
        self.client.info()
    }

    /// Escape a string for use inside single quotes in SQL.
    pub fn escape(&self, s: &str) -> Result<String> {
        String::from_utf8(self.client.escape_string(s.as_bytes()))
            .map_err(|e| Error::Decode(format!("escaped string is not UTF-8: {}", e)))
    }

    /// Escape arbitrary bytes for use inside single quotes in SQL.
    pub fn escape_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        self.client.escape_string(bytes)
    }

    /// Hex-encode bytes for an `X'...'` literal.
    pub fn to_hex(bytes: &[u8]) -> String {
        C::hex_string(bytes)
    }

    // === Configuration ===

    /// Write an option into the handle. Only valid before connecting.
    pub fn set_option(&mut self, option: ClientOption) -> Result<()> {
        self.state.ensure_idle()?;
        if self.connected {
            return Err(Error::InvalidState(format!(
                "cannot set {} after connecting",
                option
            )));
        }
        if !self.client.set_option(&option) {
            return Err(Error::Configuration(option.to_string()));
        }
        tracing::debug!("set MariaDB option: {}", option);
        Ok(())
    }

    pub fn set_init_command(&mut self, command: &str) -> Result<()> {
        self.set_option(ClientOption::InitCommand(command.to_string()))
    }

    pub fn enable_compression(&mut self) -> Result<()> {
        self.set_option(ClientOption::Compress)
    }

    /// Rounded down to whole seconds.
    pub fn set_connect_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.set_option(ClientOption::ConnectTimeout(duration_secs(timeout)))
    }

    pub fn set_local_infile(&mut self, enable: bool) -> Result<()> {
        self.set_option(ClientOption::LocalInfile(enable))
    }

    pub fn enable_named_pipe(&mut self) -> Result<()> {
        self.set_option(ClientOption::NamedPipe)
    }

    pub fn set_protocol(&mut self, protocol: Protocol) -> Result<()> {
        self.set_option(ClientOption::Protocol(protocol))
    }

    pub fn set_reconnect(&mut self, enable: bool) -> Result<()> {
        self.set_option(ClientOption::Reconnect(enable))
    }

    /// Rounded down to whole seconds.
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.set_option(ClientOption::ReadTimeout(duration_secs(timeout)))
    }

    /// Rounded down to whole seconds.
    pub fn set_write_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.set_option(ClientOption::WriteTimeout(duration_secs(timeout)))
    }

    pub fn set_default_file(&mut self, path: &str) -> Result<()> {
        self.set_option(ClientOption::DefaultFile(path.to_string()))
    }

    pub fn read_default_group(&mut self, group: &str) -> Result<()> {
        self.set_option(ClientOption::DefaultGroup(group.to_string()))
    }

    pub fn set_report_data_truncation(&mut self, enable: bool) -> Result<()> {
        self.set_option(ClientOption::ReportDataTruncation(enable))
    }

    pub fn set_character_set(&mut self, name: &str) -> Result<()> {
        self.set_option(ClientOption::CharacterSet(name.to_string()))
    }

    /// Apply `opts.options`, then switch to non-blocking mode if requested.
    pub fn configure(&mut self, opts: &Opts) -> Result<()> {
        for option in &opts.options {
            self.set_option(option.clone())?;
        }
        if opts.nonblocking {
            self.enable_nonblocking()?;
        }
        Ok(())
    }

    /// Switch to non-blocking mode. Irrevocable; only valid before connecting.
    pub fn enable_nonblocking(&mut self) -> Result<()> {
        if self.nonblocking {
            return Ok(());
        }
        self.state.ensure_idle()?;
        if self.connected {
            return Err(Error::InvalidState(
                "non-blocking mode must be enabled before connecting".into(),
            ));
        }
        if !self.client.enable_nonblocking() {
            return Err(Error::Configuration("non-blocking mode".into()));
        }
        self.nonblocking = true;
        Ok(())
    }

    // === Result access ===

    pub fn have_result(&self) -> bool {
        self.result.is_some()
    }

    pub fn have_row(&self) -> bool {
        self.result.as_ref().is_some_and(ResultCursor::have_row)
    }

    /// The held result.
    pub fn result(&self) -> Result<&ResultCursor<C::Result>> {
        self.result.as_ref().ok_or(Error::NoResultHeld)
    }

    /// The current row of the held result.
    pub fn row(&self) -> Result<Row<'_, C::Result>> {
        self.result()?.row()
    }

    /// Rows in the held result (buffered results only).
    pub fn row_count(&self) -> Result<u64> {
        self.result()?.row_count()
    }

    pub fn field_count(&self) -> Result<usize> {
        Ok(self.result()?.field_count())
    }

    pub fn field(&self, index: usize) -> Result<&Field> {
        self.result()?.field(index)
    }

    /// Position the buffered cursor so the next fetch returns row `row`.
    pub fn seek_row(&mut self, row: u64) -> Result<()> {
        self.state.ensure_idle()?;
        self.cursor_mut()?.seek_row(row)
    }

    // === Blocking operations ===

    pub fn connect(&mut self, opts: &Opts) -> Result<()> {
        self.state.ensure_idle()?;
        tracing::debug!(host = %opts.host, port = opts.port, "connecting");
        let ok = self.client.connect(opts);
        self.connect_done(ok)
    }

    pub fn close(&mut self) -> Result<()> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_dont_have_result()?;
        self.client.close();
        self.mark_closed();
        Ok(())
    }

    pub fn select_db(&mut self, database: &str) -> Result<()> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        let ret = self.client.select_db(database);
        self.select_db_done(ret)
    }

    /// Send a query. The length of `query` is authoritative; it may contain
    /// zero bytes.
    pub fn query(&mut self, query: impl AsRef<[u8]>) -> Result<()> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_dont_have_result()?;
        let ret = self.client.real_query(query.as_ref());
        self.query_done(ret)
    }

    /// Start reading the query's rows one fetch at a time.
    pub fn use_result(&mut self) -> Result<()> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_dont_have_result()?;
        let raw = self.client.use_result();
        self.acquired(raw, ResultMode::Streaming)
    }

    /// Transfer all rows of the query's result.
    pub fn store_result(&mut self) -> Result<()> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_dont_have_result()?;
        let raw = self.client.store_result();
        self.acquired(raw, ResultMode::Buffered)
    }

    /// Advance to the next result of a multi-statement query. Returns true if
    /// there is one.
    pub fn next_result(&mut self) -> Result<bool> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_dont_have_result()?;
        let ret = self.client.next_result();
        self.next_result_done(ret)
    }

    /// Whether the current query has more results.
    pub fn more_results(&self) -> Result<bool> {
        self.assert_connected()?;
        Ok(self.client.more_results())
    }

    pub fn free_result(&mut self) -> Result<()> {
        self.state.ensure_idle()?;
        self.assert_have_result()?;
        self.free_result_done(())
    }

    pub fn fetch_row(&mut self) -> Result<Fetched> {
        self.state.ensure_idle()?;
        let cursor = self.cursor_mut()?;
        cursor.ensure_fetchable()?;
        let has_row = cursor.raw_mut().fetch_row();
        self.fetch_row_done(has_row)
    }

    // === Non-blocking operations ===

    pub fn start_connect(&mut self, opts: &Opts) -> Result<Progress<()>> {
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        tracing::debug!(host = %opts.host, port = opts.port, "connecting");
        let step = self.client.connect_start(opts);
        self.settle(OperationKind::Connect, step, Self::connect_done)
    }

    pub fn continue_connect(&mut self, ready: Ready) -> Result<Progress<()>> {
        self.state.resumable_as(OperationKind::Connect)?;
        let step = self.client.connect_cont(ready.to_wait_status());
        self.settle(OperationKind::Connect, step, Self::connect_done)
    }

    pub fn start_close(&mut self) -> Result<Progress<()>> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        self.assert_dont_have_result()?;
        let step = self.client.close_start();
        self.settle(OperationKind::Close, step, Self::close_done)
    }

    pub fn continue_close(&mut self, ready: Ready) -> Result<Progress<()>> {
        self.state.resumable_as(OperationKind::Close)?;
        let step = self.client.close_cont(ready.to_wait_status());
        self.settle(OperationKind::Close, step, Self::close_done)
    }

    pub fn start_select_db(&mut self, database: &str) -> Result<Progress<()>> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        let step = self.client.select_db_start(database);
        self.settle(OperationKind::SelectDb, step, Self::select_db_done)
    }

    pub fn continue_select_db(&mut self, ready: Ready) -> Result<Progress<()>> {
        self.state.resumable_as(OperationKind::SelectDb)?;
        let step = self.client.select_db_cont(ready.to_wait_status());
        self.settle(OperationKind::SelectDb, step, Self::select_db_done)
    }

    pub fn start_query(&mut self, query: impl AsRef<[u8]>) -> Result<Progress<()>> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        self.assert_dont_have_result()?;
        let step = self.client.real_query_start(query.as_ref());
        self.settle(OperationKind::Query, step, Self::query_done)
    }

    pub fn continue_query(&mut self, ready: Ready) -> Result<Progress<()>> {
        self.state.resumable_as(OperationKind::Query)?;
        let step = self.client.real_query_cont(ready.to_wait_status());
        self.settle(OperationKind::Query, step, Self::query_done)
    }

    /// Buffered acquisition only; streaming results are blocking-only.
    pub fn start_store_result(&mut self) -> Result<Progress<()>> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        self.assert_dont_have_result()?;
        let step = self.client.store_result_start();
        self.settle(OperationKind::StoreResult, step, Self::store_result_done)
    }

    pub fn continue_store_result(&mut self, ready: Ready) -> Result<Progress<()>> {
        self.state.resumable_as(OperationKind::StoreResult)?;
        let step = self.client.store_result_cont(ready.to_wait_status());
        self.settle(OperationKind::StoreResult, step, Self::store_result_done)
    }

    pub fn start_next_result(&mut self) -> Result<Progress<bool>> {
        self.assert_connected()?;
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        self.assert_dont_have_result()?;
        let step = self.client.next_result_start();
        self.settle(OperationKind::NextResult, step, Self::next_result_done)
    }

    pub fn continue_next_result(&mut self, ready: Ready) -> Result<Progress<bool>> {
        self.state.resumable_as(OperationKind::NextResult)?;
        let step = self.client.next_result_cont(ready.to_wait_status());
        self.settle(OperationKind::NextResult, step, Self::next_result_done)
    }

    pub fn start_free_result(&mut self) -> Result<Progress<()>> {
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        let cursor = self.cursor_mut()?;
        cursor.invalidate_row();
        let step = cursor.raw_mut().free_start();
        self.settle(OperationKind::FreeResult, step, Self::free_result_done)
    }

    pub fn continue_free_result(&mut self, ready: Ready) -> Result<Progress<()>> {
        self.state.resumable_as(OperationKind::FreeResult)?;
        let step = self.cursor_mut()?.raw_mut().free_cont(ready.to_wait_status());
        self.settle(OperationKind::FreeResult, step, Self::free_result_done)
    }

    pub fn start_fetch_row(&mut self) -> Result<Progress<Fetched>> {
        self.state.ensure_idle()?;
        self.assert_nonblocking()?;
        let cursor = self.cursor_mut()?;
        cursor.ensure_fetchable()?;
        cursor.invalidate_row();
        let step = cursor.raw_mut().fetch_row_start();
        self.settle(OperationKind::FetchRow, step, Self::fetch_row_done)
    }

    pub fn continue_fetch_row(&mut self, ready: Ready) -> Result<Progress<Fetched>> {
        self.state.resumable_as(OperationKind::FetchRow)?;
        let step = self
            .cursor_mut()?
            .raw_mut()
            .fetch_row_cont(ready.to_wait_status());
        self.settle(OperationKind::FetchRow, step, Self::fetch_row_done)
    }

    /// Continue whichever operation is pending.
    pub fn resume(&mut self, ready: Ready) -> Result<Progress<Completion>> {
        let progress = match self.state.resumable()? {
            OperationKind::Connect => self
                .continue_connect(ready)?
                .map(|()| Completion::Connected),
            OperationKind::Close => self.continue_close(ready)?.map(|()| Completion::Closed),
            OperationKind::SelectDb => self
                .continue_select_db(ready)?
                .map(|()| Completion::DatabaseSelected),
            OperationKind::Query => self
                .continue_query(ready)?
                .map(|()| Completion::QueryAccepted),
            OperationKind::StoreResult => self
                .continue_store_result(ready)?
                .map(|()| Completion::ResultStored),
            OperationKind::NextResult => self
                .continue_next_result(ready)?
                .map(Completion::NextResult),
            OperationKind::FreeResult => self
                .continue_free_result(ready)?
                .map(|()| Completion::ResultFreed),
            OperationKind::FetchRow => self.continue_fetch_row(ready)?.map(Completion::Fetched),
        };
        Ok(progress)
    }

    // === Step handling ===

    /// Feed a library step to the state machine and attach the timeout.
    fn advance<T>(&mut self, kind: OperationKind, step: Step<T>) -> Result<Progress<T>> {
        match self.state.advance(kind, step)? {
            Progress::Pending(wait) => Ok(Progress::Pending(self.with_timeout(wait))),
            complete => Ok(complete),
        }
    }

    /// Like [`advance`](Self::advance), then interpret a finished step's output.
    fn settle<T, U>(
        &mut self,
        kind: OperationKind,
        step: Step<T>,
        done: fn(&mut Self, T) -> Result<U>,
    ) -> Result<Progress<U>> {
        match self.advance(kind, step)? {
            Progress::Complete(output) => done(self, output).map(Progress::Complete),
            Progress::Pending(wait) => Ok(Progress::Pending(wait)),
        }
    }

    fn with_timeout(&self, mut wait: Wait) -> Wait {
        if wait.ready.is_timeout() {
            wait.timeout = Some(self.timeout());
        }
        wait
    }

    fn connect_done(&mut self, ok: bool) -> Result<()> {
        if !ok {
            return Err(Error::Connection(self.client.error()));
        }
        self.connected = true;
        tracing::debug!("connected");
        Ok(())
    }

    fn close_done(&mut self, (): ()) -> Result<()> {
        self.mark_closed();
        Ok(())
    }

    fn select_db_done(&mut self, ret: i32) -> Result<()> {
        if ret != 0 {
            return Err(Error::DatabaseSelection(self.client.error()));
        }
        Ok(())
    }

    fn query_done(&mut self, ret: i32) -> Result<()> {
        if ret != 0 {
            return Err(Error::Query(self.client.error()));
        }
        Ok(())
    }

    fn store_result_done(&mut self, raw: Option<C::Result>) -> Result<()> {
        self.acquired(raw, ResultMode::Buffered)
    }

    fn acquired(&mut self, raw: Option<C::Result>, mode: ResultMode) -> Result<()> {
        let raw = raw.ok_or_else(|| Error::ResultAcquisition(self.client.error()))?;
        tracing::debug!(
            fields = raw.fields().len(),
            "acquired {:?} result",
            mode
        );
        self.result = Some(ResultCursor::new(raw, mode));
        Ok(())
    }

    fn next_result_done(&mut self, ret: i32) -> Result<bool> {
        if ret > 0 {
            return Err(Error::MultiResult(self.client.error()));
        }
        Ok(ret == 0)
    }

    fn free_result_done(&mut self, (): ()) -> Result<()> {
        self.result = None;
        tracing::debug!("freed result");
        Ok(())
    }

    fn fetch_row_done(&mut self, has_row: bool) -> Result<Fetched> {
        Ok(self.cursor_mut()?.fetched(has_row))
    }

    fn mark_closed(&mut self) {
        self.connected = false;
        tracing::debug!("closed");
    }

    // === Guards ===

    fn cursor_mut(&mut self) -> Result<&mut ResultCursor<C::Result>> {
        self.result.as_mut().ok_or(Error::NoResultHeld)
    }

    fn assert_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(Error::NotConnected)
        }
    }

    fn assert_nonblocking(&self) -> Result<()> {
        if self.nonblocking {
            Ok(())
        } else {
            Err(Error::NotNonBlocking)
        }
    }

    fn assert_have_result(&self) -> Result<()> {
        self.result().map(|_| ())
    }

    fn assert_dont_have_result(&self) -> Result<()> {
        if self.result.is_some() {
            Err(Error::ResultAlreadyHeld)
        } else {
            Ok(())
        }
    }
}

impl<C: RawClient> Drop for Conn<C> {
    fn drop(&mut self) {
        if let Some(kind) = self.state.pending_kind() {
            tracing::warn!("dropping MariaDB connection with {} pending", kind);
        }
    }
}
