//! Glue between a pending connection and an event loop.

use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use crate::conn::Conn;
use crate::error::{Error, Result};
use crate::raw::RawClient;
use crate::ready::Ready;
use crate::state::{Completion, Progress, Wait};

/// An event loop that can watch a socket.
pub trait Reactor {
    /// Registration handle.
    type Watch;

    /// Watch `fd` for `interest` (read and/or write) and, if given, a
    /// timeout. `interest` may be empty for a timeout-only wait.
    fn register(
        &mut self,
        fd: RawFd,
        interest: Ready,
        timeout: Option<Duration>,
    ) -> io::Result<Self::Watch>;

    fn deregister(&mut self, watch: Self::Watch);
}

/// Keeps at most one reactor watch for a connection's pending operation.
pub struct EventBinder<R: Reactor> {
    armed: Option<(Wait, R::Watch)>,
}

impl<R: Reactor> Default for EventBinder<R> {
    fn default() -> Self {
        Self { armed: None }
    }
}

impl<R: Reactor> EventBinder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// The wait the current watch was registered for.
    pub fn armed_wait(&self) -> Option<Wait> {
        self.armed.as_ref().map(|(wait, _)| *wait)
    }

    /// Register a watch for `wait` on the connection's socket.
    pub fn arm<C: RawClient>(
        &mut self,
        reactor: &mut R,
        conn: &Conn<C>,
        wait: Wait,
    ) -> Result<()> {
        if self.armed.is_some() {
            return Err(Error::InvalidState("event binder already armed".into()));
        }
        let watch = reactor.register(conn.socket(), wait.ready.io(), wait.timeout)?;
        tracing::trace!("armed {:?}", wait.ready);
        self.armed = Some((wait, watch));
        Ok(())
    }

    /// Arm for a pending `progress`; pass a complete one through.
    pub fn bind<C: RawClient, T>(
        &mut self,
        reactor: &mut R,
        conn: &Conn<C>,
        progress: Progress<T>,
    ) -> Result<Option<T>> {
        match progress {
            Progress::Complete(output) => Ok(Some(output)),
            Progress::Pending(wait) => {
                self.arm(reactor, conn, wait)?;
                Ok(None)
            }
        }
    }

    /// The watch fired with `fired`: resume the pending operation.
    ///
    /// The watch is dropped when the operation completes or fails, replaced
    /// when the operation waits for something else, and kept otherwise.
    ///
    /// A replacement watch is registered before the old one is dropped. If
    /// that registration fails the old watch stays armed while the operation
    /// is still pending on `conn.wait()`; `disarm` and `arm` again to retry.
    pub fn fire<C: RawClient>(
        &mut self,
        reactor: &mut R,
        conn: &mut Conn<C>,
        fired: Ready,
    ) -> Result<Progress<Completion>> {
        let progress = match conn.resume(fired) {
            Ok(progress) => progress,
            Err(e) => {
                self.disarm(reactor);
                return Err(e);
            }
        };

        match progress {
            Progress::Complete(completion) => {
                self.disarm(reactor);
                Ok(Progress::Complete(completion))
            }
            Progress::Pending(wait) => {
                if self.armed_wait() != Some(wait) {
                    let watch = reactor.register(conn.socket(), wait.ready.io(), wait.timeout)?;
                    if let Some((old, stale)) = self.armed.replace((wait, watch)) {
                        reactor.deregister(stale);
                        tracing::trace!("rearmed {:?} -> {:?}", old.ready, wait.ready);
                    }
                }
                Ok(Progress::Pending(wait))
            }
        }
    }

    /// Drop the watch, if any.
    pub fn disarm(&mut self, reactor: &mut R) {
        if let Some((wait, watch)) = self.armed.take() {
            reactor.deregister(watch);
            tracing::trace!("disarmed {:?}", wait.ready);
        }
    }
}
