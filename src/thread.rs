//! Per-thread client library initialization.

use std::marker::PhantomData;

use crate::error::{Error, Result};
use crate::raw::ClientLibrary;

/// Keeps the library's per-thread state alive for the current thread.
///
/// Create one on every thread that uses connections, before the first
/// connection. Dropping it releases the thread state. The guard is not
/// `Send`: it must be dropped on the thread that created it.
#[must_use = "the thread state is released when the guard is dropped"]
pub struct ThreadGuard<L: ClientLibrary> {
    _library: PhantomData<L>,
    _not_send: PhantomData<*const ()>,
}

impl<L: ClientLibrary> ThreadGuard<L> {
    pub fn init() -> Result<Self> {
        if !L::thread_init() {
            return Err(Error::ThreadInit);
        }
        tracing::trace!("client library thread state initialized");
        Ok(Self {
            _library: PhantomData,
            _not_send: PhantomData,
        })
    }
}

impl<L: ClientLibrary> Drop for ThreadGuard<L> {
    fn drop(&mut self) {
        L::thread_end();
        tracing::trace!("client library thread state released");
    }
}

/// Whether the library was built thread-safe.
pub fn thread_safe<L: ClientLibrary>() -> bool {
    L::thread_safe()
}
