//! Redispatching outcomes onto the caller's context

use tokio::runtime::Handle;

use crate::{Error, Result};

/// A context-bound executor that outcome delivery is posted onto.
///
/// The background task hands the finished outcome to [`post`](Self::post)
/// and moves on; it never waits for the callback to run.
pub trait Dispatcher: Send + Sync + 'static {
    /// Schedule `task` to run on the target context
    fn post(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Posts callbacks onto a tokio runtime
#[derive(Clone)]
pub struct RuntimeDispatcher {
    handle: Handle,
}

impl RuntimeDispatcher {
    /// Dispatch onto the runtime the calling code is running on
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| {
            Error::Internal("RuntimeDispatcher::current requires a running tokio runtime".to_string())
        })?;
        Ok(Self { handle })
    }

    /// Dispatch onto a specific runtime handle
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Dispatcher for RuntimeDispatcher {
    fn post(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        self.handle.spawn(async move { task() });
    }
}

/// Runs callbacks immediately on the posting thread.
///
/// Collapses the context hand-off, so the callback fires on the background
/// task itself. Intended for tests and plain worker binaries that have no
/// context to return to.
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn post(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        task()
    }
}
