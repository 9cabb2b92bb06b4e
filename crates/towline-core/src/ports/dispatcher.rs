//! Presentation dispatch port.
//!
//! Observer callbacks are not invoked on the facade's background context;
//! they are handed to this port, whose implementation decides where they
//! run (a UI event loop, a dedicated task, or inline for tests).

use tokio::runtime::Handle;

/// A deferred observer callback.
pub type ObserverCallback = Box<dyn FnOnce() + Send + 'static>;

/// Port for running observer callbacks on the presentation context.
///
/// `dispatch` must not block and must not run the callback on the caller's
/// stack unless the implementation is explicitly inline (tests, CLIs).
pub trait ObserverDispatcher: Send + Sync {
    /// Schedule a callback on the presentation context.
    fn dispatch(&self, callback: ObserverCallback);
}

/// Dispatcher that hands callbacks to a tokio runtime.
///
/// The default choice for async applications without a dedicated UI thread.
#[derive(Debug, Clone)]
pub struct SpawnDispatcher {
    handle: Handle,
}

impl SpawnDispatcher {
    /// Create a dispatcher for the current runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime, same as
    /// [`Handle::current`].
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    /// Create a dispatcher for an explicit runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl ObserverDispatcher for SpawnDispatcher {
    fn dispatch(&self, callback: ObserverCallback) {
        self.handle.spawn(async move {
            callback();
        });
    }
}

/// Dispatcher that runs callbacks inline on the calling context.
///
/// For tests and CLI contexts where delivery ordering matters more than
/// thread affinity.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl InlineDispatcher {
    /// Create an inline dispatcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ObserverDispatcher for InlineDispatcher {
    fn dispatch(&self, callback: ObserverCallback) {
        callback();
    }
}
