//! Readiness reactors
//!
//! A reactor invokes a callback whenever a socket becomes readable or
//! writable. Registrations persist until cancelled; callbacks run on the
//! reactor's thread and may register or cancel watchers while they run.

use std::fmt;
use std::io;

mod manual;
#[cfg(unix)]
mod poll;
mod table;

pub use manual::ManualReactor;
#[cfg(unix)]
pub use poll::PollReactor;

/// Callback run on every readiness event of a registration.
pub type Callback = Box<dyn FnMut()>;

/// Identifies one readiness registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(u64);

impl WatcherId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watcher#{}", self.0)
    }
}

/// Direction a watcher waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readiness {
    Readable,
    Writable,
}

/// Registers readiness callbacks for sockets of type `S`.
pub trait Reactor<S: ?Sized> {
    /// Calls `callback` each time `source` becomes readable.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the source cannot be watched.
    fn register_readable(&self, source: &S, callback: Callback) -> io::Result<WatcherId>;

    /// Calls `callback` each time `source` becomes writable.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the source cannot be watched.
    fn register_writable(&self, source: &S, callback: Callback) -> io::Result<WatcherId>;

    /// Drops a registration. Unknown ids are ignored.
    fn cancel(&self, id: WatcherId);
}
