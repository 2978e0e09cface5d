//! Reactor that only fires when told to
//!
//! Tests drive a tunnel step by step with it: every registration is
//! recorded, and events are delivered through `fire_readable` /
//! `fire_writable` instead of an OS poller.

use std::cell::{Cell, RefCell};
use std::io;

use super::table::{WatcherTable, dispatch};
use super::{Callback, Reactor, Readiness, WatcherId};

#[derive(Default)]
struct RegistrationLog {
    readable: Cell<usize>,
    writable: Cell<usize>,
    cancelled: Cell<usize>,
}

pub struct ManualReactor {
    table: RefCell<WatcherTable<()>>,
    log: RegistrationLog,
    refuse_next: Cell<Option<io::ErrorKind>>,
}

impl Default for ManualReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualReactor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RefCell::new(WatcherTable::new()),
            log: RegistrationLog::default(),
            refuse_next: Cell::new(None),
        }
    }

    /// Number of registrations currently live.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.table.borrow().len()
    }

    /// Live registrations of one kind, oldest first.
    #[must_use]
    pub fn live(&self, readiness: Readiness) -> Vec<WatcherId> {
        self.table.borrow().ids(readiness)
    }

    /// Registrations of one kind ever accepted, cancelled ones included.
    #[must_use]
    pub fn registrations(&self, readiness: Readiness) -> usize {
        match readiness {
            Readiness::Readable => self.log.readable.get(),
            Readiness::Writable => self.log.writable.get(),
        }
    }

    /// Number of `cancel` calls that removed a live registration.
    #[must_use]
    pub fn cancellations(&self) -> usize {
        self.log.cancelled.get()
    }

    /// Makes the next registration fail with `kind`.
    pub fn refuse_next_registration(&self, kind: io::ErrorKind) {
        self.refuse_next.set(Some(kind));
    }

    /// Runs the callback of one registration.
    pub fn fire(&self, id: WatcherId) -> bool {
        dispatch(&self.table, id)
    }

    /// Delivers a readable event to every live readable watcher.
    pub fn fire_readable(&self) -> usize {
        self.fire_all(Readiness::Readable)
    }

    /// Delivers a writable event to every live writable watcher.
    pub fn fire_writable(&self) -> usize {
        self.fire_all(Readiness::Writable)
    }

    fn fire_all(&self, readiness: Readiness) -> usize {
        let ids = self.table.borrow().ids(readiness);
        ids.into_iter().filter(|id| self.fire(*id)).count()
    }

    fn register(&self, readiness: Readiness, callback: Callback) -> io::Result<WatcherId> {
        if let Some(kind) = self.refuse_next.take() {
            return Err(io::Error::new(kind, "registration refused"));
        }

        let counter = match readiness {
            Readiness::Readable => &self.log.readable,
            Readiness::Writable => &self.log.writable,
        };
        counter.set(counter.get() + 1);

        Ok(self.table.borrow_mut().insert((), readiness, callback))
    }
}

impl<S: ?Sized> Reactor<S> for ManualReactor {
    fn register_readable(&self, _source: &S, callback: Callback) -> io::Result<WatcherId> {
        self.register(Readiness::Readable, callback)
    }

    fn register_writable(&self, _source: &S, callback: Callback) -> io::Result<WatcherId> {
        self.register(Readiness::Writable, callback)
    }

    fn cancel(&self, id: WatcherId) {
        let removed = self.table.borrow_mut().remove(id);
        if removed.is_some() {
            self.log.cancelled.set(self.log.cancelled.get() + 1);
        }
        drop(removed);
    }
}
