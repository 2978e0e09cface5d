//! mio-backed reactor
//!
//! Every file descriptor gets one token and at most one readable plus one
//! writable watcher. The fd's interest set is re-registered as watchers come
//! and go. mio is edge-triggered, so callbacks must drain until
//! `WouldBlock`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::pin::pin;
use std::task::{Context, Poll as TaskPoll};
use std::time::{Duration, Instant};

use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, trace};

use super::table::{WatcherTable, dispatch};
use crate::connect::transport::TunneledTransport;
use crate::connect::tunnel::TunnelFuture;
use crate::error::Result;
use super::{Callback, Reactor, Readiness, WatcherId};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Default, Clone, Copy)]
struct Slots {
    readable: Option<WatcherId>,
    writable: Option<WatcherId>,
}

impl Slots {
    fn get(&self, readiness: Readiness) -> Option<WatcherId> {
        match readiness {
            Readiness::Readable => self.readable,
            Readiness::Writable => self.writable,
        }
    }

    fn set(&mut self, readiness: Readiness, id: Option<WatcherId>) {
        match readiness {
            Readiness::Readable => self.readable = id,
            Readiness::Writable => self.writable = id,
        }
    }

    fn interest(&self) -> Option<Interest> {
        match (self.readable, self.writable) {
            (Some(_), Some(_)) => Some(Interest::READABLE.add(Interest::WRITABLE)),
            (Some(_), None) => Some(Interest::READABLE),
            (None, Some(_)) => Some(Interest::WRITABLE),
            (None, None) => None,
        }
    }
}

/// Single-threaded reactor over `mio::Poll`.
pub struct PollReactor {
    poll: RefCell<Poll>,
    events: RefCell<Events>,
    table: RefCell<WatcherTable<RawFd>>,
    sources: RefCell<HashMap<RawFd, Slots>>,
}

impl PollReactor {
    /// # Errors
    ///
    /// Returns an error if the OS poller cannot be created.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            poll: RefCell::new(Poll::new()?),
            events: RefCell::new(Events::with_capacity(EVENT_CAPACITY)),
            table: RefCell::new(WatcherTable::new()),
            sources: RefCell::new(HashMap::new()),
        })
    }

    /// Number of live watchers.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.table.borrow().len()
    }

    /// Waits for readiness once and runs the callbacks of ready watchers.
    ///
    /// Returns the number of callbacks run.
    ///
    /// # Errors
    ///
    /// Returns an error if polling fails for a reason other than a signal.
    pub fn turn(&self, timeout: Option<Duration>) -> io::Result<usize> {
        let ready: Vec<(RawFd, bool, bool)> = {
            let mut poll = self.poll.borrow_mut();
            let mut events = self.events.borrow_mut();
            match poll.poll(&mut events, timeout) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => return Ok(0),
                Err(e) => return Err(e),
            }
            events
                .iter()
                .filter_map(|event| {
                    let fd = RawFd::try_from(event.token().0).ok()?;
                    let readable =
                        event.is_readable() || event.is_read_closed() || event.is_error();
                    let writable =
                        event.is_writable() || event.is_write_closed() || event.is_error();
                    Some((fd, readable, writable))
                })
                .collect()
        };

        let mut dispatched = 0;
        for (fd, readable, writable) in ready {
            trace!(fd, readable, writable, "readiness event");
            if readable && self.fire_slot(fd, Readiness::Readable) {
                dispatched += 1;
            }
            if writable && self.fire_slot(fd, Readiness::Writable) {
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    /// Turns the reactor until `future` completes.
    ///
    /// `deadline` bounds the whole call, not a single turn. Hitting it drops
    /// `future` but leaves whatever it registered in place; use
    /// [`run`](Self::run) for tunnels so their watchers are cancelled too.
    ///
    /// # Errors
    ///
    /// Fails with `TimedOut` once `deadline` has elapsed, or with a generic
    /// error if the future is still pending but no watcher is left to wake it.
    pub fn block_on<F: Future>(
        &self,
        future: F,
        deadline: Option<Duration>,
    ) -> io::Result<F::Output> {
        let started = Instant::now();
        let mut future = pin!(future);
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);

        loop {
            if let TaskPoll::Ready(output) = future.as_mut().poll(&mut cx) {
                return Ok(output);
            }
            if self.outstanding() == 0 {
                return Err(io::Error::other(
                    "future is pending but the reactor has no watchers left",
                ));
            }

            let remaining = match deadline {
                Some(limit) => {
                    let elapsed = started.elapsed();
                    if elapsed >= limit {
                        return Err(io::Error::from(io::ErrorKind::TimedOut));
                    }
                    Some(limit - elapsed)
                }
                None => None,
            };
            self.turn(remaining)?;
        }
    }

    /// Drives one tunnel to completion, aborting it once `deadline` passes.
    ///
    /// On timeout the tunnel's watchers are cancelled and its socket handle
    /// released before this returns.
    ///
    /// # Errors
    ///
    /// Same as [`block_on`](Self::block_on).
    pub fn run<S>(
        &self,
        tunnel: TunnelFuture<S>,
        deadline: Option<Duration>,
    ) -> io::Result<Result<TunneledTransport<S>>> {
        let abort = tunnel.abort_handle();
        let authority = tunnel.authority().to_owned();
        let outcome = self.block_on(tunnel, deadline);
        if outcome.is_err() && abort.abort() {
            debug!(authority = %authority, "tunnel aborted after reactor deadline");
        }
        outcome
    }

    fn fire_slot(&self, fd: RawFd, readiness: Readiness) -> bool {
        let id = self
            .sources
            .borrow()
            .get(&fd)
            .and_then(|slots| slots.get(readiness));
        match id {
            Some(id) => dispatch(&self.table, id),
            None => false,
        }
    }

    fn watch(&self, fd: RawFd, readiness: Readiness, callback: Callback) -> io::Result<WatcherId> {
        let token = Token(usize::try_from(fd).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "negative file descriptor")
        })?);

        let mut sources = self.sources.borrow_mut();
        let slots = sources.entry(fd).or_default();
        if slots.get(readiness).is_some() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "descriptor already has a watcher for this readiness",
            ));
        }

        let was_registered = slots.interest().is_some();
        let id = self.table.borrow_mut().insert(fd, readiness, callback);
        slots.set(readiness, Some(id));
        let interest = slots
            .interest()
            .unwrap_or(Interest::READABLE.add(Interest::WRITABLE));

        let poll = self.poll.borrow();
        let registry = poll.registry();
        let result = if was_registered {
            registry.reregister(&mut SourceFd(&fd), token, interest)
        } else {
            registry.register(&mut SourceFd(&fd), token, interest)
        };
        drop(poll);

        if let Err(e) = result {
            slots.set(readiness, None);
            if slots.interest().is_none() {
                sources.remove(&fd);
            }
            drop(sources);
            let removed = self.table.borrow_mut().remove(id);
            drop(removed);
            return Err(e);
        }

        debug!(fd, ?readiness, %id, "watcher registered");
        Ok(id)
    }
}

impl<S: AsRawFd + ?Sized> Reactor<S> for PollReactor {
    fn register_readable(&self, source: &S, callback: Callback) -> io::Result<WatcherId> {
        self.watch(source.as_raw_fd(), Readiness::Readable, callback)
    }

    fn register_writable(&self, source: &S, callback: Callback) -> io::Result<WatcherId> {
        self.watch(source.as_raw_fd(), Readiness::Writable, callback)
    }

    fn cancel(&self, id: WatcherId) {
        let removed = self.table.borrow_mut().remove(id);
        let Some(watcher) = removed else {
            return;
        };
        let fd = watcher.key;

        let mut sources = self.sources.borrow_mut();
        if let Some(slots) = sources.get_mut(&fd) {
            slots.set(watcher.readiness, None);
            let poll = self.poll.borrow();
            let result = match (slots.interest(), usize::try_from(fd)) {
                (Some(interest), Ok(token)) => {
                    poll.registry()
                        .reregister(&mut SourceFd(&fd), Token(token), interest)
                }
                _ => {
                    sources.remove(&fd);
                    poll.registry().deregister(&mut SourceFd(&fd))
                }
            };
            if let Err(e) = result {
                // the descriptor may already be closed
                debug!(fd, error = %e, "failed to update poller after cancel");
            }
        }
        drop(sources);

        debug!(fd, %id, "watcher cancelled");
        drop(watcher);
    }
}
