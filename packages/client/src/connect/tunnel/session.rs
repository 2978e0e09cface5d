//! Mutable state of one in-flight tunnel attempt
//!
//! A session is shared between the reactor callbacks through
//! `Rc<RefCell<_>>`. The callbacks are the only owners: once the session is
//! terminal and both watchers are cancelled, the reactor drops the callbacks
//! and with them the session. The session only holds a weak reference to its
//! reactor, so tearing the reactor down drops every pending session too.

use std::cell::RefCell;
use std::io;
use std::mem;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use super::completion::{Abort, Completion};
use super::read::drive_read;
use super::write::drive_write;
use crate::config::TunnelConfig;
use crate::connect::parser::ResponseParser;
use crate::connect::reactor::{Reactor, WatcherId};
use crate::connect::transport::{Transport, TunneledTransport};
use crate::error::{self, Error};
use crate::telemetry::TunnelStats;

pub(crate) type SessionRef<S, R> = Rc<RefCell<Session<S, R>>>;

/// Exactly one phase holds at a time; the socket lives in the active phase.
pub(crate) enum Phase<S> {
    Writing { socket: S, request: Bytes },
    Reading { socket: S, parser: ResponseParser },
    Done,
}

pub(crate) struct Session<S, R> {
    pub(crate) phase: Phase<S>,
    pub(crate) authority: String,
    pub(crate) reactor: Weak<R>,
    pub(crate) completion: Completion<TunneledTransport<S>>,
    pub(crate) read_watcher: Option<WatcherId>,
    pub(crate) write_watcher: Option<WatcherId>,
    pub(crate) chunk: Vec<u8>,
    pub(crate) config: TunnelConfig,
    pub(crate) stats: Arc<TunnelStats>,
}

impl<S, R> Session<S, R>
where
    S: Transport + 'static,
    R: Reactor<S> + 'static,
{
    pub(crate) fn new(
        socket: S,
        request: Bytes,
        authority: String,
        reactor: Weak<R>,
        completion: Completion<TunneledTransport<S>>,
        config: TunnelConfig,
        stats: Arc<TunnelStats>,
    ) -> Self {
        Self {
            phase: Phase::Writing { socket, request },
            authority,
            reactor,
            completion,
            read_watcher: None,
            write_watcher: None,
            chunk: Vec::new(),
            config,
            stats,
        }
    }

    pub(crate) fn is_terminal(&self) -> bool {
        self.completion.is_settled()
    }

    /// Registers the writable watcher unless one is already live.
    pub(crate) fn arm_writable(&mut self, this: &SessionRef<S, R>) {
        if self.write_watcher.is_some() {
            return;
        }
        let Phase::Writing { socket, .. } = &self.phase else {
            return;
        };

        let handle = Rc::clone(this);
        let registered = match self.reactor.upgrade() {
            Some(reactor) => {
                reactor.register_writable(socket, Box::new(move || drive_write(&handle)))
            }
            None => Err(reactor_gone()),
        };

        match registered {
            Ok(id) => {
                debug!(authority = %self.authority, %id, "waiting for socket to become writable");
                self.write_watcher = Some(id);
            }
            Err(e) => self.fail(error::died_writing(Some(e))),
        }
    }

    /// Ends the write phase: the request is fully on the wire.
    pub(crate) fn begin_reading(&mut self, this: &SessionRef<S, R>) {
        self.cancel_write_watcher();

        let Phase::Writing { socket, .. } = mem::replace(&mut self.phase, Phase::Done) else {
            return;
        };
        debug!(authority = %self.authority, "CONNECT request sent, awaiting proxy response");

        self.chunk = vec![0; self.config.read_chunk_size];
        self.phase = Phase::Reading {
            socket,
            parser: ResponseParser::for_connect(&self.config),
        };
        self.arm_readable(this);
    }

    fn arm_readable(&mut self, this: &SessionRef<S, R>) {
        if self.read_watcher.is_some() {
            return;
        }
        let Phase::Reading { socket, .. } = &self.phase else {
            return;
        };

        let handle = Rc::clone(this);
        let registered = match self.reactor.upgrade() {
            Some(reactor) => {
                reactor.register_readable(socket, Box::new(move || drive_read(&handle)))
            }
            None => Err(reactor_gone()),
        };

        match registered {
            Ok(id) => {
                debug!(authority = %self.authority, %id, "waiting for proxy response");
                self.read_watcher = Some(id);
            }
            Err(e) => self.fail(error::died_reading(Some(e))),
        }
    }

    pub(crate) fn cancel_write_watcher(&mut self) {
        if let Some(id) = self.write_watcher.take() {
            self.cancel(id);
        }
    }

    pub(crate) fn cancel_read_watcher(&mut self) {
        if let Some(id) = self.read_watcher.take() {
            self.cancel(id);
        }
    }

    fn cancel(&self, id: WatcherId) {
        if let Some(reactor) = self.reactor.upgrade() {
            reactor.cancel(id);
        }
    }

    /// Leaves the machine with no live watchers and no socket.
    fn finish(&mut self) -> Phase<S> {
        self.cancel_write_watcher();
        self.cancel_read_watcher();
        mem::replace(&mut self.phase, Phase::Done)
    }

    /// Terminal failure.
    pub(crate) fn fail(&mut self, error: Error) {
        drop(self.finish());
        self.stats.record_failure(error.kind());
        warn!(authority = %self.authority, error = %error, "proxy CONNECT failed");
        self.completion.fail(error.with_authority(self.authority.clone()));
    }

    /// Terminal success: hands the socket and any early origin bytes over.
    pub(crate) fn establish(&mut self) {
        let Phase::Reading { socket, parser } = self.finish() else {
            return;
        };
        let leftover = parser.into_remaining();
        self.stats.record_established();
        debug!(
            authority = %self.authority,
            leftover = leftover.len(),
            "proxy CONNECT established"
        );
        self.completion.resolve(TunneledTransport::new(
            socket,
            self.authority.clone(),
            leftover,
        ));
    }
}

fn reactor_gone() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "reactor has been dropped")
}

impl<S, R> Abort for RefCell<Session<S, R>>
where
    S: Transport + 'static,
    R: Reactor<S> + 'static,
{
    fn abort(&self) -> bool {
        let Ok(mut session) = self.try_borrow_mut() else {
            return false;
        };
        if session.is_terminal() {
            return false;
        }
        session.fail(error::aborted());
        true
    }
}
