//! HTTP CONNECT tunnel establishment over non-blocking sockets
//!
//! `HttpTunneler::tunnel` writes `CONNECT <authority> HTTP/1.1\r\n\r\n` to an
//! already connected socket and waits for the proxy's answer, entirely from
//! reactor callbacks. The returned future settles exactly once:
//!
//! - `200` yields a [`TunneledTransport`] around the original socket,
//! - any other status, unparseable bytes, or a socket that goes away yields
//!   a typed [`Error`](crate::Error).
//!
//! Progress is an explicit state machine (`Writing` -> `Reading` -> `Done`).
//! The request is never written and read concurrently, and at most one
//! readable and one writable watcher are live at any time. Every exit path
//! cancels them before the future settles.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

mod completion;
mod evaluate;
mod read;
mod session;
mod write;

pub use completion::{TunnelAbort, TunnelFuture};

use completion::{Abort, Completion};
use session::Session;
use write::drive_write;

use crate::config::{ConfigResult, TunnelConfig, Validator};
use crate::connect::reactor::Reactor;
use crate::connect::transport::{Transport, TunneledTransport};
use crate::telemetry::TunnelStats;

/// Builds the exact request line sent to the proxy. No headers are added.
#[must_use]
pub fn connect_request(authority: &str) -> Bytes {
    Bytes::from(format!("CONNECT {authority} HTTP/1.1\r\n\r\n"))
}

/// Starts CONNECT tunnels on sockets watched by one reactor.
pub struct HttpTunneler<R> {
    reactor: Rc<R>,
    config: TunnelConfig,
    stats: Arc<TunnelStats>,
}

impl<R> Clone for HttpTunneler<R> {
    fn clone(&self) -> Self {
        Self {
            reactor: Rc::clone(&self.reactor),
            config: self.config.clone(),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<R: 'static> HttpTunneler<R> {
    /// A tunneler with the default configuration.
    #[must_use]
    pub fn new(reactor: Rc<R>) -> Self {
        Self {
            reactor,
            config: TunnelConfig::default(),
            stats: Arc::new(TunnelStats::new()),
        }
    }

    /// A tunneler with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if `config` does not validate.
    pub fn with_config(reactor: Rc<R>, config: TunnelConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            reactor,
            config,
            stats: Arc::new(TunnelStats::new()),
        })
    }

    /// Shares an existing statistics sink instead of a private one.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<TunnelStats>) -> Self {
        self.stats = stats;
        self
    }

    #[must_use]
    pub fn config(&self) -> &TunnelConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &Arc<TunnelStats> {
        &self.stats
    }

    #[must_use]
    pub fn reactor(&self) -> &Rc<R> {
        &self.reactor
    }

    /// Asks the proxy behind `socket` to open a tunnel to `authority`.
    ///
    /// `socket` must already be connected and non-blocking. `authority` is
    /// inserted into the request line verbatim. The first write is attempted
    /// before this returns, so a socket that is already dead fails the
    /// future immediately. Everything after that happens in reactor
    /// callbacks.
    pub fn tunnel<S>(&self, socket: S, authority: &str) -> TunnelFuture<S>
    where
        S: Transport + 'static,
        R: Reactor<S>,
    {
        self.stats.record_attempt();
        debug!(authority, "starting proxy CONNECT");

        let (completion, receiver) = Completion::<TunneledTransport<S>>::pair();
        let session = Rc::new(RefCell::new(Session::new(
            socket,
            connect_request(authority),
            authority.to_owned(),
            Rc::downgrade(&self.reactor),
            completion,
            self.config.clone(),
            Arc::clone(&self.stats),
        )));

        let weak: Weak<RefCell<Session<S, R>>> = Rc::downgrade(&session);
        let abort = TunnelAbort::new(weak as Weak<dyn Abort>);

        drive_write(&session);

        TunnelFuture::new(receiver, abort, authority.to_owned())
    }
}
