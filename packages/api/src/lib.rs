//! Tunnelkit public API
//!
//! HTTP CONNECT tunnels over non-blocking sockets, driven by readiness
//! callbacks. Configure a tunneler with the fluent [`Tunnel`] entry point,
//! then call [`HttpTunneler::tunnel`] once per proxied socket.
//!
//! ```no_run
//! use std::net::TcpStream;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use tunnelkit::{PollReactor, Tunnel};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reactor = Rc::new(PollReactor::new()?);
//! let tunneler = Tunnel::builder(Rc::clone(&reactor))
//!     .read_chunk_size(4096)
//!     .build()?;
//!
//! let proxy = TcpStream::connect("127.0.0.1:3128")?;
//! proxy.set_nonblocking(true)?;
//! let pending = tunneler.tunnel(Rc::new(proxy), "example.com:443");
//!
//! match reactor.run(pending, Some(Duration::from_secs(10)))? {
//!     Ok(tunnel) => println!("tunnel to {} is ready", tunnel.authority()),
//!     Err(e) if e.is_client() => println!("proxy refused: {e}"),
//!     Err(e) => println!("proxy connection failed: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

use std::rc::Rc;

pub mod builder;

pub use builder::*;

pub use tunnelkit_client::{
    ConfigurationError, Error, HttpRequest, HttpResponse, HttpTunneler, Kind, ManualReactor,
    MapResponse, Middleware, MiddlewareChain, ParseError, Reactor, Readiness, Result, Transport,
    TunnelAbort, TunnelConfig, TunnelError, TunnelFuture, TunnelStats, TunnelStatsSnapshot,
    TunneledTransport, WatcherId,
};
#[cfg(unix)]
pub use tunnelkit_client::PollReactor;

/// Main entry point providing static builder methods
pub struct Tunnel;

impl Tunnel {
    /// Starts configuring a tunneler bound to `reactor`.
    #[must_use]
    pub fn builder<R: 'static>(reactor: Rc<R>) -> TunnelBuilder<R> {
        TunnelBuilder::new(reactor)
    }

    /// A tunneler with the default configuration.
    #[must_use]
    pub fn over<R: 'static>(reactor: Rc<R>) -> HttpTunneler<R> {
        HttpTunneler::new(reactor)
    }
}
