//! # Tunnelkit client
//!
//! HTTP CONNECT tunnel establishment over already-connected, non-blocking
//! sockets. The tunnel is driven entirely by readiness callbacks from a
//! reactor, so no thread ever blocks while the proxy answers.
//!
//! ## Features
//!
//! - **Exactly-once results**: every attempt settles its future once, with the
//!   tunneled socket or a typed error
//! - **Short writes and chunked reads** handled without blocking
//! - **Pluggable reactors**: a mio-backed [`PollReactor`](connect::PollReactor)
//!   and a [`ManualReactor`](connect::ManualReactor) for deterministic tests
//! - **Abort hook** for external timers
//! - **Statistics** with lock-free counters
//! - **Response mapping middleware** for the client's interceptor chain
//!
//! ## Usage
//!
//! ```no_run
//! use std::net::TcpStream;
//! use std::rc::Rc;
//! use std::time::Duration;
//!
//! use tunnelkit_client::connect::{HttpTunneler, PollReactor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = TcpStream::connect("127.0.0.1:3128")?;
//! proxy.set_nonblocking(true)?;
//!
//! let reactor = Rc::new(PollReactor::new()?);
//! let tunneler = HttpTunneler::new(Rc::clone(&reactor));
//! let pending = tunneler.tunnel(Rc::new(proxy), "example.com:443");
//!
//! let tunnel = reactor.run(pending, Some(Duration::from_secs(10)))??;
//! println!("tunnel to {} is ready", tunnel.authority());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod connect;
pub mod error;
pub mod http;
pub mod middleware;
pub mod telemetry;

pub mod prelude;

pub use crate::prelude::*;
