//! Proxy connection establishment
//!
//! The tunnel state machine lives in [`tunnel`]; its collaborators are the
//! non-blocking [`transport`], the readiness [`reactor`] and the CONNECT
//! response [`parser`].

pub mod parser;
pub mod reactor;
pub mod transport;
pub mod tunnel;

pub use parser::{ParseError, ParsedResponse, ResponseParser};
#[cfg(unix)]
pub use reactor::PollReactor;
pub use reactor::{Callback, ManualReactor, Reactor, Readiness, WatcherId};
pub use transport::{Transport, TunneledTransport};
pub use tunnel::{HttpTunneler, TunnelAbort, TunnelFuture, connect_request};
