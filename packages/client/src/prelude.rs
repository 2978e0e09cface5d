//! Canonical types re-exported at the crate root

pub use crate::config::{ConfigurationError, TunnelConfig, Validator};
#[cfg(unix)]
pub use crate::connect::PollReactor;
pub use crate::connect::{
    HttpTunneler, ManualReactor, ParseError, Reactor, Readiness, Transport, TunnelAbort,
    TunnelFuture, TunneledTransport, WatcherId,
};
pub use crate::error::{Error, Kind, Result, TunnelError};
pub use crate::http::{HttpRequest, HttpResponse};
pub use crate::middleware::{MapResponse, Middleware, MiddlewareChain};
pub use crate::telemetry::{TunnelStats, TunnelStatsSnapshot};
