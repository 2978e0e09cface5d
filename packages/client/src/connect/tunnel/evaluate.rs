//! Response evaluator: decides the outcome once a head is parsed

use http::StatusCode;
use tracing::debug;

use super::session::{Phase, Session};
use crate::connect::reactor::Reactor;
use crate::connect::transport::Transport;
use crate::error;

pub(crate) enum Evaluation {
    /// More bytes are needed; the read watcher stays armed.
    Pending,
    /// The result has been resolved or failed.
    Settled,
}

impl<S, R> Session<S, R>
where
    S: Transport + 'static,
    R: Reactor<S> + 'static,
{
    /// Feeds the first `len` bytes of the read chunk to the parser and
    /// settles the session if a full response head is available.
    pub(crate) fn evaluate(&mut self, len: usize) -> Evaluation {
        let Phase::Reading { parser, .. } = &mut self.phase else {
            return Evaluation::Settled;
        };

        parser.feed(&self.chunk[..len]);
        let parsed = match parser.try_parse() {
            Ok(None) => return Evaluation::Pending,
            Ok(Some(parsed)) => parsed,
            Err(e) => {
                self.fail(error::malformed_response(e));
                return Evaluation::Settled;
            }
        };

        debug!(
            authority = %self.authority,
            status = parsed.status.as_u16(),
            reason = %parsed.reason,
            "proxy answered CONNECT"
        );

        if parsed.status == StatusCode::OK {
            self.establish();
        } else {
            self.fail(error::unexpected_status(parsed.status));
        }
        Evaluation::Settled
    }
}
