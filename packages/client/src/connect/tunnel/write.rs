//! Write driver: pushes the CONNECT request out without blocking

use std::io;

use bytes::Buf;
use tracing::trace;

use super::session::{Phase, SessionRef};
use crate::connect::reactor::Reactor;
use crate::connect::transport::Transport;
use crate::error;

enum WriteStep {
    Complete,
    Partial,
    Blocked,
    Dead(Option<io::Error>),
}

/// Runs once synchronously from `tunnel()` and then on every writable event.
pub(crate) fn drive_write<S, R>(this: &SessionRef<S, R>)
where
    S: Transport + 'static,
    R: Reactor<S> + 'static,
{
    let mut guard = this.borrow_mut();
    let session = &mut *guard;

    let step = loop {
        let Phase::Writing { socket, request } = &mut session.phase else {
            return;
        };

        let remaining = request.len();
        // a failed write counts as zero bytes; liveness decides what it means
        let (written, cause) = match socket.write_nonblocking(&request[..]) {
            Ok(n) => (n.min(remaining), None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => (0, Some(e)),
        };
        trace!(authority = %session.authority, written, remaining, "wrote CONNECT request bytes");

        if written > 0 {
            session.stats.record_written(written);
        }

        break if written == remaining {
            WriteStep::Complete
        } else if written > 0 {
            request.advance(written);
            WriteStep::Partial
        } else if socket.is_dead() {
            WriteStep::Dead(cause)
        } else {
            WriteStep::Blocked
        };
    };

    match step {
        WriteStep::Complete => session.begin_reading(this),
        WriteStep::Partial | WriteStep::Blocked => session.arm_writable(this),
        WriteStep::Dead(cause) => session.fail(error::died_writing(cause)),
    }
}
