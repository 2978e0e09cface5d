//! Read driver: collects the proxy's response chunk by chunk
//!
//! Reads are drained until the transport has nothing more to give, so the
//! driver works with edge-triggered reactors as well as level-triggered ones.

use std::io;

use tracing::trace;

use super::evaluate::Evaluation;
use super::session::{Phase, SessionRef};
use crate::connect::reactor::Reactor;
use crate::connect::transport::Transport;
use crate::error;

enum ReadStep {
    Data(usize),
    Retry,
    Idle,
    Dead(Option<io::Error>),
}

/// Runs on every readable event while the session is reading.
pub(crate) fn drive_read<S, R>(this: &SessionRef<S, R>)
where
    S: Transport + 'static,
    R: Reactor<S> + 'static,
{
    let mut guard = this.borrow_mut();
    let session = &mut *guard;

    loop {
        let step = {
            let Phase::Reading { socket, .. } = &session.phase else {
                return;
            };

            match socket.read_nonblocking(&mut session.chunk) {
                Ok(0) => zero_length(socket, None),
                Ok(n) => ReadStep::Data(n.min(session.chunk.len())),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => ReadStep::Retry,
                Err(e) => zero_length(socket, Some(e)),
            }
        };

        match step {
            ReadStep::Data(n) => {
                trace!(authority = %session.authority, read = n, "read proxy response bytes");
                session.stats.record_read(n);
                if let Evaluation::Settled = session.evaluate(n) {
                    return;
                }
            }
            ReadStep::Retry => {}
            // a live socket with nothing to read is a spurious wakeup
            ReadStep::Idle => return,
            ReadStep::Dead(cause) => {
                session.fail(error::died_reading(cause));
                return;
            }
        }
    }
}

fn zero_length<S: Transport>(socket: &S, cause: Option<io::Error>) -> ReadStep {
    if socket.is_dead() {
        ReadStep::Dead(cause)
    } else {
        ReadStep::Idle
    }
}
