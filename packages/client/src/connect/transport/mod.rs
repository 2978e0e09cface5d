//! Byte-stream transports the tunnel runs over
//!
//! A transport is an already connected, non-blocking endpoint. The tunnel
//! only ever writes, reads and peeks at it; it never shuts it down.

use std::io;
use std::rc::Rc;
use std::sync::Arc;

mod liveness;
mod tcp;
mod tunneled;

pub use liveness::peer_gone;
pub use tunneled::TunneledTransport;

/// Non-blocking byte-stream handle.
///
/// All methods take `&self` so shared handles (`Rc`, `Arc`) can be handed
/// to a tunnel while the caller keeps ownership of the socket.
pub trait Transport {
    /// Writes as many bytes of `buf` as the socket accepts without blocking.
    fn write_nonblocking(&self, buf: &[u8]) -> io::Result<usize>;

    /// Reads up to `buf.len()` bytes without blocking.
    fn read_nonblocking(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns true if the handle is no longer usable or the peer closed its
    /// side of the stream. Used to tell "would block" apart from "gone".
    fn is_dead(&self) -> bool;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn write_nonblocking(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_nonblocking(buf)
    }

    fn read_nonblocking(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_nonblocking(buf)
    }

    fn is_dead(&self) -> bool {
        (**self).is_dead()
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn write_nonblocking(&self, buf: &[u8]) -> io::Result<usize> {
        (**self).write_nonblocking(buf)
    }

    fn read_nonblocking(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_nonblocking(buf)
    }

    fn is_dead(&self) -> bool {
        (**self).is_dead()
    }
}
