//! Transport wrapper returned once the proxy accepted the CONNECT
//!
//! Holding a `TunneledTransport` is the proof that bytes now flow straight to
//! the origin, so TLS (or any other protocol) can start on it immediately.

use std::fmt;
use std::io::{self, Read, Write};

use bytes::{Buf, Bytes};

use super::Transport;

/// A transport whose proxy accepted a CONNECT request.
pub struct TunneledTransport<S> {
    inner: S,
    authority: String,
    leftover: Bytes,
}

impl<S> TunneledTransport<S> {
    pub(crate) fn new(inner: S, authority: String, leftover: Bytes) -> Self {
        Self {
            inner,
            authority,
            leftover,
        }
    }

    /// The `host:port` the proxy is relaying to.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Origin bytes that arrived in the same read as the proxy's response head.
    #[must_use]
    pub fn leftover(&self) -> &Bytes {
        &self.leftover
    }

    #[must_use]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Drops any leftover bytes and returns the raw socket.
    pub fn into_inner(self) -> S {
        self.into_parts().0
    }

    /// Splits into socket, authority and leftover bytes.
    pub fn into_parts(self) -> (S, String, Bytes) {
        (self.inner, self.authority, self.leftover)
    }
}

impl<S: Transport> Read for TunneledTransport<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.leftover.has_remaining() {
            let n = self.leftover.len().min(buf.len());
            self.leftover.copy_to_slice(&mut buf[..n]);
            return Ok(n);
        }
        self.inner.read_nonblocking(buf)
    }
}

impl<S: Transport> Write for TunneledTransport<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write_nonblocking(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S> fmt::Debug for TunneledTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunneledTransport")
            .field("authority", &self.authority)
            .field("leftover", &self.leftover.len())
            .finish_non_exhaustive()
    }
}
