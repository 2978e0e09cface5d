//! `Transport` for std and mio TCP streams
//!
//! Both must already be in non-blocking mode.

use std::io::{self, Read, Write};

use super::Transport;
use super::liveness::peer_gone;

impl Transport for std::net::TcpStream {
    fn write_nonblocking(&self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn read_nonblocking(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&*self).read(buf)
    }

    fn is_dead(&self) -> bool {
        let mut byte = [0u8; 1];
        peer_gone(self.take_error(), self.peek(&mut byte))
    }
}

impl Transport for mio::net::TcpStream {
    fn write_nonblocking(&self, buf: &[u8]) -> io::Result<usize> {
        (&*self).write(buf)
    }

    fn read_nonblocking(&self, buf: &mut [u8]) -> io::Result<usize> {
        (&*self).read(buf)
    }

    fn is_dead(&self) -> bool {
        let mut byte = [0u8; 1];
        peer_gone(self.take_error(), self.peek(&mut byte))
    }
}
