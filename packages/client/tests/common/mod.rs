//! Scripted in-memory transport shared by the tunnel integration tests

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;

use tunnelkit_client::Transport;

pub const AUTHORITY: &str = "example.com:443";
pub const REQUEST: &[u8] = b"CONNECT example.com:443 HTTP/1.1\r\n\r\n";

#[derive(Debug)]
pub enum WriteStep {
    /// Accept at most `n` bytes.
    Accept(usize),
    WouldBlock,
    Interrupted,
    Fail(io::ErrorKind),
}

#[derive(Debug)]
pub enum ReadStep {
    Data(Vec<u8>),
    WouldBlock,
    Eof,
    Interrupted,
    Fail(io::ErrorKind),
}

/// Non-blocking transport whose behaviour is queued up front.
///
/// Once a script runs out, writes accept everything and reads would block.
#[derive(Default)]
pub struct ScriptedTransport {
    writes: RefCell<VecDeque<WriteStep>>,
    reads: RefCell<VecDeque<ReadStep>>,
    written: RefCell<Vec<u8>>,
    offered: RefCell<Vec<usize>>,
    read_calls: Cell<usize>,
    dead: Cell<bool>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_write(&self, step: WriteStep) -> &Self {
        self.writes.borrow_mut().push_back(step);
        self
    }

    pub fn on_read(&self, step: ReadStep) -> &Self {
        self.reads.borrow_mut().push_back(step);
        self
    }

    pub fn respond(&self, bytes: &[u8]) -> &Self {
        self.on_read(ReadStep::Data(bytes.to_vec()))
    }

    pub fn kill(&self) {
        self.dead.set(true);
    }

    /// Everything accepted by `write_nonblocking` so far.
    pub fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    /// Length of the buffer handed to each `write_nonblocking` call.
    pub fn offered(&self) -> Vec<usize> {
        self.offered.borrow().clone()
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.get()
    }
}

impl Transport for ScriptedTransport {
    fn write_nonblocking(&self, buf: &[u8]) -> io::Result<usize> {
        self.offered.borrow_mut().push(buf.len());
        if self.dead.get() {
            return Err(io::ErrorKind::BrokenPipe.into());
        }

        let step = self.writes.borrow_mut().pop_front();
        let accepted = match step {
            None => buf.len(),
            Some(WriteStep::Accept(n)) => n.min(buf.len()),
            Some(WriteStep::WouldBlock) => return Err(io::ErrorKind::WouldBlock.into()),
            Some(WriteStep::Interrupted) => return Err(io::ErrorKind::Interrupted.into()),
            Some(WriteStep::Fail(kind)) => {
                self.dead.set(true);
                return Err(kind.into());
            }
        };
        self.written.borrow_mut().extend_from_slice(&buf[..accepted]);
        Ok(accepted)
    }

    fn read_nonblocking(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_calls.set(self.read_calls.get() + 1);

        let step = self.reads.borrow_mut().pop_front();
        match step {
            None | Some(ReadStep::WouldBlock) => {
                if self.dead.get() {
                    Ok(0)
                } else {
                    Err(io::ErrorKind::WouldBlock.into())
                }
            }
            Some(ReadStep::Data(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    let rest = bytes.split_off(n);
                    self.reads.borrow_mut().push_front(ReadStep::Data(rest));
                }
                Ok(n)
            }
            Some(ReadStep::Eof) => {
                self.dead.set(true);
                Ok(0)
            }
            Some(ReadStep::Interrupted) => Err(io::ErrorKind::Interrupted.into()),
            Some(ReadStep::Fail(kind)) => {
                self.dead.set(true);
                Err(kind.into())
            }
        }
    }

    fn is_dead(&self) -> bool {
        self.dead.get()
    }
}
