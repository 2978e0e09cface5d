//! Tunnel establishment statistics with cache-padded atomic counters
//!
//! One `TunnelStats` is shared by a tunneler and every session it starts.
//! Sessions run on a single reactor thread, but the counters are atomic so a
//! monitoring thread can take snapshots at any time.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::error::Kind;

/// Thread-safe tunnel statistics with cache-padded atomic counters
#[derive(Debug, Default)]
pub struct TunnelStats {
    /// Number of `tunnel()` calls
    pub attempts: CachePadded<AtomicUsize>,
    /// Number of tunnels the proxy accepted with `200`
    pub established: CachePadded<AtomicUsize>,
    /// Failures while the CONNECT request was being written
    pub died_writing: CachePadded<AtomicUsize>,
    /// Failures while the proxy's response was awaited
    pub died_reading: CachePadded<AtomicUsize>,
    /// Proxies answering with a status other than `200`
    pub unexpected_status: CachePadded<AtomicUsize>,
    /// Responses the parser rejected
    pub malformed: CachePadded<AtomicUsize>,
    /// Attempts stopped through an abort handle
    pub aborted: CachePadded<AtomicUsize>,
    /// Request bytes accepted by transports
    pub bytes_written: CachePadded<AtomicU64>,
    /// Response bytes read from transports
    pub bytes_read: CachePadded<AtomicU64>,
}

/// Immutable snapshot of tunnel statistics at a point in time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunnelStatsSnapshot {
    pub attempts: usize,
    pub established: usize,
    pub died_writing: usize,
    pub died_reading: usize,
    pub unexpected_status: usize,
    pub malformed: usize,
    pub aborted: usize,
    pub bytes_written: u64,
    pub bytes_read: u64,
}

impl TunnelStatsSnapshot {
    /// Attempts that ended in any kind of failure.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.died_writing
            + self.died_reading
            + self.unexpected_status
            + self.malformed
            + self.aborted
    }
}

impl TunnelStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_established(&self) {
        self.established.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_written(&self, bytes: usize) {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_read(&self, bytes: usize) {
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, kind: &Kind) {
        let counter = match kind {
            Kind::TransportDiedWriting => &self.died_writing,
            Kind::TransportDiedReading => &self.died_reading,
            Kind::UnexpectedStatus(_) => &self.unexpected_status,
            Kind::MalformedResponse => &self.malformed,
            Kind::Aborted => &self.aborted,
            // never settled through a session, nothing to count
            Kind::Abandoned => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Create a snapshot of the current statistics.
    #[inline]
    pub fn snapshot(&self) -> TunnelStatsSnapshot {
        TunnelStatsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            established: self.established.load(Ordering::Relaxed),
            died_writing: self.died_writing.load(Ordering::Relaxed),
            died_reading: self.died_reading.load(Ordering::Relaxed),
            unexpected_status: self.unexpected_status.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}
