//! Core `TunnelBuilder` structure and fluent configuration methods

use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;
use tunnelkit_client::config::{ConfigurationError, TunnelConfig};
use tunnelkit_client::connect::HttpTunneler;
use tunnelkit_client::telemetry::TunnelStats;

/// Fluent builder for an [`HttpTunneler`] bound to one reactor.
#[derive(Debug)]
pub struct TunnelBuilder<R> {
    reactor: Rc<R>,
    config: TunnelConfig,
    stats: Option<Arc<TunnelStats>>,
}

impl<R: 'static> TunnelBuilder<R> {
    #[must_use]
    pub fn new(reactor: Rc<R>) -> Self {
        Self {
            reactor,
            config: TunnelConfig::default(),
            stats: None,
        }
    }

    /// Bytes requested per non-blocking read of the proxy's response.
    #[must_use]
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.config = self.config.with_read_chunk_size(size);
        self
    }

    /// Largest response head accepted from the proxy.
    #[must_use]
    pub fn max_response_head(mut self, size: usize) -> Self {
        self.config = self.config.with_max_response_head(size);
        self
    }

    #[must_use]
    pub fn max_headers(mut self, count: usize) -> Self {
        self.config = self.config.with_max_headers(count);
        self
    }

    /// Replaces the whole configuration.
    #[must_use]
    pub fn config(mut self, config: TunnelConfig) -> Self {
        self.config = config;
        self
    }

    /// Reports into a shared statistics sink.
    #[must_use]
    pub fn stats(mut self, stats: Arc<TunnelStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// # Errors
    ///
    /// Returns a `ConfigurationError` if any configured value is out of range.
    pub fn build(self) -> Result<HttpTunneler<R>, ConfigurationError> {
        debug!(config = ?self.config, "building tunneler");
        let tunneler = HttpTunneler::with_config(self.reactor, self.config)?;
        Ok(match self.stats {
            Some(stats) => tunneler.with_stats(stats),
            None => tunneler,
        })
    }
}
