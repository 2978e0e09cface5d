//! Tunnel establishment configuration

use super::validation::{ConfigResult, ConfigValidator, Validator};

/// Bytes requested from the socket per read attempt.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 32_768;

/// Largest response head accepted from a proxy before giving up.
pub const DEFAULT_MAX_RESPONSE_HEAD: usize = 16_384;

/// Header slots handed to the response parser.
pub const DEFAULT_MAX_HEADERS: usize = 64;

const MAX_READ_CHUNK_SIZE: usize = 16 * 1024 * 1024;
const MAX_RESPONSE_HEAD_LIMIT: usize = 1024 * 1024;
const MAX_HEADER_SLOTS: usize = 1024;

/// Runtime configuration for [`HttpTunneler`](crate::connect::HttpTunneler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Upper bound of a single non-blocking read.
    pub read_chunk_size: usize,
    /// Upper bound of the proxy's status line plus headers.
    pub max_response_head: usize,
    /// Number of headers the parser can hold.
    pub max_headers: usize,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            max_response_head: DEFAULT_MAX_RESPONSE_HEAD,
            max_headers: DEFAULT_MAX_HEADERS,
        }
    }
}

impl TunnelConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    #[must_use]
    pub fn with_max_response_head(mut self, size: usize) -> Self {
        self.max_response_head = size;
        self
    }

    #[must_use]
    pub fn with_max_headers(mut self, count: usize) -> Self {
        self.max_headers = count;
        self
    }
}

impl Validator for TunnelConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_buffer_size(
            self.read_chunk_size,
            MAX_READ_CHUNK_SIZE,
            "read_chunk_size",
        )?;
        ConfigValidator::validate_buffer_size(
            self.max_response_head,
            MAX_RESPONSE_HEAD_LIMIT,
            "max_response_head",
        )?;
        ConfigValidator::validate_count(self.max_headers, MAX_HEADER_SLOTS, "max_headers")?;
        Ok(())
    }
}
