//! Configuration for tunnel establishment

pub mod tunnel;
pub mod validation;

pub use tunnel::{
    DEFAULT_MAX_HEADERS, DEFAULT_MAX_RESPONSE_HEAD, DEFAULT_READ_CHUNK_SIZE, TunnelConfig,
};
pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};
