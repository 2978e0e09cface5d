//! Configuration validation
//!
//! Bounds checks shared by every configuration type in this crate.

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid buffer size: {0}")]
    InvalidBufferSize(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails:
    /// - `InvalidBufferSize` - if buffer sizes are zero or exceed limits
    /// - `InvalidParameter` - if parameters are outside valid ranges
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate buffer size
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidBufferSize` if the size is zero
    /// or larger than `max`.
    pub fn validate_buffer_size(size: usize, max: usize, name: &str) -> ConfigResult<()> {
        if size == 0 {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} cannot be zero"
            )));
        }

        if size > max {
            return Err(ConfigurationError::InvalidBufferSize(format!(
                "{name} cannot exceed {max} bytes"
            )));
        }

        Ok(())
    }

    /// Validate a count parameter
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the value is zero
    /// or larger than `max`.
    pub fn validate_count(value: usize, max: usize, name: &str) -> ConfigResult<()> {
        if value == 0 || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between 1 and {max}, got {value}"
            )));
        }

        Ok(())
    }
}
