//! Tunnel builder API
//!
//! Provides the fluent API for configuring tunnelers.

pub mod core;

pub use self::core::*;
