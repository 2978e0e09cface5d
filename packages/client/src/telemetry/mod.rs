//! Telemetry for tunnel establishment

pub mod tunnel_stats;

pub use tunnel_stats::{TunnelStats, TunnelStatsSnapshot};
