// crates/blockdrag-core/src/core/network.rs
// ============================================================================
// Module: blockdrag Network Profile
// Description: Bandwidth and latency profile applied to the browser.
// Purpose: Describe throttled network conditions independent of transport.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Throughput values are bytes per second, the unit the DevTools network
//! emulation expects. The default profile is a slow cellular link that widens
//! the window between a drag gesture and its persistence round-trip.

use serde::Deserialize;
use serde::Serialize;

/// Bytes per second for a throughput given in kilobits per second.
#[must_use]
pub const fn kbps_to_bytes_per_sec(kbps: u64) -> u64 {
    kbps * 1024 / 8
}

/// Network conditions for the remainder of a browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Simulate a disconnected network.
    pub offline: bool,
    /// Download throughput in bytes per second.
    pub download_throughput: u64,
    /// Upload throughput in bytes per second.
    pub upload_throughput: u64,
    /// Added round-trip latency in milliseconds.
    pub latency_ms: u64,
    /// Reported connection type (for example `cellular3g`).
    pub connection_type: String,
}

impl NetworkProfile {
    /// Slow 3G-like profile: 750 kbit/s down, 250 kbit/s up, 100 ms latency.
    #[must_use]
    pub fn cellular_3g() -> Self {
        Self {
            offline: false,
            download_throughput: kbps_to_bytes_per_sec(750),
            upload_throughput: kbps_to_bytes_per_sec(250),
            latency_ms: 100,
            connection_type: "cellular3g".to_string(),
        }
    }
}

impl Default for NetworkProfile {
    fn default() -> Self {
        Self::cellular_3g()
    }
}
