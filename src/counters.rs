//! Physical traffic accounting.
//!
//! [`TrafficCounters`] records raw byte counts independent of logical
//! message boundaries: inbound bytes once per completed read, outbound
//! bytes once per write attempt. Counts are kept in atomics for direct
//! inspection and mirrored to the [`metrics`](https://docs.rs/metrics)
//! crate when the `metrics` feature is enabled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the counter tracking inbound physical bytes.
pub const BYTES_PHYSICAL_IN: &str = "wireticket_physical_bytes_in_total";
/// Name of the counter tracking outbound physical bytes.
pub const BYTES_PHYSICAL_OUT: &str = "wireticket_physical_bytes_out_total";

/// Thread-safe inbound/outbound byte counters.
#[derive(Debug, Default)]
pub struct TrafficCounters {
    physical_in: AtomicU64,
    physical_out: AtomicU64,
}

impl TrafficCounters {
    /// Create counters starting at zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Record bytes received from the wire.
    pub fn hit_physical_in(&self, bytes: u64) {
        self.physical_in.fetch_add(bytes, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        metrics::counter!(BYTES_PHYSICAL_IN).increment(bytes);
    }

    /// Record bytes handed to the wire.
    pub fn hit_physical_out(&self, bytes: u64) {
        self.physical_out.fetch_add(bytes, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        metrics::counter!(BYTES_PHYSICAL_OUT).increment(bytes);
    }

    /// Total inbound bytes recorded so far.
    #[must_use]
    pub fn physical_in(&self) -> u64 { self.physical_in.load(Ordering::Relaxed) }

    /// Total outbound bytes recorded so far.
    #[must_use]
    pub fn physical_out(&self) -> u64 { self.physical_out.load(Ordering::Relaxed) }
}
