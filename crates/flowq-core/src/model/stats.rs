// ── Flow statistics ──

use serde::{Deserialize, Serialize};

/// Cumulative counters of one flow at one instant.
///
/// Counters are non-decreasing within a single record's history unless
/// the switch reset them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSample {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub byte_count: u64,
    pub packet_count: u64,
}

impl StatisticsSample {
    pub fn new(timestamp_ms: i64, byte_count: u64, packet_count: u64) -> Self {
        Self {
            timestamp_ms,
            byte_count,
            packet_count,
        }
    }
}

/// Rates derived from two samples of the same flow. Never persisted.
///
/// Rates are not clamped: a counter reset between the two samples
/// shows up as a negative rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedStatistics {
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    /// Packets per second.
    pub packet_rate: f64,
    /// Bytes per second.
    pub byte_rate: f64,
}

/// Statistics attached to a flow in the query result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowStatistics {
    /// Latest known sample.
    pub current: StatisticsSample,
    pub average: Option<AveragedStatistics>,
}
