// ── Runtime query configuration ──
//
// Tuning for the engine. Never touches disk: the CLI builds a
// `QueryConfig` from its own configuration layer and hands it in.

use std::time::Duration;

use crate::model::DEFAULT_AVERAGE_WINDOW_SECS;

/// Default bounded wait for a live statistics sample.
pub const DEFAULT_LIVE_STATS_TIMEOUT: Duration = Duration::from_secs(10);

/// Default cap on in-flight record reads per query.
pub const DEFAULT_MAX_CONCURRENT_READS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// How long a live-mode query waits for each switch sample before
    /// falling back to cached history.
    pub live_stats_timeout: Duration,
    /// Averaging window used when the criteria carry none.
    pub default_average_window_secs: u32,
    /// Upper bound on concurrent record reads and live statistics
    /// fetches. Result order does not depend on it. Zero is treated as one.
    pub max_concurrent_reads: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            live_stats_timeout: DEFAULT_LIVE_STATS_TIMEOUT,
            default_average_window_secs: DEFAULT_AVERAGE_WINDOW_SECS,
            max_concurrent_reads: DEFAULT_MAX_CONCURRENT_READS,
        }
    }
}

impl QueryConfig {
    pub(crate) fn concurrency(&self) -> usize {
        self.max_concurrent_reads.max(1)
    }
}
