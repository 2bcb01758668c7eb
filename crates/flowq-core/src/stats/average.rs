// ── Statistics merge per query mode ──

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{SampleHistory, StatsService};
use crate::error::StatsError;
use crate::model::{FlowRecord, FlowStatistics, QueryMode, StatisticsSample};

/// Attaches statistics to kept records: cached history in detail mode,
/// cached history plus a fresh switch sample in live mode.
#[derive(Clone)]
pub(crate) struct StatisticsAverager {
    service: Arc<dyn StatsService>,
    live_timeout: Duration,
}

impl StatisticsAverager {
    pub(crate) fn new(service: Arc<dyn StatsService>, live_timeout: Duration) -> Self {
        Self {
            service,
            live_timeout,
        }
    }

    pub(crate) async fn apply(
        &self,
        mode: QueryMode,
        record: &FlowRecord,
        window_secs: u32,
    ) -> Option<FlowStatistics> {
        if !mode.wants_statistics() {
            return None;
        }

        let mut history = SampleHistory::from_samples(&record.history);
        if mode == QueryMode::Live {
            if let Some(sample) = self.fetch_live(record).await {
                history.insert(sample);
                self.persist_in_background(record, sample);
            }
        }
        history.summarize(window_secs)
    }

    /// Bounded wait for a live sample. Failures degrade to cached history.
    async fn fetch_live(&self, record: &FlowRecord) -> Option<StatisticsSample> {
        let fetch = self.service.fetch_current(&record.ingress_entry);
        let err = match tokio::time::timeout(self.live_timeout, fetch).await {
            Ok(Ok(sample)) => {
                debug!(flow = %record.id, timestamp_ms = sample.timestamp_ms, "live sample fetched");
                return Some(sample);
            }
            Ok(Err(e)) => e,
            Err(_) => StatsError::Timeout {
                timeout_ms: u64::try_from(self.live_timeout.as_millis()).unwrap_or(u64::MAX),
            },
        };
        warn!(
            flow = %record.id,
            node = %record.ingress_entry.node,
            error = %err,
            "live statistics unavailable, using cached history"
        );
        None
    }

    fn persist_in_background(&self, record: &FlowRecord, sample: StatisticsSample) {
        let service = Arc::clone(&self.service);
        let context = record.context.clone();
        let flow = record.id;
        tokio::spawn(async move {
            if let Err(e) = service.persist(&context, flow, sample).await {
                warn!(%context, %flow, error = %e, "failed to persist live sample");
            }
        });
    }
}
