// ── Switch statistics ──
//
// The statistics service is an external collaborator: it can fetch the
// current counters of a flow entry from its switch, and append a sample
// to a flow's persisted history. Everything else here is derived per
// query and never stored.

mod average;
mod history;
mod memory;

use async_trait::async_trait;

use crate::error::StatsError;
use crate::model::{ContextId, FlowEntryRef, FlowId, StatisticsSample};

pub(crate) use average::StatisticsAverager;
pub use history::SampleHistory;
pub use memory::MemoryStatsService;

#[async_trait]
pub trait StatsService: Send + Sync {
    /// Current counters of a flow entry. The engine bounds the wait.
    async fn fetch_current(&self, entry: &FlowEntryRef) -> Result<StatisticsSample, StatsError>;

    /// Append a sample to a flow's persisted history.
    async fn persist(
        &self,
        context: &ContextId,
        flow: FlowId,
        sample: StatisticsSample,
    ) -> Result<(), StatsError>;
}
