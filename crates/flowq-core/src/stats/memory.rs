// ── In-memory statistics service ──

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::StatsService;
use crate::error::StatsError;
use crate::model::{ContextId, FlowEntryRef, FlowId, StatisticsSample};
use crate::store::MemoryStore;

/// Serves configured live samples per flow entry and persists samples
/// into a [`MemoryStore`]'s flow history.
#[derive(Clone)]
pub struct MemoryStatsService {
    store: MemoryStore,
    live: Arc<DashMap<FlowEntryRef, StatisticsSample>>,
}

impl MemoryStatsService {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store,
            live: Arc::new(DashMap::new()),
        }
    }

    /// Set the counters the switch currently reports for `entry`.
    pub fn set_live(&self, entry: FlowEntryRef, sample: StatisticsSample) {
        self.live.insert(entry, sample);
    }

    pub fn clear_live(&self, entry: &FlowEntryRef) {
        self.live.remove(entry);
    }
}

#[async_trait]
impl StatsService for MemoryStatsService {
    async fn fetch_current(&self, entry: &FlowEntryRef) -> Result<StatisticsSample, StatsError> {
        self.live
            .get(entry)
            .map(|sample| *sample)
            .ok_or_else(|| StatsError::EntryNotFound {
                node: entry.node.to_string(),
            })
    }

    async fn persist(
        &self,
        context: &ContextId,
        flow: FlowId,
        sample: StatisticsSample,
    ) -> Result<(), StatsError> {
        if self.store.append_statistics(context, flow, sample) {
            Ok(())
        } else {
            Err(StatsError::Persist {
                flow,
                reason: "flow is no longer stored".into(),
            })
        }
    }
}
