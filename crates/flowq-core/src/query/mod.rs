// ── Query engine ──
//
// Caller-facing entry point. Every query runs as its own task that owns
// its read transaction; the answer comes back over a oneshot channel.

mod count;
mod fetch;
mod index;
mod orchestrator;
mod select;

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::{Instrument, debug_span};

use crate::config::QueryConfig;
use crate::error::CoreError;
use crate::inventory::Inventory;
use crate::model::{ContextId, QueryCriteria, QueryResult};
use crate::stats::{StatisticsAverager, StatsService};
use crate::store::FlowStore;

use self::count::CountQuery;
use self::orchestrator::QueryOrchestrator;

pub(crate) struct EngineInner {
    pub(crate) store: Arc<dyn FlowStore>,
    pub(crate) inventory: Arc<dyn Inventory>,
    pub(crate) averager: StatisticsAverager,
    pub(crate) config: QueryConfig,
}

/// Read-only query engine over a flow store.
///
/// Cheaply cloneable via `Arc<EngineInner>`. Queries share nothing
/// mutable: each one opens, and releases exactly once, its own read
/// transaction.
#[derive(Clone)]
pub struct FlowQueryEngine {
    inner: Arc<EngineInner>,
}

impl FlowQueryEngine {
    pub fn new(
        store: Arc<dyn FlowStore>,
        inventory: Arc<dyn Inventory>,
        stats: Arc<dyn StatsService>,
        config: QueryConfig,
    ) -> Self {
        let averager = StatisticsAverager::new(stats, config.live_stats_timeout);
        Self {
            inner: Arc::new(EngineInner {
                store,
                inventory,
                averager,
                config,
            }),
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    /// List the flows of `context` matching `criteria`.
    ///
    /// Unknown switches, ports or hosts yield an empty result. Only a
    /// missing context or a failed store read is an error.
    pub async fn query_flows(
        &self,
        context: ContextId,
        criteria: QueryCriteria,
    ) -> Result<QueryResult, CoreError> {
        let span = debug_span!("query_flows", %context, mode = %criteria.mode);
        let orchestrator = QueryOrchestrator::new(Arc::clone(&self.inner), context, criteria);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(
            async move {
                let _ = tx.send(orchestrator.run().await);
            }
            .instrument(span),
        );
        rx.await
            .map_err(|_| CoreError::Internal("query task ended without a result".into()))?
    }

    /// Number of flow table entries in `context`.
    pub async fn count_flows(&self, context: ContextId) -> Result<u64, CoreError> {
        let span = debug_span!("count_flows", %context);
        let query = CountQuery::new(Arc::clone(&self.inner.store), context);
        let (tx, rx) = oneshot::channel();
        tokio::spawn(
            async move {
                let _ = tx.send(query.run().await);
            }
            .instrument(span),
        );
        rx.await
            .map_err(|_| CoreError::Internal("count task ended without a result".into()))?
    }
}
