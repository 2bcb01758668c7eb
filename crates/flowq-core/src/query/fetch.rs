// ── Record retrieval ──
//
// Resolves a plan into candidate records through one read transaction.
// Index hits fan out into concurrent point reads whose results come back
// in index-list order. Dangling ids and malformed records are logged and
// skipped; only a failed read or a missing context ends the query.

use futures_util::stream::{self, StreamExt};
use tracing::{debug, warn};

use super::index::IndexPlan;
use crate::error::CoreError;
use crate::model::{ContextId, FlowId, FlowRecord};
use crate::store::{ReadTransaction, StoredFlow};

pub(crate) struct RecordFetcher<'a> {
    tx: &'a dyn ReadTransaction,
    context: &'a ContextId,
    max_concurrent: usize,
}

impl<'a> RecordFetcher<'a> {
    pub(crate) fn new(
        tx: &'a dyn ReadTransaction,
        context: &'a ContextId,
        max_concurrent: usize,
    ) -> Self {
        Self {
            tx,
            context,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub(crate) async fn fetch(&self, plan: &IndexPlan) -> Result<Vec<FlowRecord>, CoreError> {
        if let Some(key) = plan.index_key() {
            let Some(ids) = self.tx.read_index(self.context, &key).await? else {
                debug!(%key, "index entry absent");
                self.ensure_context().await?;
                return Ok(Vec::new());
            };
            return self.fetch_listed(ids).await;
        }

        match plan {
            IndexPlan::ById(id) => match self.tx.read_flow(self.context, *id).await? {
                Some(flow) => Ok(self.convert(vec![flow])),
                None => {
                    self.ensure_context().await?;
                    Ok(Vec::new())
                }
            },
            _ => match self.tx.read_flow_table(self.context).await? {
                Some(flows) if !flows.is_empty() => Ok(self.convert(flows)),
                _ => {
                    self.ensure_context().await?;
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Concurrent reads of every listed id, joined in list order.
    async fn fetch_listed(&self, ids: Vec<FlowId>) -> Result<Vec<FlowRecord>, CoreError> {
        debug!(count = ids.len(), "fanning out record reads");
        let tx = self.tx;
        let context = self.context;
        let reads: Vec<_> = stream::iter(ids)
            .map(move |id| async move { (id, tx.read_flow(context, id).await) })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut flows = Vec::with_capacity(reads.len());
        for (id, read) in reads {
            match read? {
                Some(flow) => flows.push(flow),
                None => warn!(%context, flow = %id, "index lists a flow that is not stored"),
            }
        }
        Ok(self.convert(flows))
    }

    fn convert(&self, flows: Vec<StoredFlow>) -> Vec<FlowRecord> {
        flows
            .into_iter()
            .filter_map(|flow| match flow.into_record(self.context) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(context = %self.context, error = %e, "skipping malformed flow");
                    None
                }
            })
            .collect()
    }

    async fn ensure_context(&self) -> Result<(), CoreError> {
        if self.tx.context_exists(self.context).await? {
            Ok(())
        } else {
            Err(CoreError::ContextNotFound {
                context: self.context.clone(),
            })
        }
    }
}
