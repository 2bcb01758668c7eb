// ── Flow count ──
//
// Two states only: one table read, then done. No index, no filter, no
// statistics. The count covers every stored entry, malformed or not.

use std::sync::Arc;

use tracing::debug;

use crate::error::CoreError;
use crate::model::ContextId;
use crate::store::{FlowStore, TransactionGuard};

pub(crate) struct CountQuery {
    store: Arc<dyn FlowStore>,
    context: ContextId,
}

impl CountQuery {
    pub(crate) fn new(store: Arc<dyn FlowStore>, context: ContextId) -> Self {
        Self { store, context }
    }

    pub(crate) async fn run(self) -> Result<u64, CoreError> {
        let guard = TransactionGuard::new(self.store.begin_read()?);
        let result = self.count(&guard).await;
        guard.close();
        debug!(context = %self.context, ok = result.is_ok(), "count done");
        result
    }

    async fn count(&self, guard: &TransactionGuard) -> Result<u64, CoreError> {
        let tx = guard.tx();
        if let Some(flows) = tx.read_flow_table(&self.context).await? {
            return Ok(u64::try_from(flows.len()).unwrap_or(u64::MAX));
        }
        if tx.context_exists(&self.context).await? {
            Ok(0)
        } else {
            Err(CoreError::ContextNotFound {
                context: self.context.clone(),
            })
        }
    }
}
