// ── Exactly-once transaction release ──

use tracing::debug;

use super::ReadTransaction;

/// Owns a read transaction for the lifetime of one query and releases
/// it exactly once: on [`close`](Self::close), or on drop if the query
/// never got that far (early return, panic while unwinding).
pub(crate) struct TransactionGuard {
    tx: Box<dyn ReadTransaction>,
    released: bool,
}

impl TransactionGuard {
    pub(crate) fn new(tx: Box<dyn ReadTransaction>) -> Self {
        Self { tx, released: false }
    }

    pub(crate) fn tx(&self) -> &dyn ReadTransaction {
        self.tx.as_ref()
    }

    /// Release the transaction. Consumes the guard, so no read can be
    /// issued through it afterwards.
    pub(crate) fn close(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.tx.release();
            debug!("read transaction released");
        }
    }
}

impl Drop for TransactionGuard {
    fn drop(&mut self) {
        self.release_once();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::StoreError;
    use crate::model::{ContextId, FlowId};
    use crate::store::{IndexKey, StoredFlow};

    struct Counting(Arc<AtomicUsize>);

    #[async_trait]
    impl ReadTransaction for Counting {
        async fn context_exists(&self, _: &ContextId) -> Result<bool, StoreError> {
            Ok(true)
        }
        async fn read_flow_table(
            &self,
            _: &ContextId,
        ) -> Result<Option<Vec<StoredFlow>>, StoreError> {
            Ok(None)
        }
        async fn read_flow(&self, _: &ContextId, _: FlowId) -> Result<Option<StoredFlow>, StoreError> {
            Ok(None)
        }
        async fn read_index(
            &self,
            _: &ContextId,
            _: &IndexKey,
        ) -> Result<Option<Vec<FlowId>>, StoreError> {
            Ok(None)
        }
        fn release(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn close_releases_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let guard = TransactionGuard::new(Box::new(Counting(Arc::clone(&count))));
        guard.close();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_without_close_still_releases_once() {
        let count = Arc::new(AtomicUsize::new(0));
        {
            let _guard = TransactionGuard::new(Box::new(Counting(Arc::clone(&count))));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
