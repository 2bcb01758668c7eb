// ── In-memory flow store ──
//
// Concurrent map of contexts, each holding its flow table and the three
// secondary indexes. Indexes are maintained on every insert and remove,
// and an index entry disappears once its last flow is gone.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{FlowStore, IndexKey, ReadTransaction, StoredFlow};
use crate::error::StoreError;
use crate::model::{
    ContextId, FlowId, FlowRecord, MacAddress, PortKey, SourceHostKey, StatisticsSample,
};

#[derive(Default)]
struct ContextTables {
    /// Flow table, enumerated in id order.
    flows: BTreeMap<FlowId, StoredFlow>,
    indexes: HashMap<IndexKey, Vec<FlowId>>,
}

impl ContextTables {
    fn insert(&mut self, flow: StoredFlow) {
        if let Some(old) = self.flows.remove(&flow.id) {
            self.unindex(&old);
        }
        for key in index_keys(&flow) {
            let ids = self.indexes.entry(key).or_default();
            if !ids.contains(&flow.id) {
                ids.push(flow.id);
            }
        }
        self.flows.insert(flow.id, flow);
    }

    fn remove(&mut self, id: FlowId) -> Option<StoredFlow> {
        let flow = self.flows.remove(&id)?;
        self.unindex(&flow);
        Some(flow)
    }

    fn unindex(&mut self, flow: &StoredFlow) {
        for key in index_keys(flow) {
            if let Some(ids) = self.indexes.get_mut(&key) {
                ids.retain(|id| *id != flow.id);
                if ids.is_empty() {
                    self.indexes.remove(&key);
                }
            }
        }
    }
}

/// Every index key a stored flow is listed under.
fn index_keys(flow: &StoredFlow) -> Vec<IndexKey> {
    let mut keys = Vec::new();

    if let Some(host) = &flow.source_host {
        if let Ok(mac) = MacAddress::parse(&host.mac) {
            keys.push(IndexKey::SourceHost(SourceHostKey {
                mac,
                vlan: host.vlan,
            }));
        }
    }

    for hop in &flow.route {
        for port in [&hop.in_port, &hop.out_port] {
            let key = IndexKey::SwitchPort(PortKey::new(hop.node.clone(), port.clone()));
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        let node = IndexKey::SwitchNode(hop.node.clone());
        if !keys.contains(&node) {
            keys.push(node);
        }
    }

    keys
}

/// Shared, cheaply cloneable in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    contexts: Arc<DashMap<ContextId, ContextTables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty context. Returns `true` if it did not exist.
    pub fn add_context(&self, context: ContextId) -> bool {
        match self.contexts.entry(context) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(ContextTables::default());
                true
            }
        }
    }

    /// Insert or replace a flow, creating its context if needed.
    pub fn insert_flow(&self, record: FlowRecord) {
        let context = record.context.clone();
        self.insert_stored(context, StoredFlow::from(record));
    }

    /// Insert a flow in stored form. Fields that cannot be indexed (an
    /// unparsable source MAC, say) are simply not indexed.
    pub fn insert_stored(&self, context: ContextId, flow: StoredFlow) {
        self.contexts.entry(context).or_default().insert(flow);
    }

    pub fn remove_flow(&self, context: &ContextId, id: FlowId) -> Option<StoredFlow> {
        self.contexts.get_mut(context)?.remove(id)
    }

    pub fn flow(&self, context: &ContextId, id: FlowId) -> Option<StoredFlow> {
        self.contexts.get(context)?.flows.get(&id).cloned()
    }

    /// Append a sample to a flow's history, keeping it ordered by time.
    /// A sample with an already recorded timestamp replaces the old one.
    /// Returns `false` if the flow does not exist.
    pub fn append_statistics(
        &self,
        context: &ContextId,
        id: FlowId,
        sample: StatisticsSample,
    ) -> bool {
        let Some(mut tables) = self.contexts.get_mut(context) else {
            return false;
        };
        let Some(flow) = tables.flows.get_mut(&id) else {
            return false;
        };

        let history = &mut flow.history;
        let pos = history.partition_point(|s| s.timestamp_ms < sample.timestamp_ms);
        match history.get_mut(pos) {
            Some(existing) if existing.timestamp_ms == sample.timestamp_ms => *existing = sample,
            _ => history.insert(pos, sample),
        }
        true
    }
}

impl FlowStore for MemoryStore {
    fn begin_read(&self) -> Result<Box<dyn ReadTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            contexts: Arc::clone(&self.contexts),
            released: AtomicBool::new(false),
        }))
    }
}

/// Read transaction over a [`MemoryStore`]. Reads observe the live
/// maps; any read after release fails.
pub struct MemoryTransaction {
    contexts: Arc<DashMap<ContextId, ContextTables>>,
    released: AtomicBool,
}

impl MemoryTransaction {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.released.load(Ordering::Acquire) {
            return Err(StoreError::Released);
        }
        Ok(())
    }
}

#[async_trait]
impl ReadTransaction for MemoryTransaction {
    async fn context_exists(&self, context: &ContextId) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(self.contexts.contains_key(context))
    }

    async fn read_flow_table(
        &self,
        context: &ContextId,
    ) -> Result<Option<Vec<StoredFlow>>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .contexts
            .get(context)
            .map(|tables| tables.flows.values().cloned().collect()))
    }

    async fn read_flow(
        &self,
        context: &ContextId,
        id: FlowId,
    ) -> Result<Option<StoredFlow>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .contexts
            .get(context)
            .and_then(|tables| tables.flows.get(&id).cloned()))
    }

    async fn read_index(
        &self,
        context: &ContextId,
        key: &IndexKey,
    ) -> Result<Option<Vec<FlowId>>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .contexts
            .get(context)
            .and_then(|tables| tables.indexes.get(key).cloned()))
    }

    fn release(&self) {
        self.released.store(true, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{NodeId, RouteHop};
    use crate::store::StoredHost;

    fn stored(id: u64, mac: &str, hops: &[(&str, &str, &str)]) -> StoredFlow {
        StoredFlow {
            id: FlowId(id),
            source_host: Some(StoredHost {
                mac: mac.into(),
                vlan: 0,
            }),
            ingress: None,
            egress: None,
            ingress_entry: None,
            flow_match: crate::model::FlowMatch::default(),
            actions: Vec::new(),
            route: hops
                .iter()
                .map(|(n, i, o)| RouteHop {
                    node: (*n).into(),
                    in_port: (*i).into(),
                    out_port: (*o).into(),
                })
                .collect(),
            created_at: None,
            idle_timeout: 0,
            hard_timeout: 0,
            history: Vec::new(),
        }
    }

    fn ctx() -> ContextId {
        ContextId::new("vtn1")
    }

    #[tokio::test]
    async fn indexes_follow_inserts_and_removes() {
        let store = MemoryStore::new();
        store.insert_stored(ctx(), stored(1, "00:00:00:00:00:01", &[("openflow:1", "1", "2")]));
        store.insert_stored(ctx(), stored(2, "00:00:00:00:00:02", &[("openflow:1", "1", "3")]));

        let tx = store.begin_read().unwrap();
        let node = IndexKey::SwitchNode(NodeId::new("openflow:1"));
        let port = IndexKey::SwitchPort(PortKey::new("openflow:1", "1"));
        assert_eq!(
            tx.read_index(&ctx(), &node).await.unwrap(),
            Some(vec![FlowId(1), FlowId(2)])
        );
        assert_eq!(
            tx.read_index(&ctx(), &port).await.unwrap(),
            Some(vec![FlowId(1), FlowId(2)])
        );

        store.remove_flow(&ctx(), FlowId(1));
        store.remove_flow(&ctx(), FlowId(2));
        assert_eq!(tx.read_index(&ctx(), &node).await.unwrap(), None);
        assert_eq!(tx.read_flow_table(&ctx()).await.unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn replacing_a_flow_reindexes_it() {
        let store = MemoryStore::new();
        store.insert_stored(ctx(), stored(1, "00:00:00:00:00:01", &[("openflow:1", "1", "2")]));
        store.insert_stored(ctx(), stored(1, "00:00:00:00:00:01", &[("openflow:2", "1", "2")]));

        let tx = store.begin_read().unwrap();
        let old = IndexKey::SwitchNode(NodeId::new("openflow:1"));
        let new = IndexKey::SwitchNode(NodeId::new("openflow:2"));
        assert_eq!(tx.read_index(&ctx(), &old).await.unwrap(), None);
        assert_eq!(tx.read_index(&ctx(), &new).await.unwrap(), Some(vec![FlowId(1)]));
    }

    #[tokio::test]
    async fn reads_fail_after_release() {
        let store = MemoryStore::new();
        store.add_context(ctx());
        let tx = store.begin_read().unwrap();
        assert!(tx.context_exists(&ctx()).await.unwrap());
        tx.release();
        assert_eq!(tx.context_exists(&ctx()).await, Err(StoreError::Released));
    }

    #[test]
    fn add_context_keeps_an_existing_flow_table() {
        let store = MemoryStore::new();
        store.insert_stored(ctx(), stored(1, "00:00:00:00:00:01", &[]));
        assert!(!store.add_context(ctx()));
        assert!(store.flow(&ctx(), FlowId(1)).is_some());
        assert!(store.add_context(ContextId::new("vtn2")));
    }

    #[test]
    fn add_context_racing_inserts_loses_no_flow() {
        let store = MemoryStore::new();
        std::thread::scope(|scope| {
            for id in 0..32 {
                let store = &store;
                scope.spawn(move || {
                    store.add_context(ctx());
                    store.insert_stored(ctx(), stored(id, "00:00:00:00:00:01", &[]));
                    store.add_context(ctx());
                });
            }
        });
        for id in 0..32 {
            assert!(store.flow(&ctx(), FlowId(id)).is_some(), "flow {id} lost");
        }
    }

    #[test]
    fn append_statistics_keeps_order_and_overwrites_duplicates() {
        let store = MemoryStore::new();
        store.insert_stored(ctx(), stored(1, "00:00:00:00:00:01", &[]));

        assert!(store.append_statistics(&ctx(), FlowId(1), StatisticsSample::new(2000, 20, 2)));
        assert!(store.append_statistics(&ctx(), FlowId(1), StatisticsSample::new(1000, 10, 1)));
        assert!(store.append_statistics(&ctx(), FlowId(1), StatisticsSample::new(2000, 25, 3)));
        assert!(!store.append_statistics(&ctx(), FlowId(9), StatisticsSample::new(1, 1, 1)));

        let history = store.flow(&ctx(), FlowId(1)).unwrap().history;
        assert_eq!(
            history,
            vec![StatisticsSample::new(1000, 10, 1), StatisticsSample::new(2000, 25, 3)]
        );
    }

    #[test]
    fn unparsable_source_mac_is_not_indexed() {
        let flow = stored(1, "garbage", &[]);
        assert!(index_keys(&flow).is_empty());
    }
}
