// ── Transactional store contract ──
//
// The engine only ever reads. One query opens one read transaction,
// issues point reads through it (possibly many at once), and releases
// it exactly once when the query reaches a terminal state.

mod guard;
mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StoreError;
use crate::model::{
    ContextId, FlowAction, FlowEntryRef, FlowId, FlowMatch, NodeId, PortKey, RouteHop,
    SourceHostKey, StatisticsSample,
};

pub(crate) use guard::TransactionGuard;
pub use memory::{MemoryStore, MemoryTransaction};

/// Key of a secondary index entry. Each entry lists flow ids in
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    SourceHost(SourceHostKey),
    SwitchPort(PortKey),
    SwitchNode(NodeId),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceHost(host) => write!(f, "source-host/{host}"),
            Self::SwitchPort(port) => write!(f, "switch-port/{port}"),
            Self::SwitchNode(node) => write!(f, "switch-node/{node}"),
        }
    }
}

/// Source host as persisted; the MAC is not validated until conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHost {
    pub mac: String,
    #[serde(default)]
    pub vlan: u16,
}

/// A flow exactly as the store holds it.
///
/// Older or partially written entries may lack fields; those are
/// rejected when converted into a [`FlowRecord`](crate::model::FlowRecord).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFlow {
    pub id: FlowId,
    #[serde(default)]
    pub source_host: Option<StoredHost>,
    #[serde(default)]
    pub ingress: Option<PortKey>,
    #[serde(default)]
    pub egress: Option<PortKey>,
    #[serde(default)]
    pub ingress_entry: Option<FlowEntryRef>,
    #[serde(default)]
    pub flow_match: FlowMatch,
    #[serde(default)]
    pub actions: Vec<FlowAction>,
    #[serde(default)]
    pub route: Vec<RouteHop>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub idle_timeout: u16,
    #[serde(default)]
    pub hard_timeout: u16,
    #[serde(default)]
    pub history: Vec<StatisticsSample>,
}

/// One logical read transaction.
///
/// Reads may be issued concurrently. `release` is called exactly once by
/// the engine; implementations need not tolerate a second call.
#[async_trait]
pub trait ReadTransaction: Send + Sync {
    /// Whether the owning context exists at all.
    async fn context_exists(&self, context: &ContextId) -> Result<bool, StoreError>;

    /// The whole flow table of a context, in store enumeration order.
    async fn read_flow_table(
        &self,
        context: &ContextId,
    ) -> Result<Option<Vec<StoredFlow>>, StoreError>;

    async fn read_flow(
        &self,
        context: &ContextId,
        id: FlowId,
    ) -> Result<Option<StoredFlow>, StoreError>;

    /// Flow ids listed under a secondary index key.
    async fn read_index(
        &self,
        context: &ContextId,
        key: &IndexKey,
    ) -> Result<Option<Vec<FlowId>>, StoreError>;

    fn release(&self);
}

/// Source of read transactions.
pub trait FlowStore: Send + Sync {
    fn begin_read(&self) -> Result<Box<dyn ReadTransaction>, StoreError>;
}
