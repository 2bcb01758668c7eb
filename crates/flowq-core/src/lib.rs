// flowq-core: Asynchronous flow-query and statistics-averaging engine.
//
// Consumes a transactional flow store, a switch inventory and a switch
// statistics service; exposes `FlowQueryEngine::{query_flows, count_flows}`.

pub mod config;
pub mod convert;
pub mod error;
pub mod inventory;
pub mod model;
pub mod query;
pub mod stats;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::QueryConfig;
pub use error::{ConvertError, CoreError, StatsError, StoreError};
pub use inventory::{Inventory, MemoryInventory};
pub use query::FlowQueryEngine;
pub use stats::{MemoryStatsService, SampleHistory, StatsService};
pub use store::{FlowStore, IndexKey, MemoryStore, ReadTransaction, StoredFlow, StoredHost};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Identity
    ContextId, FlowId, MacAddress, NodeId, PortId, PortKey, SourceHostKey,
    // Records
    FlowAction, FlowEntryRef, FlowMatch, FlowRecord, RouteHop,
    // Criteria
    PortDescriptor, QueryCriteria, QueryMode, SourceHostDescriptor,
    // Statistics and results
    AveragedStatistics, DataFlow, FlowDetail, FlowStatistics, QueryResult, StatisticsSample,
};
