// ── Domain model ──
//
// Flow records as stored, the criteria a caller can filter by, and the
// projections handed back. Query-scoped values (criteria, results) are
// built fresh per query and never cached.

pub mod criteria;
pub mod flow;
pub mod ids;
pub mod stats;
pub mod view;

pub use criteria::{
    DEFAULT_AVERAGE_WINDOW_SECS, PortDescriptor, QueryCriteria, QueryMode, SourceHostDescriptor,
};
pub use flow::{FlowAction, FlowEntryRef, FlowMatch, FlowRecord, RouteHop};
pub use ids::{
    ContextId, FlowId, InvalidMacAddress, MacAddress, NodeId, PortId, PortKey, SourceHostKey,
    VLAN_ID_MAX,
};
pub use stats::{AveragedStatistics, FlowStatistics, StatisticsSample};
pub use view::{DataFlow, FlowDetail, QueryResult};
