// ── Query result projections ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flow::{FlowAction, FlowMatch, RouteHop};
use super::ids::{ContextId, FlowId, PortKey, SourceHostKey};
use super::stats::FlowStatistics;

/// Match, actions and route of a flow. Omitted in summary mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDetail {
    pub flow_match: FlowMatch,
    pub actions: Vec<FlowAction>,
    pub route: Vec<RouteHop>,
}

/// One flow as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFlow {
    pub id: FlowId,
    pub context: ContextId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_host: Option<SourceHostKey>,
    pub ingress: PortKey,
    pub egress: PortKey,
    pub created_at: DateTime<Utc>,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<FlowDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<FlowStatistics>,
}

/// Answer to a flow query, in index-list (or store enumeration) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub flows: Vec<DataFlow>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// The single flow of a flow-id lookup, if one matched.
    pub fn single(&self) -> Option<&DataFlow> {
        match self.flows.as_slice() {
            [flow] => Some(flow),
            _ => None,
        }
    }
}
