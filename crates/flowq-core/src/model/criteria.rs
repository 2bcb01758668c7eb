// ── Query criteria ──
//
// What a caller may ask for. Descriptors are kept in their raw form
// here; normalization (and the decision that a criterion can never
// match) happens in the index selector.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::{FlowId, NodeId};

/// Averaging window used when none (or a non-positive one) is requested.
pub const DEFAULT_AVERAGE_WINDOW_SECS: u32 = 10;

/// How much of each flow the result carries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum QueryMode {
    /// Identity, endpoints and timeouts only. No statistics.
    #[default]
    Summary,
    /// Full detail plus statistics from cached history.
    Detail,
    /// Full detail plus statistics refreshed from the switch.
    Live,
}

impl QueryMode {
    pub fn wants_statistics(self) -> bool {
        !matches!(self, Self::Summary)
    }
}

/// Source host as supplied by the caller: MAC plus optional VLAN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceHostDescriptor {
    pub mac: Option<String>,
    pub vlan: Option<u16>,
}

impl SourceHostDescriptor {
    pub fn new(mac: impl Into<String>, vlan: Option<u16>) -> Self {
        Self {
            mac: Some(mac.into()),
            vlan,
        }
    }
}

/// A switch port named either by identifier or by port name.
/// The identifier wins when both are given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortDescriptor {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl PortDescriptor {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }
}

/// Filters for a flow query. Every criterion is optional; an empty set
/// lists every flow in the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryCriteria {
    pub flow_id: Option<FlowId>,
    pub source_host: Option<SourceHostDescriptor>,
    pub switch_node: Option<NodeId>,
    /// Only meaningful together with `switch_node`.
    pub switch_port: Option<PortDescriptor>,
    pub mode: QueryMode,
    pub average_window_secs: Option<i64>,
}

impl QueryCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow_id(mut self, id: FlowId) -> Self {
        self.flow_id = Some(id);
        self
    }

    pub fn with_source_host(mut self, host: SourceHostDescriptor) -> Self {
        self.source_host = Some(host);
        self
    }

    pub fn with_switch_node(mut self, node: impl Into<NodeId>) -> Self {
        self.switch_node = Some(node.into());
        self
    }

    pub fn with_switch_port(mut self, port: PortDescriptor) -> Self {
        self.switch_port = Some(port);
        self
    }

    pub fn with_mode(mut self, mode: QueryMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_average_window(mut self, secs: i64) -> Self {
        self.average_window_secs = Some(secs);
        self
    }

    /// Requested window, or `fallback` when unset or not positive.
    pub fn effective_window_secs(&self, fallback: u32) -> u32 {
        self.average_window_secs
            .filter(|secs| *secs > 0)
            .map_or(fallback, |secs| u32::try_from(secs).unwrap_or(u32::MAX))
    }
}
