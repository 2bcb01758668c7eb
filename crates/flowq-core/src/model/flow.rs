// ── Flow record ──
//
// Immutable snapshot of one installed data flow. Records are only ever
// replaced wholesale in the store; the engine derives views from them
// and never mutates one in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::ids::{ContextId, FlowId, MacAddress, NodeId, PortId, PortKey, SourceHostKey};
use super::stats::StatisticsSample;

/// Reference to the flow entry installed on the ingress switch.
/// Used to ask the switch for a live statistics sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowEntryRef {
    pub node: NodeId,
    pub table_id: u8,
    pub cookie: u64,
}

/// Ethernet / L3 / L4 match fields. Absent fields are wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowMatch {
    pub eth_src: Option<MacAddress>,
    pub eth_dst: Option<MacAddress>,
    pub eth_type: Option<u16>,
    pub vlan_id: Option<u16>,
    pub vlan_pcp: Option<u8>,
    pub ip_src: Option<IpAddr>,
    pub ip_dst: Option<IpAddr>,
    pub ip_proto: Option<u8>,
    pub ip_dscp: Option<u8>,
    pub l4_src_port: Option<u16>,
    pub l4_dst_port: Option<u16>,
}

/// One action applied to matching packets, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FlowAction {
    Output { port: PortId },
    Drop,
    PushVlan,
    PopVlan,
    SetVlanId { vlan: u16 },
    SetVlanPcp { pcp: u8 },
    SetDlSrc { mac: MacAddress },
    SetDlDst { mac: MacAddress },
    SetInetSrc { addr: IpAddr },
    SetInetDst { addr: IpAddr },
    SetDscp { dscp: u8 },
    SetTpSrc { port: u16 },
    SetTpDst { port: u16 },
}

/// One hop of the physical route: the switch plus where the flow
/// enters and leaves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteHop {
    pub node: NodeId,
    pub in_port: PortId,
    pub out_port: PortId,
}

impl RouteHop {
    pub fn touches(&self, port: &PortKey) -> bool {
        self.node == port.node && (self.in_port == port.port || self.out_port == port.port)
    }
}

/// A data flow as stored by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub id: FlowId,
    pub context: ContextId,
    /// Host that originated the traffic, when the flow was created for one.
    pub source_host: Option<SourceHostKey>,
    pub ingress: PortKey,
    pub egress: PortKey,
    pub ingress_entry: FlowEntryRef,
    pub flow_match: FlowMatch,
    pub actions: Vec<FlowAction>,
    pub route: Vec<RouteHop>,
    pub created_at: DateTime<Utc>,
    /// Idle timeout in seconds, 0 = none.
    pub idle_timeout: u16,
    /// Hard timeout in seconds, 0 = none.
    pub hard_timeout: u16,
    /// Statistics history, ordered by time.
    pub history: Vec<StatisticsSample>,
}

impl FlowRecord {
    pub fn route_contains_node(&self, node: &NodeId) -> bool {
        self.route.iter().any(|hop| &hop.node == node)
    }

    pub fn route_contains_port(&self, port: &PortKey) -> bool {
        self.route.iter().any(|hop| hop.touches(port))
    }
}
