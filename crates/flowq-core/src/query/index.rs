// ── Index selection ──
//
// Validates the criteria against the inventory, normalizes them, and
// picks at most one index to narrow the read. A criterion that cannot
// match anything turns the whole query into an empty result.

use std::fmt;

use tracing::debug;

use super::select::RecordFilter;
use crate::error::StoreError;
use crate::inventory::Inventory;
use crate::model::{
    FlowId, MacAddress, NodeId, PortKey, QueryCriteria, SourceHostDescriptor, SourceHostKey,
    VLAN_ID_MAX,
};
use crate::store::IndexKey;

/// How the candidate records are located. One per query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IndexPlan {
    FullScan,
    ById(FlowId),
    BySourceHost(SourceHostKey),
    BySwitchPort(PortKey),
    BySwitchNode(NodeId),
}

impl IndexPlan {
    /// Secondary index key, if the plan reads one.
    pub(crate) fn index_key(&self) -> Option<IndexKey> {
        match self {
            Self::BySourceHost(host) => Some(IndexKey::SourceHost(host.clone())),
            Self::BySwitchPort(port) => Some(IndexKey::SwitchPort(port.clone())),
            Self::BySwitchNode(node) => Some(IndexKey::SwitchNode(node.clone())),
            Self::FullScan | Self::ById(_) => None,
        }
    }
}

impl fmt::Display for IndexPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullScan => f.write_str("full-scan"),
            Self::ById(id) => write!(f, "flow-id/{id}"),
            Self::BySourceHost(host) => write!(f, "source-host/{host}"),
            Self::BySwitchPort(port) => write!(f, "switch-port/{port}"),
            Self::BySwitchNode(node) => write!(f, "switch-node/{node}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryPlan {
    pub index: IndexPlan,
    pub filter: RecordFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Selection {
    Plan(QueryPlan),
    /// Some criterion can never match.
    NoMatch,
}

pub(crate) struct IndexSelector<'a> {
    inventory: &'a dyn Inventory,
}

impl<'a> IndexSelector<'a> {
    pub(crate) fn new(inventory: &'a dyn Inventory) -> Self {
        Self { inventory }
    }

    pub(crate) async fn select(&self, criteria: &QueryCriteria) -> Result<Selection, StoreError> {
        if let Some(node) = &criteria.switch_node {
            if !self.inventory.switch_exists(node).await? {
                debug!(%node, "unknown switch");
                return Ok(Selection::NoMatch);
            }
        }

        let switch_port = match (&criteria.switch_port, &criteria.switch_node) {
            (None, _) => None,
            (Some(_), None) => {
                debug!("port criterion without a switch");
                return Ok(Selection::NoMatch);
            }
            (Some(desc), Some(node)) => match self.inventory.resolve_port(node, desc).await? {
                Some(port) => Some(PortKey::new(node.clone(), port)),
                None => {
                    debug!(%node, ?desc, "port does not resolve");
                    return Ok(Selection::NoMatch);
                }
            },
        };

        let source_host = match &criteria.source_host {
            None => None,
            Some(desc) => match normalize_source_host(desc) {
                Some(key) => Some(key),
                None => {
                    debug!(?desc, "source host does not normalize");
                    return Ok(Selection::NoMatch);
                }
            },
        };

        let filter = RecordFilter::new(
            criteria.flow_id,
            source_host,
            criteria.switch_node.clone(),
            switch_port,
        );
        let index = choose_index(&filter);
        debug!(plan = %index, "index selected");
        Ok(Selection::Plan(QueryPlan { index, filter }))
    }
}

/// Flow id, then source host, then switch port, then switch node.
fn choose_index(filter: &RecordFilter) -> IndexPlan {
    if let Some(id) = filter.flow_id() {
        IndexPlan::ById(id)
    } else if let Some(host) = filter.source_host() {
        IndexPlan::BySourceHost(host.clone())
    } else if let Some(port) = filter.switch_port() {
        IndexPlan::BySwitchPort(port.clone())
    } else if let Some(node) = filter.switch_node() {
        IndexPlan::BySwitchNode(node.clone())
    } else {
        IndexPlan::FullScan
    }
}

/// A usable host key needs a unicast MAC; a missing VLAN means untagged.
fn normalize_source_host(desc: &SourceHostDescriptor) -> Option<SourceHostKey> {
    let mac = MacAddress::parse(desc.mac.as_deref()?).ok()?;
    let vlan = desc.vlan.unwrap_or(0);
    if mac.is_group() || vlan > VLAN_ID_MAX {
        return None;
    }
    Some(SourceHostKey { mac, vlan })
}
