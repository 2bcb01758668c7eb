// ── Switch inventory contract ──
//
// The index selector asks the inventory two questions: does this switch
// exist, and which concrete port does a descriptor name on it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;
use crate::model::{NodeId, PortDescriptor, PortId};

#[async_trait]
pub trait Inventory: Send + Sync {
    async fn switch_exists(&self, node: &NodeId) -> Result<bool, StoreError>;

    /// Resolve a port descriptor on `node`. `None` when the switch or
    /// the port is unknown, or the descriptor names nothing.
    async fn resolve_port(
        &self,
        node: &NodeId,
        port: &PortDescriptor,
    ) -> Result<Option<PortId>, StoreError>;
}

#[derive(Debug, Default)]
struct SwitchPorts {
    /// Port id to optional port name.
    ports: HashMap<PortId, Option<String>>,
}

/// In-memory inventory of switches and their ports.
#[derive(Clone, Default)]
pub struct MemoryInventory {
    switches: Arc<DashMap<NodeId, SwitchPorts>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_switch(&self, node: impl Into<NodeId>) {
        self.switches.entry(node.into()).or_default();
    }

    /// Register a port, creating its switch if needed.
    pub fn add_port(&self, node: impl Into<NodeId>, id: impl Into<PortId>, name: Option<String>) {
        self.switches
            .entry(node.into())
            .or_default()
            .ports
            .insert(id.into(), name);
    }
}

#[async_trait]
impl Inventory for MemoryInventory {
    async fn switch_exists(&self, node: &NodeId) -> Result<bool, StoreError> {
        Ok(self.switches.contains_key(node))
    }

    async fn resolve_port(
        &self,
        node: &NodeId,
        port: &PortDescriptor,
    ) -> Result<Option<PortId>, StoreError> {
        let Some(switch) = self.switches.get(node) else {
            return Ok(None);
        };

        let resolved = match (&port.id, &port.name) {
            (Some(id), _) => {
                let id = PortId::new(id.as_str());
                switch.ports.contains_key(&id).then_some(id)
            }
            (None, Some(name)) => switch
                .ports
                .iter()
                .find(|(_, n)| n.as_deref() == Some(name.as_str()))
                .map(|(id, _)| id.clone()),
            (None, None) => None,
        };
        Ok(resolved)
    }
}
