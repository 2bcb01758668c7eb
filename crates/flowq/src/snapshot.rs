//! JSON snapshot of a flow store, switch inventory and live counters.
//!
//! The CLI has no controller to talk to; everything a query consumes is
//! loaded from one file into the in-memory backends of `flowq-core`.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use flowq_core::{
    ContextId, FlowEntryRef, FlowQueryEngine, MemoryInventory, MemoryStatsService, MemoryStore,
    NodeId, PortId, QueryConfig, StatisticsSample, StoredFlow,
};

use crate::error::CliError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    #[serde(default)]
    pub contexts: Vec<ContextSnapshot>,
    #[serde(default)]
    pub switches: Vec<SwitchSnapshot>,
    /// Counters the switches would report right now.
    #[serde(default)]
    pub live: Vec<LiveSample>,
}

#[derive(Debug, Deserialize)]
pub struct ContextSnapshot {
    pub name: ContextId,
    #[serde(default)]
    pub flows: Vec<StoredFlow>,
}

#[derive(Debug, Deserialize)]
pub struct SwitchSnapshot {
    pub node: NodeId,
    #[serde(default)]
    pub ports: Vec<PortSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct PortSnapshot {
    pub id: PortId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LiveSample {
    pub entry: FlowEntryRef,
    pub sample: StatisticsSample,
}

impl Snapshot {
    pub async fn load(path: &Path) -> Result<Self, CliError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CliError::SnapshotRead {
                path: path.display().to_string(),
                source,
            })?;
        serde_json::from_str(&raw).map_err(|source| CliError::SnapshotParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Populate in-memory backends and build an engine over them.
    pub fn into_engine(self, config: QueryConfig) -> FlowQueryEngine {
        let store = MemoryStore::new();
        let mut flow_count = 0usize;
        for context in self.contexts {
            store.add_context(context.name.clone());
            flow_count += context.flows.len();
            for flow in context.flows {
                store.insert_stored(context.name.clone(), flow);
            }
        }

        let inventory = MemoryInventory::new();
        let switch_count = self.switches.len();
        for switch in self.switches {
            inventory.add_switch(switch.node.clone());
            for port in switch.ports {
                inventory.add_port(switch.node.clone(), port.id, port.name);
            }
        }

        let stats = MemoryStatsService::new(store.clone());
        for live in self.live {
            stats.set_live(live.entry, live.sample);
        }

        info!(flows = flow_count, switches = switch_count, "snapshot loaded");
        FlowQueryEngine::new(
            Arc::new(store),
            Arc::new(inventory),
            Arc::new(stats),
            config,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "contexts": [
            {"name": "vtn1", "flows": [
                {
                    "id": 7,
                    "source_host": {"mac": "00:00:00:00:00:01"},
                    "ingress": {"node": "s1", "port": "1"},
                    "egress": {"node": "s1", "port": "2"},
                    "ingress_entry": {"node": "s1", "table_id": 0, "cookie": 7},
                    "route": [{"node": "s1", "in_port": "1", "out_port": "2"}],
                    "actions": [{"type": "output", "port": "2"}],
                    "created_at": "2026-01-01T00:00:00Z"
                }
            ]},
            {"name": "empty"}
        ],
        "switches": [{"node": "s1", "ports": [{"id": "1", "name": "s1-eth1"}, {"id": "2"}]}]
    }"#;

    #[tokio::test]
    async fn loads_contexts_and_switches() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let snapshot = Snapshot::load(&path).await.unwrap();
        assert_eq!(snapshot.contexts.len(), 2);
        assert_eq!(snapshot.switches[0].ports.len(), 2);

        let engine = snapshot.into_engine(QueryConfig::default());
        assert_eq!(engine.count_flows(ContextId::new("vtn1")).await.unwrap(), 1);
        assert_eq!(engine.count_flows(ContextId::new("empty")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_snapshot_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        std::fs::write(&path, "{\"contexts\": 3}").unwrap();
        assert!(matches!(
            Snapshot::load(&path).await,
            Err(CliError::SnapshotParse { .. })
        ));
    }

    #[tokio::test]
    async fn missing_snapshot_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Snapshot::load(&dir.path().join("absent.json")).await,
            Err(CliError::SnapshotRead { .. })
        ));
    }
}
