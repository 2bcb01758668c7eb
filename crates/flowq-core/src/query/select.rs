// ── Residual record filter ──
//
// Index entries are list snapshots that can lag behind the flow table,
// so every criterion is checked again against each fetched record,
// including the one the index already narrowed by.

use crate::model::{FlowId, FlowRecord, NodeId, PortKey, SourceHostKey};

/// Normalized criteria a record must satisfy to be kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RecordFilter {
    flow_id: Option<FlowId>,
    source_host: Option<SourceHostKey>,
    switch_node: Option<NodeId>,
    switch_port: Option<PortKey>,
}

impl RecordFilter {
    /// A port criterion supersedes the node criterion.
    pub(crate) fn new(
        flow_id: Option<FlowId>,
        source_host: Option<SourceHostKey>,
        switch_node: Option<NodeId>,
        switch_port: Option<PortKey>,
    ) -> Self {
        let switch_node = if switch_port.is_some() {
            None
        } else {
            switch_node
        };
        Self {
            flow_id,
            source_host,
            switch_node,
            switch_port,
        }
    }

    pub(crate) fn flow_id(&self) -> Option<FlowId> {
        self.flow_id
    }

    pub(crate) fn source_host(&self) -> Option<&SourceHostKey> {
        self.source_host.as_ref()
    }

    pub(crate) fn switch_node(&self) -> Option<&NodeId> {
        self.switch_node.as_ref()
    }

    pub(crate) fn switch_port(&self) -> Option<&PortKey> {
        self.switch_port.as_ref()
    }

    pub(crate) fn matches(&self, record: &FlowRecord) -> bool {
        if self.flow_id.is_some_and(|id| id != record.id) {
            return false;
        }
        if let Some(host) = &self.source_host {
            if record.source_host.as_ref() != Some(host) {
                return false;
            }
        }
        match (&self.switch_port, &self.switch_node) {
            (Some(port), _) => record.route_contains_port(port),
            (None, Some(node)) => record.route_contains_node(node),
            (None, None) => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{ContextId, FlowEntryRef, FlowMatch, MacAddress, RouteHop};

    fn host(mac: &str, vlan: u16) -> SourceHostKey {
        SourceHostKey {
            mac: MacAddress::parse(mac).unwrap(),
            vlan,
        }
    }

    fn record() -> FlowRecord {
        FlowRecord {
            id: FlowId(4),
            context: ContextId::new("vtn1"),
            source_host: Some(host("00:00:00:00:00:01", 0)),
            ingress: PortKey::new("openflow:1", "1"),
            egress: PortKey::new("openflow:2", "3"),
            ingress_entry: FlowEntryRef {
                node: "openflow:1".into(),
                table_id: 0,
                cookie: 4,
            },
            flow_match: FlowMatch::default(),
            actions: Vec::new(),
            route: vec![
                RouteHop {
                    node: "openflow:1".into(),
                    in_port: "1".into(),
                    out_port: "2".into(),
                },
                RouteHop {
                    node: "openflow:2".into(),
                    in_port: "1".into(),
                    out_port: "3".into(),
                },
            ],
            created_at: Utc.timestamp_millis_opt(0).unwrap(),
            idle_timeout: 0,
            hard_timeout: 0,
            history: Vec::new(),
        }
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert!(RecordFilter::default().matches(&record()));
    }

    #[test]
    fn source_host_must_match_exactly() {
        let same = RecordFilter::new(None, Some(host("00:00:00:00:00:01", 0)), None, None);
        let other_vlan = RecordFilter::new(None, Some(host("00:00:00:00:00:01", 5)), None, None);
        assert!(same.matches(&record()));
        assert!(!other_vlan.matches(&record()));
    }

    #[test]
    fn node_must_be_on_the_route() {
        let on = RecordFilter::new(None, None, Some("openflow:2".into()), None);
        let off = RecordFilter::new(None, None, Some("openflow:3".into()), None);
        assert!(on.matches(&record()));
        assert!(!off.matches(&record()));
    }

    #[test]
    fn port_replaces_node_check() {
        let filter = RecordFilter::new(
            None,
            None,
            Some("openflow:9".into()),
            Some(PortKey::new("openflow:2", "3")),
        );
        assert!(filter.switch_node().is_none());
        assert!(filter.matches(&record()));

        let missing = RecordFilter::new(None, None, None, Some(PortKey::new("openflow:2", "7")));
        assert!(!missing.matches(&record()));
    }

    #[test]
    fn flow_id_is_rechecked() {
        assert!(RecordFilter::new(Some(FlowId(4)), None, None, None).matches(&record()));
        assert!(!RecordFilter::new(Some(FlowId(5)), None, None, None).matches(&record()));
    }
}
