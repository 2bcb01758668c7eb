// ── Conversions between stored and domain forms ──
//
// Stored flows are validated into `FlowRecord`s on the way in; records
// are projected into `DataFlow`s on the way out. A stored flow that
// fails validation is a malformed record: the caller logs and skips it.

use crate::error::ConvertError;
use crate::model::{
    ContextId, DataFlow, FlowDetail, FlowRecord, FlowStatistics, MacAddress, QueryMode,
    SourceHostKey, VLAN_ID_MAX,
};
use crate::store::{StoredFlow, StoredHost};

impl StoredFlow {
    /// Validate a stored flow of `context` into a record.
    pub fn into_record(self, context: &ContextId) -> Result<FlowRecord, ConvertError> {
        let flow = self.id;
        let missing = |field| ConvertError::MissingField { flow, field };

        let source_host = self
            .source_host
            .map(|host| source_host_key(flow, host))
            .transpose()?;
        let ingress = self.ingress.ok_or_else(|| missing("ingress"))?;
        let egress = self.egress.ok_or_else(|| missing("egress"))?;
        let ingress_entry = self.ingress_entry.ok_or_else(|| missing("ingress flow entry"))?;
        let created_at = self.created_at.ok_or_else(|| missing("creation time"))?;
        if self.route.is_empty() {
            return Err(missing("route"));
        }

        let mut history = self.history;
        history.sort_by_key(|s| s.timestamp_ms);

        Ok(FlowRecord {
            id: flow,
            context: context.clone(),
            source_host,
            ingress,
            egress,
            ingress_entry,
            flow_match: self.flow_match,
            actions: self.actions,
            route: self.route,
            created_at,
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
            history,
        })
    }
}

fn source_host_key(
    flow: crate::model::FlowId,
    host: StoredHost,
) -> Result<SourceHostKey, ConvertError> {
    let mac = MacAddress::parse(&host.mac).map_err(|e| ConvertError::InvalidField {
        flow,
        field: "source host",
        reason: e.to_string(),
    })?;
    if host.vlan > VLAN_ID_MAX {
        return Err(ConvertError::InvalidField {
            flow,
            field: "source host",
            reason: format!("VLAN {} out of range", host.vlan),
        });
    }
    Ok(SourceHostKey {
        mac,
        vlan: host.vlan,
    })
}

impl From<FlowRecord> for StoredFlow {
    fn from(record: FlowRecord) -> Self {
        Self {
            id: record.id,
            source_host: record.source_host.map(|host| StoredHost {
                mac: host.mac.to_string(),
                vlan: host.vlan,
            }),
            ingress: Some(record.ingress),
            egress: Some(record.egress),
            ingress_entry: Some(record.ingress_entry),
            flow_match: record.flow_match,
            actions: record.actions,
            route: record.route,
            created_at: Some(record.created_at),
            idle_timeout: record.idle_timeout,
            hard_timeout: record.hard_timeout,
            history: record.history,
        }
    }
}

/// Project a record for the caller. Summary mode carries neither
/// detail nor statistics.
pub(crate) fn project(
    record: FlowRecord,
    mode: QueryMode,
    statistics: Option<FlowStatistics>,
) -> DataFlow {
    let detail = mode.wants_statistics().then(|| FlowDetail {
        flow_match: record.flow_match,
        actions: record.actions,
        route: record.route,
    });

    DataFlow {
        id: record.id,
        context: record.context,
        source_host: record.source_host,
        ingress: record.ingress,
        egress: record.egress,
        created_at: record.created_at,
        idle_timeout: record.idle_timeout,
        hard_timeout: record.hard_timeout,
        detail,
        statistics: statistics.filter(|_| mode.wants_statistics()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::model::{FlowEntryRef, FlowId, FlowMatch, PortKey, RouteHop, StatisticsSample};

    fn complete() -> StoredFlow {
        StoredFlow {
            id: FlowId(7),
            source_host: Some(StoredHost {
                mac: "00-AA-BB-CC-DD-EE".into(),
                vlan: 10,
            }),
            ingress: Some(PortKey::new("openflow:1", "1")),
            egress: Some(PortKey::new("openflow:2", "4")),
            ingress_entry: Some(FlowEntryRef {
                node: "openflow:1".into(),
                table_id: 0,
                cookie: 0x7f00_0000_0000_0007,
            }),
            flow_match: FlowMatch::default(),
            actions: Vec::new(),
            route: vec![RouteHop {
                node: "openflow:1".into(),
                in_port: "1".into(),
                out_port: "2".into(),
            }],
            created_at: Some(Utc.timestamp_millis_opt(1_000).unwrap()),
            idle_timeout: 300,
            hard_timeout: 0,
            history: vec![
                StatisticsSample::new(2000, 20, 2),
                StatisticsSample::new(1000, 10, 1),
            ],
        }
    }

    #[test]
    fn complete_flow_converts_and_sorts_history() {
        let record = complete().into_record(&ContextId::new("vtn1")).unwrap();
        assert_eq!(record.context.as_str(), "vtn1");
        assert_eq!(
            record.source_host.unwrap().to_string(),
            "00:aa:bb:cc:dd:ee@10"
        );
        assert_eq!(record.history[0].timestamp_ms, 1000);
    }

    #[test]
    fn missing_ingress_is_malformed() {
        let mut flow = complete();
        flow.ingress = None;
        let err = flow.into_record(&ContextId::new("vtn1")).unwrap_err();
        assert_eq!(
            err,
            ConvertError::MissingField {
                flow: FlowId(7),
                field: "ingress"
            }
        );
    }

    #[test]
    fn empty_route_is_malformed() {
        let mut flow = complete();
        flow.route.clear();
        assert!(flow.into_record(&ContextId::new("vtn1")).is_err());
    }

    #[test]
    fn bad_source_mac_is_malformed() {
        let mut flow = complete();
        flow.source_host = Some(StoredHost {
            mac: "zz".into(),
            vlan: 0,
        });
        assert!(matches!(
            flow.into_record(&ContextId::new("vtn1")),
            Err(ConvertError::InvalidField { .. })
        ));
    }

    #[test]
    fn summary_projection_drops_detail_and_statistics() {
        let record = complete().into_record(&ContextId::new("vtn1")).unwrap();
        let stats = FlowStatistics {
            current: StatisticsSample::new(2000, 20, 2),
            average: None,
        };
        let view = project(record.clone(), QueryMode::Summary, Some(stats));
        assert!(view.detail.is_none());
        assert!(view.statistics.is_none());

        let view = project(record, QueryMode::Detail, Some(stats));
        assert_eq!(view.detail.unwrap().route.len(), 1);
        assert_eq!(view.statistics, Some(stats));
    }

    #[test]
    fn record_round_trips_through_stored_form() {
        let record = complete().into_record(&ContextId::new("vtn1")).unwrap();
        let again = StoredFlow::from(record.clone())
            .into_record(&ContextId::new("vtn1"))
            .unwrap();
        assert_eq!(record, again);
    }
}
