//! Flow listing.

use tabled::Tabled;
use tracing::debug;

use flowq_core::{
    DataFlow, FlowId, FlowStatistics, PortDescriptor, QueryCriteria, SourceHostDescriptor,
};

use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output;

use super::Session;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FlowRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Ingress")]
    ingress: String,
    #[tabled(rename = "Egress")]
    egress: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Idle/Hard")]
    timeouts: String,
    #[tabled(rename = "Packets")]
    packets: String,
    #[tabled(rename = "Bytes")]
    bytes: String,
    #[tabled(rename = "Pkt/s")]
    packet_rate: String,
    #[tabled(rename = "B/s")]
    byte_rate: String,
}

impl From<&DataFlow> for FlowRow {
    fn from(f: &DataFlow) -> Self {
        let stats = f.statistics.as_ref();
        let average = stats.and_then(|s| s.average.as_ref());
        Self {
            id: f.id.to_string(),
            source: f
                .source_host
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            ingress: f.ingress.to_string(),
            egress: f.egress.to_string(),
            created: f.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            timeouts: format!("{}/{}", f.idle_timeout, f.hard_timeout),
            packets: stats.map_or_else(|| "-".into(), |s| s.current.packet_count.to_string()),
            bytes: stats.map_or_else(|| "-".into(), |s| s.current.byte_count.to_string()),
            packet_rate: average.map_or_else(|| "-".into(), |a| format!("{:.2}", a.packet_rate)),
            byte_rate: average.map_or_else(|| "-".into(), |a| format!("{:.2}", a.byte_rate)),
        }
    }
}

// ── Detail view ─────────────────────────────────────────────────────

fn field(name: &str, value: impl std::fmt::Display, color: bool) -> String {
    format!("{} {value}", output::label(&format!("{name:<12}"), color))
}

fn detail(f: &DataFlow, color: bool) -> Result<String, CliError> {
    let mut lines = vec![
        field("ID:", f.id, color),
        field("Context:", &f.context, color),
        field(
            "Source:",
            f.source_host
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string),
            color,
        ),
        field("Ingress:", &f.ingress, color),
        field("Egress:", &f.egress, color),
        field("Created:", f.created_at.to_rfc3339(), color),
        field("Idle:", format!("{}s", f.idle_timeout), color),
        field("Hard:", format!("{}s", f.hard_timeout), color),
    ];

    if let Some(d) = &f.detail {
        let flow_match = output::inline_json(&d.flow_match)?;
        let actions = d
            .actions
            .iter()
            .map(output::inline_json)
            .collect::<Result<Vec<_>, _>>()?;
        let route: Vec<String> = d
            .route
            .iter()
            .map(|h| format!("{} {}->{}", h.node, h.in_port, h.out_port))
            .collect();
        lines.push(field("Match:", flow_match, color));
        lines.push(field("Actions:", actions.join(", "), color));
        lines.push(field("Route:", route.join(", "), color));
    }

    if let Some(stats) = &f.statistics {
        lines.extend(statistics_lines(stats, color));
    }
    Ok(lines.join("\n"))
}

fn statistics_lines(stats: &FlowStatistics, color: bool) -> Vec<String> {
    let current = &stats.current;
    let mut lines = vec![
        field("Packets:", current.packet_count, color),
        field("Bytes:", current.byte_count, color),
        field("Sampled:", current.timestamp_ms, color),
    ];
    match &stats.average {
        Some(a) => {
            lines.push(field(
                "Average:",
                format!(
                    "{:.2} pkt/s, {:.2} B/s over {}..{} ms",
                    a.packet_rate, a.byte_rate, a.start_time_ms, a.end_time_ms
                ),
                color,
            ));
        }
        None => lines.push(field("Average:", "-", color)),
    }
    lines
}

// ── Handler ─────────────────────────────────────────────────────────

fn build_criteria(args: ListArgs) -> QueryCriteria {
    let mut criteria = QueryCriteria::new().with_mode(args.mode);
    if let Some(id) = args.flow_id {
        criteria = criteria.with_flow_id(FlowId(id));
    }
    if let Some(mac) = args.mac {
        criteria = criteria.with_source_host(SourceHostDescriptor::new(mac, args.vlan));
    }
    if let Some(node) = args.node {
        criteria = criteria.with_switch_node(node);
    }
    if args.port_id.is_some() || args.port_name.is_some() {
        criteria = criteria.with_switch_port(PortDescriptor {
            id: args.port_id,
            name: args.port_name,
        });
    }
    if let Some(window) = args.window {
        criteria = criteria.with_average_window(window);
    }
    criteria
}

pub async fn handle(session: &Session, args: ListArgs) -> Result<(), CliError> {
    let lookup = args.flow_id.is_some();
    let criteria = build_criteria(args);
    let result = session
        .engine
        .query_flows(session.context.clone(), criteria)
        .await?;
    debug!(count = result.len(), "flows listed");

    let out = match result.single() {
        Some(flow) if lookup => output::render_single(
            &session.output,
            flow,
            |f| detail(f, session.color),
            |f| f.id.to_string(),
        )?,
        _ => output::render_list(
            &session.output,
            &result.flows,
            |f| FlowRow::from(f),
            |f| f.id.to_string(),
        )?,
    };
    output::print_output(&out, session.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use flowq_core::{
        ContextId, FlowAction, FlowDetail, FlowMatch, NodeId, PortKey, QueryMode, RouteHop,
    };

    use super::*;

    fn args() -> ListArgs {
        ListArgs {
            flow_id: None,
            mac: None,
            vlan: None,
            node: None,
            port_id: None,
            port_name: None,
            mode: QueryMode::Summary,
            window: None,
        }
    }

    #[test]
    fn empty_args_list_everything() {
        assert_eq!(build_criteria(args()), QueryCriteria::new());
    }

    #[test]
    fn port_flags_form_one_descriptor() {
        let criteria = build_criteria(ListArgs {
            node: Some("s1".into()),
            port_name: Some("s1-eth1".into()),
            mode: QueryMode::Live,
            window: Some(-3),
            ..args()
        });
        assert_eq!(criteria.switch_node, Some(NodeId::new("s1")));
        assert_eq!(criteria.switch_port, Some(PortDescriptor::by_name("s1-eth1")));
        assert_eq!(criteria.mode, QueryMode::Live);
        assert_eq!(criteria.average_window_secs, Some(-3));
    }

    #[test]
    fn vlan_travels_with_mac() {
        let criteria = build_criteria(ListArgs {
            mac: Some("00:00:00:00:00:02".into()),
            vlan: Some(10),
            ..args()
        });
        assert_eq!(
            criteria.source_host,
            Some(SourceHostDescriptor::new("00:00:00:00:00:02", Some(10)))
        );
    }

    #[test]
    fn detail_view_embeds_match_and_actions_as_json() {
        let flow = DataFlow {
            id: FlowId(7),
            context: ContextId::new("vtn1"),
            source_host: None,
            ingress: PortKey::new("s1", "1"),
            egress: PortKey::new("s2", "3"),
            created_at: Utc.timestamp_millis_opt(0).unwrap(),
            idle_timeout: 300,
            hard_timeout: 0,
            detail: Some(FlowDetail {
                flow_match: FlowMatch {
                    vlan_id: Some(10),
                    ..FlowMatch::default()
                },
                actions: vec![FlowAction::Drop],
                route: vec![RouteHop {
                    node: NodeId::new("s1"),
                    in_port: "1".into(),
                    out_port: "2".into(),
                }],
            }),
            statistics: None,
        };

        let text = detail(&flow, false).unwrap();
        assert!(text.contains(r#""vlan_id":10"#), "{text}");
        assert!(text.contains(r#"{"type":"drop"}"#), "{text}");
        assert!(text.contains("s1 1->2"), "{text}");
        assert!(!text.contains("Average:"), "{text}");
    }
}
