//! Flow count.

use serde::Serialize;

use flowq_core::ContextId;

use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
struct CountSummary {
    context: ContextId,
    flows: u64,
}

pub async fn handle(session: &Session) -> Result<(), CliError> {
    let flows = session.engine.count_flows(session.context.clone()).await?;
    let summary = CountSummary {
        context: session.context.clone(),
        flows,
    };
    let out = output::render_single(
        &session.output,
        &summary,
        |s| {
            Ok(format!(
                "{} {}\n{} {}",
                output::label("Context:", session.color),
                s.context,
                output::label("Flows:  ", session.color),
                s.flows
            ))
        },
        |s| s.flows.to_string(),
    )?;
    output::print_output(&out, session.quiet);
    Ok(())
}
