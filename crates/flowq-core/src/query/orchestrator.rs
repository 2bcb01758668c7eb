// ── Flow query state machine ──
//
// One query, one read transaction. Each step consumes the current state
// and produces the next. The loop ends only in `Done`, the only place the
// transaction is closed; the guard's drop covers a panic.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::debug;

use super::EngineInner;
use super::fetch::RecordFetcher;
use super::index::{IndexSelector, QueryPlan, Selection};
use super::select::RecordFilter;
use crate::convert::project;
use crate::error::CoreError;
use crate::model::{ContextId, DataFlow, FlowRecord, QueryCriteria, QueryResult};
use crate::store::TransactionGuard;

#[derive(Debug)]
enum QueryState {
    Start,
    IndexResolved(QueryPlan),
    RecordsFetched {
        records: Vec<FlowRecord>,
        filter: RecordFilter,
    },
    Filtered(Vec<FlowRecord>),
    StatsMerged(Vec<DataFlow>),
    /// A criterion cannot match, or nothing was found.
    EmptyResult,
    Done(Result<QueryResult, CoreError>),
}

impl QueryState {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::IndexResolved(_) => "index-resolved",
            Self::RecordsFetched { .. } => "records-fetched",
            Self::Filtered(_) => "filtered",
            Self::StatsMerged(_) => "stats-merged",
            Self::EmptyResult => "empty-result",
            Self::Done(Ok(_)) => "done",
            Self::Done(Err(_)) => "failed",
        }
    }
}

pub(crate) struct QueryOrchestrator {
    inner: Arc<EngineInner>,
    context: ContextId,
    criteria: QueryCriteria,
}

impl QueryOrchestrator {
    pub(crate) fn new(inner: Arc<EngineInner>, context: ContextId, criteria: QueryCriteria) -> Self {
        Self {
            inner,
            context,
            criteria,
        }
    }

    pub(crate) async fn run(self) -> Result<QueryResult, CoreError> {
        let guard = TransactionGuard::new(self.inner.store.begin_read()?);
        let mut state = QueryState::Start;

        loop {
            state = match state {
                QueryState::Start => self.resolve_index().await,
                QueryState::IndexResolved(plan) => {
                    let fetcher =
                        RecordFetcher::new(guard.tx(), &self.context, self.inner.config.concurrency());
                    match fetcher.fetch(&plan.index).await {
                        Ok(records) if records.is_empty() => QueryState::EmptyResult,
                        Ok(records) => QueryState::RecordsFetched {
                            records,
                            filter: plan.filter,
                        },
                        Err(e) => QueryState::Done(Err(e)),
                    }
                }
                QueryState::RecordsFetched { records, filter } => QueryState::Filtered(
                    records.into_iter().filter(|r| filter.matches(r)).collect(),
                ),
                QueryState::Filtered(records) => {
                    QueryState::StatsMerged(self.merge_statistics(records).await)
                }
                QueryState::StatsMerged(flows) => QueryState::Done(Ok(QueryResult { flows })),
                QueryState::EmptyResult => QueryState::Done(Ok(QueryResult::empty())),
                QueryState::Done(result) => {
                    guard.close();
                    return result;
                }
            };
            debug!(context = %self.context, state = state.name(), "query transition");
        }
    }

    async fn resolve_index(&self) -> QueryState {
        match IndexSelector::new(self.inner.inventory.as_ref())
            .select(&self.criteria)
            .await
        {
            Ok(Selection::Plan(plan)) => QueryState::IndexResolved(plan),
            Ok(Selection::NoMatch) => QueryState::EmptyResult,
            Err(e) => QueryState::Done(Err(e.into())),
        }
    }

    /// Statistics for every kept record, fetched with bounded concurrency
    /// and collected in record order.
    async fn merge_statistics(&self, records: Vec<FlowRecord>) -> Vec<DataFlow> {
        let mode = self.criteria.mode;
        let window = self
            .criteria
            .effective_window_secs(self.inner.config.default_average_window_secs);
        let averager = &self.inner.averager;

        let flows: Vec<DataFlow> = stream::iter(records)
            .map(move |record| async move {
                let stats = averager.apply(mode, &record, window).await;
                project(record, mode, stats)
            })
            .buffered(self.inner.config.concurrency())
            .collect()
            .await;
        debug!(count = flows.len(), %mode, "statistics merged");
        flows
    }
}
