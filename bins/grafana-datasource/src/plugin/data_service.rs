use futures::stream::FuturesOrdered;
use grafana_plugin_sdk::backend::{self, async_trait, BoxDataResponseStream, DataResponse};
use mongo_query::{run_query, CancellationToken, RunnerConfig};
use mongo_store::MongoStore;

use super::error::QueryError;
use super::frame::table_to_frame;
use super::query::MongoQuery;
use super::MongoDbPlugin;

// ═══════════════════════════════════════════════════════════════
//  DataService
// ═══════════════════════════════════════════════════════════════

#[async_trait]
impl backend::DataService for MongoDbPlugin {
    type Query = MongoQuery;
    type QueryError = QueryError;
    type Stream = BoxDataResponseStream<Self::QueryError>;

    async fn query_data(
        &self,
        request: backend::QueryDataRequest<Self::Query, Self>,
    ) -> Self::Stream {
        let resolved = self
            .store(request.plugin_context.instance_settings.as_ref())
            .await
            .map(|(config, store)| (config.runner(), store));
        // The SDK exposes no per-request cancellation; the token only
        // scopes the queries of this request.
        let cancel = CancellationToken::new();

        Box::pin(
            request
                .queries
                .into_iter()
                .map(|q| {
                    let resolved = resolved.clone();
                    let cancel = cancel.clone();
                    async move {
                        let (runner, store) =
                            resolved.map_err(|e| QueryError::new(q.ref_id.clone(), e))?;
                        handle_query(&store, &runner, &cancel, &q).await
                    }
                })
                .collect::<FuturesOrdered<_>>(),
        )
    }
}

// ═══════════════════════════════════════════════════════════════
//  Query handler
// ═══════════════════════════════════════════════════════════════

async fn handle_query(
    store: &MongoStore,
    runner: &RunnerConfig,
    cancel: &CancellationToken,
    query: &backend::DataQuery<MongoQuery>,
) -> Result<DataResponse, QueryError> {
    let ref_id = query.ref_id.clone();

    if query.query.format.is_empty() {
        tracing::warn!(ref_id = %ref_id, "query format is not set");
    }

    let table = run_query(store, &query.query.query_text, runner, cancel)
        .await
        .map_err(|e| QueryError::new(ref_id.clone(), e))?;

    let frame = table_to_frame(table);
    let checked = frame
        .check()
        .map_err(|e| QueryError::new(ref_id.clone(), format!("frame error: {e}")))?;

    Ok(DataResponse::new(ref_id, vec![checked]))
}
