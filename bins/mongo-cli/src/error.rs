#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("store: {0}")]
    Store(#[from] mongo_store::StoreError),

    #[error("{0}")]
    Query(#[from] mongo_query::QueryError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
