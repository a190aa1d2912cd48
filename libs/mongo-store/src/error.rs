use mongo_query::QueryError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection url '{url}': {detail}")]
    Url { url: String, detail: String },

    #[error("client: {0}")]
    Client(#[from] mongodb::error::Error),

    #[error("'{clause}' argument must be a document, got {kind}")]
    NotADocument {
        clause: &'static str,
        kind: &'static str,
    },
}

impl From<StoreError> for QueryError {
    fn from(e: StoreError) -> Self {
        QueryError::execution(e)
    }
}
