use grafana_plugin_sdk::backend;

// ═══════════════════════════════════════════════════════════════
//  Error types
// ═══════════════════════════════════════════════════════════════

/// Grafana plugin error for individual queries.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct QueryError {
    pub ref_id: String,
    pub message: String,
}

impl QueryError {
    pub fn new(ref_id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            ref_id: ref_id.into(),
            message: message.to_string(),
        }
    }
}

impl backend::DataQueryError for QueryError {
    fn ref_id(self) -> String {
        self.ref_id
    }
}
