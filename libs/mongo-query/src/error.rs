/// Query-level failure. Any variant aborts the current query only;
/// callers never receive a partial table alongside it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// Query text does not match `<db>.<collection>.<find|aggregate>(...)`.
    #[error("'{query}' is not a valid MongoDB query expression")]
    Syntax { query: String },

    /// Malformed extended JSON in the method or sort arguments.
    #[error("the args '{fragment}' to the '{clause}' method are not valid: {detail}")]
    ArgumentDecode {
        clause: String,
        fragment: String,
        detail: String,
    },

    #[error("aggregate argument must be an array")]
    UnsupportedAggregatePayload,

    /// Propagated verbatim from the executor.
    #[error("{0}")]
    Execution(String),

    /// A cursor item could not be decoded into a record.
    #[error("record decode: {0}")]
    RecordDecode(String),

    #[error("query cancelled")]
    Cancelled,
}

impl QueryError {
    pub fn syntax(query: impl Into<String>) -> Self {
        Self::Syntax { query: query.into() }
    }

    pub fn execution(msg: impl std::fmt::Display) -> Self {
        Self::Execution(msg.to_string())
    }

    pub fn record_decode(msg: impl std::fmt::Display) -> Self {
        Self::RecordDecode(msg.to_string())
    }
}
