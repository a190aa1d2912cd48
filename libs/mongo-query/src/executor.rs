use std::future::Future;
use std::pin::Pin;

use crate::error::QueryError;
use crate::parser::Query;
use crate::value::Document;

/// Document store able to run a parsed [`Query`].
///
/// Transport retries, pooling and authentication belong to the
/// implementation; the runner never retries.
pub trait QueryExecutor: Send + Sync {
    /// Connectivity probe.
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), QueryError>> + Send + '_>>;

    /// Start the query and hand back a pull cursor over its documents.
    fn execute<'a>(
        &'a self,
        query: &'a Query,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RecordCursor>, QueryError>> + Send + 'a>>;
}

/// Pull handle over one query's matching documents.
pub trait RecordCursor: Send {
    /// Next record, `None` once exhausted.
    fn next(&mut self) -> Pin<Box<dyn Future<Output = Option<Result<Document, QueryError>>> + Send + '_>>;

    /// Release server-side resources. Called exactly once by the runner,
    /// whatever the outcome of the query.
    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<(), QueryError>> + Send>>;
}
