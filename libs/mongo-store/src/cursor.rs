use std::future::Future;
use std::pin::Pin;

use futures::StreamExt;
use mongo_query::{Document, QueryError, RecordCursor};

/// Driver cursor adapted to the runner's pull interface.
pub struct MongoCursor {
    inner: mongodb::Cursor<bson::Document>,
}

impl MongoCursor {
    pub fn new(inner: mongodb::Cursor<bson::Document>) -> Self {
        Self { inner }
    }
}

impl RecordCursor for MongoCursor {
    fn next(
        &mut self,
    ) -> Pin<Box<dyn Future<Output = Option<Result<Document, QueryError>>> + Send + '_>> {
        Box::pin(async move {
            let item = self.inner.next().await?;
            Some(item.map(Document::from).map_err(QueryError::record_decode))
        })
    }

    fn close(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<(), QueryError>> + Send>> {
        // The driver issues killCursors in the background when the cursor drops.
        drop(self);
        Box::pin(async { Ok(()) })
    }
}
