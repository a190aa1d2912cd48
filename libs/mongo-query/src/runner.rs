use tokio_util::sync::CancellationToken;

use crate::error::QueryError;
use crate::executor::{QueryExecutor, RecordCursor};
use crate::field::FieldBuilder;
use crate::parser::parse;
use crate::table::Table;

pub const DEFAULT_MAX_ROWS: usize = 1000;

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Substituted for a leading `db.` in query text.
    pub default_database: String,
    /// Rows kept per query; the rest are clipped silently. `0` = unlimited.
    pub max_rows: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_database: String::new(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// Parse `text`, run it and fold the documents into a [`Table`].
///
/// Records are pulled one at a time and fed straight into a fresh
/// [`FieldBuilder`]. The cursor is closed on every exit path: exhaustion,
/// row cap, record error or cancellation.
pub async fn run_query(
    executor: &dyn QueryExecutor,
    text: &str,
    config: &RunnerConfig,
    cancel: &CancellationToken,
) -> Result<Table, QueryError> {
    let query = parse(text, &config.default_database)?;

    let mut cursor = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(QueryError::Cancelled),
        cursor = executor.execute(&query) => cursor?,
    };

    let mut builder = FieldBuilder::with_capacity(16);
    let drained = drain(cursor.as_mut(), &mut builder, config.max_rows, cancel).await;

    if let Err(e) = cursor.close().await {
        tracing::warn!(error = %e, "failed to close cursor");
    }
    drained?;

    let table = builder.build_columns();
    tracing::debug!(
        database = %query.database,
        collection = %query.collection,
        rows = builder.record_count(),
        columns = table.columns.len(),
        "query finished"
    );
    Ok(table)
}

async fn drain(
    cursor: &mut dyn RecordCursor,
    builder: &mut FieldBuilder,
    max_rows: usize,
    cancel: &CancellationToken,
) -> Result<(), QueryError> {
    loop {
        if max_rows > 0 && builder.record_count() >= max_rows {
            tracing::info!(max_rows, "row limit reached, clipping result");
            return Ok(());
        }

        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(QueryError::Cancelled),
            next = cursor.next() => next,
        };

        match next {
            Some(record) => builder.process_record(record?),
            None => return Ok(()),
        }
    }
}
