//! `mongodb` driver backed [`QueryExecutor`].

mod cursor;
mod error;

use std::future::Future;
use std::pin::Pin;

use bson::{Bson, doc};
use mongo_query::{Method, Query, QueryError, QueryExecutor, RecordCursor, Value};
use mongodb::Client;
use mongodb::options::{ClientOptions, Credential};
use serde::Deserialize;

pub use cursor::MongoCursor;
pub use error::StoreError;

/// Connection settings for one datasource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Default database for `db.` queries.
    #[serde(default)]
    pub database: String,
}

#[derive(Clone, Debug)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Build a client. The driver connects lazily, so an unreachable server
    /// only shows up on the first `ping` or query.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options =
            ClientOptions::parse(&config.url)
                .await
                .map_err(|e| StoreError::Url {
                    url: config.url.clone(),
                    detail: e.to_string(),
                })?;

        if !config.user.is_empty() {
            let mut credential = Credential::default();
            credential.username = Some(config.user.clone());
            credential.password = Some(config.password.clone());
            options.credential = Some(credential);
        }
        if !config.database.is_empty() {
            options.default_database = Some(config.database.clone());
        }

        let client = Client::with_options(options)?;
        tracing::info!(user = %config.user, database = %config.database, "mongodb client created");
        Ok(Self { client })
    }

    async fn open(&self, query: &Query) -> Result<mongodb::Cursor<bson::Document>, StoreError> {
        let collection = self
            .client
            .database(&query.database)
            .collection::<bson::Document>(&query.collection);

        let cursor = match query.method {
            Method::Find => {
                let mut find = collection.find(to_document(&query.filter, "find")?);
                if let Some(projection) = &query.projection {
                    find = find.projection(to_document(projection, "projection")?);
                }
                if let Some(sort) = &query.sort {
                    find = find.sort(to_document(sort, "sort")?);
                }
                find.await?
            }
            Method::Aggregate => collection.aggregate(to_pipeline(query)?).await?,
        };
        Ok(cursor)
    }
}

impl QueryExecutor for MongoStore {
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), QueryError>> + Send + '_>> {
        Box::pin(async move {
            self.client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(QueryError::execution)?;
            Ok(())
        })
    }

    fn execute<'a>(
        &'a self,
        query: &'a Query,
    ) -> Pin<Box<dyn Future<Output = Result<Box<dyn RecordCursor>, QueryError>> + Send + 'a>>
    {
        Box::pin(async move {
            if query.method == Method::Aggregate {
                // Surface a non-array payload as its own kind, not a driver failure.
                query.pipeline()?;
            }
            let cursor = self.open(query).await?;
            tracing::debug!(
                database = %query.database,
                collection = %query.collection,
                method = %query.method,
                "cursor opened"
            );
            Ok(Box::new(MongoCursor::new(cursor)) as Box<dyn RecordCursor>)
        })
    }
}

fn to_document(value: &Value, clause: &'static str) -> Result<bson::Document, StoreError> {
    match Bson::from(value.clone()) {
        Bson::Document(doc) => Ok(doc),
        _ => Err(StoreError::NotADocument {
            clause,
            kind: value.kind(),
        }),
    }
}

/// Stage documents for `aggregate`; fails on the first non-document stage.
fn to_pipeline(query: &Query) -> Result<Vec<bson::Document>, StoreError> {
    let stages = query.pipeline().map_err(|_| StoreError::NotADocument {
        clause: "aggregate",
        kind: query.filter.kind(),
    })?;
    stages
        .iter()
        .map(|stage| to_document(stage, "aggregate"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongo_query::parse;

    #[test]
    fn find_arguments_become_documents() {
        let query = parse(r#"db.c.find({"a": 10}, {"_id": 0}).sort({"b": 1})"#, "db1").unwrap();

        assert_eq!(to_document(&query.filter, "find").unwrap(), doc! { "a": 10 });
        assert_eq!(
            to_document(query.projection.as_ref().unwrap(), "projection").unwrap(),
            doc! { "_id": 0 }
        );
        assert_eq!(
            to_document(query.sort.as_ref().unwrap(), "sort").unwrap(),
            doc! { "b": 1 }
        );
    }

    #[test]
    fn date_literal_reaches_driver_as_datetime() {
        let query = parse(r#"db.c.find({"ts": {"$gt": new Date(5)}})"#, "db1").unwrap();

        let filter = to_document(&query.filter, "find").unwrap();
        let ts = filter.get_document("ts").unwrap();
        assert_eq!(ts.get("$gt"), Some(&Bson::DateTime(bson::DateTime::from_millis(5))));
    }

    #[test]
    fn pipeline_appends_sort_stage() {
        let query = parse(r#"db.c.aggregate([{"$match": {"a": 1}}]).sort({"a": -1})"#, "db1").unwrap();

        let pipeline = to_pipeline(&query).unwrap();
        assert_eq!(
            pipeline,
            vec![doc! { "$match": { "a": 1 } }, doc! { "$sort": { "a": -1 } }]
        );
    }

    #[test]
    fn scalar_stage_is_rejected() {
        let query = parse("db.c.aggregate([1])", "db1").unwrap();

        let err = to_pipeline(&query).unwrap_err();
        assert_eq!(err.to_string(), "'aggregate' argument must be a document, got int32");
    }

    #[test]
    fn object_filter_is_not_a_pipeline() {
        let mut query = parse("db.c.aggregate()", "db1").unwrap();
        query.filter = Value::Document(Default::default());

        assert_eq!(query.pipeline(), Err(QueryError::UnsupportedAggregatePayload));
        assert!(to_pipeline(&query).is_err());
    }

    #[test]
    fn array_filter_is_not_a_find_filter() {
        let err = to_document(&Value::Array(Vec::new()), "find").unwrap_err();
        assert_eq!(err.to_string(), "'find' argument must be a document, got array");
    }
}
