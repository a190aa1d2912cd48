//! Shell-style MongoDB query text in, typed columnar table out.
//!
//! `parser` turns `db.<collection>.find(...)` / `.aggregate(...)` text into a
//! [`Query`]; a [`QueryExecutor`] runs it; [`FieldBuilder`] infers one scalar
//! type per key and materializes dense, nullable columns.

pub mod canonical;
pub mod convert;
pub mod error;
pub mod executor;
pub mod extjson;
pub mod field;
pub mod literal;
pub mod parser;
pub mod runner;
pub mod table;
pub mod value;

pub use canonical::{Cell, FieldType, canonicalize};
pub use error::QueryError;
pub use executor::{QueryExecutor, RecordCursor};
pub use field::FieldBuilder;
pub use literal::patch_literals;
pub use parser::{Method, Query, parse};
pub use runner::{DEFAULT_MAX_ROWS, RunnerConfig, run_query};
pub use table::{Column, ColumnData, Table, Values};
pub use value::{Document, Value};

pub use tokio_util::sync::CancellationToken;
