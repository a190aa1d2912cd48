use std::borrow::Cow;

use crate::error::QueryError;
use crate::extjson::{DecodeError, decode_args};
use crate::literal::patch_literals;
use crate::value::{Document, Value};

const FIND_SENTINEL: &str = ".find(";
const AGGREGATE_SENTINEL: &str = ".aggregate(";
const SORT_SENTINEL: &str = ").sort(";
const DATE_CALL: &str = "new Date(";

/// Database segment that resolves to the datasource's default database.
pub const DEFAULT_DATABASE_ALIAS: &str = "db";

// ═══════════════════════════════════════════════════════════════
//  Query model
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Find,
    Aggregate,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Find => "find",
            Method::Aggregate => "aggregate",
        }
    }

    fn default_args(&self) -> &'static str {
        match self {
            Method::Find => "{}",
            Method::Aggregate => "[]",
        }
    }

    fn empty_filter(&self) -> Value {
        match self {
            Method::Find => Value::Document(Document::new()),
            Method::Aggregate => Value::Array(Vec::new()),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `<db>.<collection>.<method>(<filter>[, <projection>])[.sort(<sort>)]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub database: String,
    pub collection: String,
    pub method: Method,
    /// Filter document for `find`, stage array for `aggregate`.
    pub filter: Value,
    /// Only ever set for `find`.
    pub projection: Option<Value>,
    pub sort: Option<Value>,
}

impl Query {
    /// Aggregation stages, with a trailing `$sort` stage when a sort was given.
    pub fn pipeline(&self) -> Result<Vec<Value>, QueryError> {
        let Value::Array(stages) = &self.filter else {
            return Err(QueryError::UnsupportedAggregatePayload);
        };
        let mut stages = stages.clone();
        if let Some(sort) = &self.sort {
            let mut stage = Document::with_capacity(1);
            stage.push("$sort", sort.clone());
            stages.push(Value::Document(stage));
        }
        Ok(stages)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Parser
// ═══════════════════════════════════════════════════════════════

/// Parse shell-style query text. A database segment of `db` resolves to
/// `default_database`.
pub fn parse(text: &str, default_database: &str) -> Result<Query, QueryError> {
    let text = text.trim();
    let tokens = tokenize(text).ok_or_else(|| QueryError::syntax(text))?;
    let method = tokens.method;

    let database = if tokens.database == DEFAULT_DATABASE_ALIAS {
        default_database
    } else {
        tokens.database
    };

    let args = if tokens.args.trim().is_empty() {
        method.default_args()
    } else {
        tokens.args
    };
    let mut items = decode_args(&escape_date_literals(args))
        .map_err(|e| argument_error(method.as_str(), args, e))?
        .into_iter();

    let mut filter = items.next().unwrap_or_else(|| method.empty_filter());
    patch_literals(&mut filter);

    let projection = match method {
        Method::Find => items.next(),
        Method::Aggregate => None,
    };

    let sort = if tokens.sort_args.trim().is_empty() {
        None
    } else {
        decode_args(tokens.sort_args)
            .map_err(|e| argument_error("sort", tokens.sort_args, e))?
            .into_iter()
            .next()
    };

    tracing::debug!(
        database = %database,
        collection = %tokens.collection,
        method = %method,
        "parsed query"
    );

    Ok(Query {
        database: database.to_string(),
        collection: tokens.collection.to_string(),
        method,
        filter,
        projection,
        sort,
    })
}

fn argument_error(clause: &str, fragment: &str, err: DecodeError) -> QueryError {
    QueryError::ArgumentDecode {
        clause: clause.to_string(),
        fragment: fragment.to_string(),
        detail: err.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tokenizer — sentinel search, no full grammar
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, PartialEq)]
struct Tokens<'a> {
    database: &'a str,
    collection: &'a str,
    method: Method,
    args: &'a str,
    sort_args: &'a str,
}

fn tokenize(text: &str) -> Option<Tokens<'_>> {
    let (_, end, method) = find_method(text)?;

    // `<db>.<collection>.<method>`, without the opening parenthesis.
    let mut names = text[..end - 1].split('.');
    let (database, collection, _method) = (names.next()?, names.next()?, names.next()?);
    if names.next().is_some() || database.is_empty() || collection.is_empty() {
        return None;
    }

    if !text.ends_with(')') {
        return None;
    }
    let close = text.len() - 1;

    let (args, sort_args) = match text[end..].find(SORT_SENTINEL) {
        Some(pos) => {
            let sort_start = end + pos;
            (&text[end..sort_start], &text[sort_start + SORT_SENTINEL.len()..close])
        }
        None => (&text[end..close], ""),
    };

    Some(Tokens {
        database,
        collection,
        method,
        args,
        sort_args,
    })
}

/// Earliest method sentinel: `(start, end, method)` where `end` is the
/// index just past the opening parenthesis.
fn find_method(text: &str) -> Option<(usize, usize, Method)> {
    [
        (FIND_SENTINEL, Method::Find),
        (AGGREGATE_SENTINEL, Method::Aggregate),
    ]
    .into_iter()
    .filter_map(|(sentinel, method)| {
        text.find(sentinel)
            .map(|start| (start, start + sentinel.len(), method))
    })
    .min_by_key(|(start, _, _)| *start)
}

/// Quote every bare `new Date(<digits>)` as `"${new Date(<digits>)}"` so the
/// argument list becomes valid JSON. Text inside string literals is kept.
fn escape_date_literals(args: &str) -> Cow<'_, str> {
    if !args.contains(DATE_CALL) {
        return Cow::Borrowed(args);
    }

    let mut out = String::with_capacity(args.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = args;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(len) = date_call_len(rest) {
            out.push_str("\"${");
            out.push_str(&rest[..len]);
            out.push_str("}\"");
            rest = &rest[len..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Length of a `new Date(<digits>)` call at the start of `s`.
fn date_call_len(s: &str) -> Option<usize> {
    let digits = s.strip_prefix(DATE_CALL)?;
    let n = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    (n > 0 && digits[n..].starts_with(')')).then_some(DATE_CALL.len() + n + 1)
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn doc(entries: Vec<(&str, Value)>) -> Value {
        Value::Document(entries.into_iter().collect())
    }

    fn tokens<'a>(
        database: &'a str,
        collection: &'a str,
        method: Method,
        args: &'a str,
        sort_args: &'a str,
    ) -> Option<Tokens<'a>> {
        Some(Tokens {
            database,
            collection,
            method,
            args,
            sort_args,
        })
    }

    #[test]
    fn tokenize_rejects_malformed_text() {
        for text in ["", "db.find()", "db.test.insert()", "db.test.find();", "db..find()"] {
            assert_eq!(tokenize(text), None, "{text:?}");
        }
    }

    #[test]
    fn tokenize_splits_arguments() {
        assert_eq!(tokenize("db.test.find()"), tokens("db", "test", Method::Find, "", ""));
        assert_eq!(
            tokenize("db.test.find({},{})"),
            tokens("db", "test", Method::Find, "{},{}", "")
        );
        assert_eq!(
            tokenize("db.test.find().sort({})"),
            tokens("db", "test", Method::Find, "", "{}")
        );
        assert_eq!(
            tokenize("db.test.find({},{}).sort({})"),
            tokens("db", "test", Method::Find, "{},{}", "{}")
        );
        assert_eq!(
            tokenize("db.test.aggregate()"),
            tokens("db", "test", Method::Aggregate, "", "")
        );
        assert_eq!(
            tokenize("db.test.aggregate([])"),
            tokens("db", "test", Method::Aggregate, "[]", "")
        );
        assert_eq!(
            tokenize("db.test.aggregate([]).sort({})"),
            tokens("db", "test", Method::Aggregate, "[]", "{}")
        );
    }

    #[test]
    fn find_method_picks_earliest_sentinel() {
        assert_eq!(find_method("db.collection.find({})"), Some((13, 19, Method::Find)));
        assert_eq!(find_method("db.collection.count({})"), None);
    }

    #[test]
    fn parses_minimal_find() {
        let query = parse("db.test.find()", "db1").unwrap();
        assert_eq!(
            query,
            Query {
                database: "db1".into(),
                collection: "test".into(),
                method: Method::Find,
                filter: doc(vec![]),
                projection: None,
                sort: None,
            }
        );
    }

    #[test]
    fn parses_empty_sort() {
        let query = parse("db.test.find().sort()", "db1").unwrap();
        assert_eq!(query.filter, doc(vec![]));
        assert_eq!(query.sort, None);
    }

    #[test]
    fn parses_complex_find() {
        let query = parse(r#"db.test.find({"a": 10},{"_id": 0}).sort({"b": 1})"#, "db1").unwrap();
        assert_eq!(query.database, "db1");
        assert_eq!(query.filter, doc(vec![("a", Value::Int32(10))]));
        assert_eq!(query.projection, Some(doc(vec![("_id", Value::Int32(0))])));
        assert_eq!(query.sort, Some(doc(vec![("b", Value::Int32(1))])));
    }

    #[test]
    fn explicit_database_overrides_default() {
        assert_eq!(parse("db2.test.find()", "db1").unwrap().database, "db2");
    }

    #[test]
    fn parses_minimal_aggregate() {
        let query = parse("db.test.aggregate()", "db1").unwrap();
        assert_eq!(query.method, Method::Aggregate);
        assert_eq!(query.filter, Value::Array(vec![]));
        assert_eq!(query.projection, None);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert!(parse("  db.test.find()\n", "db1").is_ok());
    }

    #[test]
    fn reports_syntax_error() {
        let err = parse("wibble", "db1").unwrap_err();
        assert_eq!(err, QueryError::syntax("wibble"));
        assert_eq!(err.to_string(), "'wibble' is not a valid MongoDB query expression");
    }

    #[test]
    fn reports_invalid_find_arguments() {
        match parse("db.test.find(wibble)", "db1").unwrap_err() {
            QueryError::ArgumentDecode { clause, fragment, .. } => {
                assert_eq!(clause, "find");
                assert_eq!(fragment, "wibble");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_invalid_sort_arguments() {
        let err = parse("db.test.find().sort(wibble)", "db1").unwrap_err();
        assert!(matches!(
            err,
            QueryError::ArgumentDecode { ref clause, .. } if clause == "sort"
        ));
        assert!(err.to_string().starts_with("the args 'wibble' to the 'sort' method are not valid"));
    }

    #[test]
    fn escapes_bare_date_calls() {
        assert_eq!(
            escape_date_literals(r#"{"t": {"$gt": new Date(5)}}"#),
            r#"{"t": {"$gt": "${new Date(5)}"}}"#
        );
        assert_eq!(
            escape_date_literals(r#"{"a": new Date(1), "b": new Date(2)}"#),
            r#"{"a": "${new Date(1)}", "b": "${new Date(2)}"}"#
        );
    }

    #[test]
    fn date_calls_inside_strings_are_kept() {
        let args = r#"{"note": "new Date(5)", "esc": "\"new Date(6)"}"#;
        assert_eq!(escape_date_literals(args), args);
    }

    #[test]
    fn date_calls_without_digits_are_kept() {
        assert_eq!(escape_date_literals("new Date()"), "new Date()");
    }

    #[test]
    fn patches_dates_in_filter_only() {
        let query = parse(
            r#"db.test.find({"t": {"$gte": new Date(5)}}).sort({"t": -1})"#,
            "db1",
        )
        .unwrap();
        let at = Value::DateTime(DateTime::from_timestamp_millis(5).unwrap());

        assert_eq!(query.filter, doc(vec![("t", doc(vec![("$gte", at)]))]));
        assert_eq!(query.sort, Some(doc(vec![("t", Value::Int32(-1))])));
    }

    #[test]
    fn pipeline_appends_sort_stage() {
        let query = parse(
            r#"db.test.aggregate([{"$match": {"a": 1}}]).sort({"b": 1})"#,
            "db1",
        )
        .unwrap();
        let stages = query.pipeline().unwrap();

        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1], doc(vec![("$sort", doc(vec![("b", Value::Int32(1))]))]));
    }

    #[test]
    fn pipeline_requires_array() {
        let query = parse(r#"db.test.aggregate({"a": 1})"#, "db1").unwrap();
        assert_eq!(query.pipeline(), Err(QueryError::UnsupportedAggregatePayload));
    }
}
