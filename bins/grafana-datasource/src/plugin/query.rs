use serde::Deserialize;

/// The query model sent from the Grafana frontend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoQuery {
    #[serde(default)]
    pub query_text: String,
    /// Frontend display hint; the backend returns the same table either way.
    #[serde(default)]
    pub format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_camel_case() {
        let q: MongoQuery =
            serde_json::from_str(r#"{"queryText": "db.c.find()", "format": "table"}"#).unwrap();
        assert_eq!(q.query_text, "db.c.find()");
        assert_eq!(q.format, "table");
    }

    #[test]
    fn fields_default_to_empty() {
        let q: MongoQuery = serde_json::from_str("{}").unwrap();
        assert!(q.query_text.is_empty());
        assert!(q.format.is_empty());
    }
}
