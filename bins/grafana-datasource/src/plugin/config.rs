use mongo_query::{DEFAULT_MAX_ROWS, RunnerConfig};
use mongo_store::StoreConfig;
use serde::Deserialize;

use super::InstanceSettings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("datasource instance settings are missing")]
    Missing,

    #[error("datasource url is empty")]
    EmptyUrl,

    #[error("invalid jsonData: {0}")]
    JsonData(serde_json::Error),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonData {
    #[serde(default = "default_max_results")]
    max_results: usize,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_ROWS
}

/// Everything one datasource instance needs to answer queries.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasourceConfig {
    pub uid: String,
    pub store: StoreConfig,
    pub max_results: usize,
}

impl DatasourceConfig {
    pub fn from_settings(settings: Option<&InstanceSettings>) -> Result<Self, ConfigError> {
        let s = settings.ok_or(ConfigError::Missing)?;
        Self::from_parts(
            &s.uid,
            &s.url,
            &s.user,
            &s.database,
            &s.json_data,
            &s.decrypted_secure_json_data,
        )
    }

    fn from_parts(
        uid: &str,
        url: &str,
        user: &str,
        database: &str,
        json_data: &serde_json::Value,
        secure_json_data: &serde_json::Value,
    ) -> Result<Self, ConfigError> {
        if url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }

        let json_data = if json_data.is_null() {
            JsonData {
                max_results: default_max_results(),
            }
        } else {
            JsonData::deserialize(json_data).map_err(ConfigError::JsonData)?
        };

        let password = secure_json_data
            .get("password")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            uid: uid.to_string(),
            store: StoreConfig {
                url: url.to_string(),
                user: user.to_string(),
                password,
                database: database.to_string(),
            },
            max_results: json_data.max_results,
        })
    }

    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig {
            default_database: self.store.database.clone(),
            max_rows: self.max_results,
        }
    }
}
