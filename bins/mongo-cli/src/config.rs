use clap::{Args, Parser, Subcommand};
use mongo_query::{DEFAULT_MAX_ROWS, RunnerConfig};
use mongo_store::StoreConfig;
use serde::Deserialize;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "mongo-cli", about = "Run shell-style MongoDB queries and print typed tables")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query and print the resulting table as JSON
    Run(RunArgs),
    /// Check that the configured server answers
    Ping(ConfigArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Path to the TOML config file
    #[arg(long, default_value = "mongo-cli.toml", env = "MONGO_CLI_CONFIG")]
    pub config: String,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Query text, e.g. `db.users.find({"age": {"$gt": 30}})`
    pub query: String,

    #[command(flatten)]
    pub config: ConfigArgs,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Substituted for `db.` in query text.
    #[serde(default)]
    pub database: String,
    /// Row cap per query, `0` disables clipping.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_url() -> String {
    "mongodb://localhost:27017".into()
}
fn default_max_results() -> usize {
    DEFAULT_MAX_ROWS
}

impl CliConfig {
    pub fn load(path: &str) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &str) -> Result<Self, CliError> {
        toml::from_str(content)
            .map_err(|e| CliError::Config { context: "parse", detail: format!("'{path}': {e}") })
    }

    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }

    pub fn runner(&self) -> RunnerConfig {
        RunnerConfig {
            default_database: self.database.clone(),
            max_rows: self.max_results,
        }
    }
}
