use mongo_query::run_query;
use mongo_store::MongoStore;
use tokio_util::sync::CancellationToken;

use crate::config::{CliConfig, RunArgs};
use crate::error::CliError;

pub async fn run(args: RunArgs) -> Result<(), CliError> {
    let config = CliConfig::load(&args.config.config)?;
    tracing::debug!(config = %args.config.config, "loaded config");

    let store = MongoStore::connect(&config.store()).await?;

    // --- Ctrl-C cancels the in-flight query ---
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, cancelling query");
            signal_token.cancel();
        }
    });

    let table = run_query(&store, &args.query, &config.runner(), &token).await?;
    tracing::info!(
        rows = table.row_count(),
        columns = table.columns.len(),
        "query finished"
    );

    println!("{}", serde_json::to_string_pretty(&table)?);
    Ok(())
}
