use mongo_query::QueryExecutor;
use mongo_store::MongoStore;

use crate::config::{CliConfig, ConfigArgs};
use crate::error::CliError;

pub async fn run(args: ConfigArgs) -> Result<(), CliError> {
    let config = CliConfig::load(&args.config)?;
    let store = MongoStore::connect(&config.store()).await?;

    store.ping().await?;
    println!("Data source is working");
    Ok(())
}
