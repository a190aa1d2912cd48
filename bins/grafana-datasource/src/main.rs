mod plugin;

use plugin::MongoDbPlugin;

#[grafana_plugin_sdk::main(
    services(data, diagnostics),
    init_subscriber = true,
)]
async fn plugin() -> MongoDbPlugin {
    MongoDbPlugin::new()
}
