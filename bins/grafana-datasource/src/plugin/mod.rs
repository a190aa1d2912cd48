mod config;
mod data_service;
mod error;
mod frame;
mod query;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use grafana_plugin_sdk::backend::{self, async_trait};
use grafana_plugin_sdk::prelude::*;
use mongo_query::QueryExecutor;
use mongo_store::{MongoStore, StoreConfig};

use config::DatasourceConfig;

type InstanceSettings = backend::DataSourceInstanceSettings<serde_json::Value, serde_json::Value>;

// ═══════════════════════════════════════════════════════════════
//  Plugin struct
// ═══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, GrafanaPlugin)]
#[grafana_plugin(plugin_type = "datasource")]
pub struct MongoDbPlugin {
    /// One client per datasource uid, rebuilt when its connection settings change.
    clients: Arc<RwLock<HashMap<String, (StoreConfig, MongoStore)>>>,
}

impl MongoDbPlugin {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve the datasource config and a (possibly cached) client for it.
    async fn store(
        &self,
        settings: Option<&InstanceSettings>,
    ) -> Result<(DatasourceConfig, MongoStore), String> {
        let config = DatasourceConfig::from_settings(settings).map_err(|e| e.to_string())?;

        let cached = self
            .clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&config.uid)
            .filter(|(store_config, _)| *store_config == config.store)
            .map(|(_, store)| store.clone());
        if let Some(store) = cached {
            return Ok((config, store));
        }

        let store = MongoStore::connect(&config.store)
            .await
            .map_err(|e| e.to_string())?;
        tracing::info!(uid = %config.uid, "mongodb client cached");
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(config.uid.clone(), (config.store.clone(), store.clone()));
        Ok((config, store))
    }
}

// ═══════════════════════════════════════════════════════════════
//  DiagnosticsService
// ═══════════════════════════════════════════════════════════════

#[async_trait]
impl backend::DiagnosticsService for MongoDbPlugin {
    type CheckHealthError = std::convert::Infallible;
    type CollectMetricsError = std::convert::Infallible;

    async fn check_health(
        &self,
        request: backend::CheckHealthRequest<Self>,
    ) -> Result<backend::CheckHealthResponse, Self::CheckHealthError> {
        let store = match self
            .store(request.plugin_context.instance_settings.as_ref())
            .await
        {
            Ok((_, store)) => store,
            Err(e) => return Ok(backend::CheckHealthResponse::error(e)),
        };

        match store.ping().await {
            Ok(()) => Ok(backend::CheckHealthResponse::ok(
                "Data source is working".to_string(),
            )),
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                Ok(backend::CheckHealthResponse::error(e.to_string()))
            }
        }
    }

    async fn collect_metrics(
        &self,
        _request: backend::CollectMetricsRequest<Self>,
    ) -> Result<backend::CollectMetricsResponse, Self::CollectMetricsError> {
        Ok(backend::CollectMetricsResponse::new(None))
    }
}
