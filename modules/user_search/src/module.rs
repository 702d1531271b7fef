use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::UserSearchConfig;
use crate::contract::client::UserSearchApi;
use crate::domain::coordinator::SearchCoordinator;
use crate::domain::ports::{LocalSearchPort, RemoteSearchPort};
use crate::domain::trigger::{Debouncer, SearchTrigger};
use crate::gateways::SearchGateway;
use crate::infra::mock::{MockDataset, MockSearchEngine};
use crate::infra::remote::HttpSearchClient;

/// Wired user search: gateway, coordinator and entry gate built from config.
pub struct UserSearch {
    config: UserSearchConfig,
    gateway: Arc<SearchGateway>,
    coordinator: Arc<SearchCoordinator>,
}

impl UserSearch {
    /// Build everything from configuration. Without `api_url` the backend
    /// client is not constructed at all.
    pub fn from_config(config: UserSearchConfig) -> anyhow::Result<Self> {
        let dataset = match config.dataset_path.as_deref() {
            Some(path) => MockDataset::load(Path::new(path))?,
            None => MockDataset::embedded(),
        };
        let local: Arc<dyn LocalSearchPort> =
            Arc::new(MockSearchEngine::new(dataset).with_delay(config.mock_delay()));

        let remote: Option<Arc<dyn RemoteSearchPort>> = match config.backend_url() {
            Some(url) => {
                let client = HttpSearchClient::new(url, config.timeout())
                    .context("Failed to build backend search client")?;
                info!(base = %client.base_url(), "Backend search enabled");
                Some(Arc::new(client))
            }
            None => {
                info!("No backend configured, using mock search");
                None
            }
        };

        let gateway = Arc::new(
            SearchGateway::new(remote, local).with_default_limit(config.default_limit),
        );
        Ok(Self::with_gateway(config, gateway))
    }

    /// Assemble around an existing gateway (tests, custom ports).
    pub fn with_gateway(config: UserSearchConfig, gateway: Arc<SearchGateway>) -> Self {
        let api: Arc<dyn UserSearchApi> = gateway.clone();
        Self {
            config,
            gateway,
            coordinator: Arc::new(SearchCoordinator::new(api)),
        }
    }

    pub fn config(&self) -> &UserSearchConfig {
        &self.config
    }

    pub fn api(&self) -> Arc<dyn UserSearchApi> {
        self.gateway.clone()
    }

    pub fn has_backend(&self) -> bool {
        self.gateway.has_backend()
    }

    pub fn coordinator(&self) -> Arc<SearchCoordinator> {
        Arc::clone(&self.coordinator)
    }

    pub fn trigger(&self) -> SearchTrigger {
        SearchTrigger::new(self.config.min_query_len)
    }

    pub fn debouncer(&self) -> Debouncer {
        Debouncer::new(self.config.debounce())
    }
}
