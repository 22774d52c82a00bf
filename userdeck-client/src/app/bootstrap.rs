use std::sync::Arc;

use anyhow::Context;
use log::{info, warn};

use crate::domains::network::NetworkMonitor;
use crate::domains::preferences::PreferenceStore;
use crate::domains::users::{CacheTiming, DashboardContext, UserCache};
use crate::infra::api_client::ApiClient;
use crate::infra::config::Config;
use crate::infra::services::{UserDirectoryApiAdapter, UserDirectoryService};
use crate::infra::storage::{DisabledStore, JsonFileStore, KeyValueStore, UrlStore};
use crate::infra::testing::TestUserDirectory;

/// Wire the dashboard against the HTTP backend named in `config`.
pub fn http_context(
    config: &Config,
    network: NetworkMonitor,
    url: Arc<dyn UrlStore>,
) -> anyhow::Result<DashboardContext> {
    let client = ApiClient::new(config.server_url.clone())
        .context("building the HTTP client")?;
    let service: Arc<dyn UserDirectoryService> =
        Arc::new(UserDirectoryApiAdapter::new(Arc::new(client)));
    Ok(context(config, service, network, url, preference_backend()))
}

/// Wire the dashboard against an in-memory directory, starting online.
pub fn stub_context(
    config: &Config,
    directory: TestUserDirectory,
    url: Arc<dyn UrlStore>,
    storage: Arc<dyn KeyValueStore>,
) -> DashboardContext {
    stub_context_with(config, directory, NetworkMonitor::default(), url, storage)
}

pub fn stub_context_with(
    config: &Config,
    directory: TestUserDirectory,
    network: NetworkMonitor,
    url: Arc<dyn UrlStore>,
    storage: Arc<dyn KeyValueStore>,
) -> DashboardContext {
    context(config, Arc::new(directory), network, url, storage)
}

/// `network` carries the platform's connectivity flag at startup.
pub fn context(
    config: &Config,
    service: Arc<dyn UserDirectoryService>,
    network: NetworkMonitor,
    url: Arc<dyn UrlStore>,
    storage: Arc<dyn KeyValueStore>,
) -> DashboardContext {
    let timing = CacheTiming {
        stale_after: config.stale_after(),
        evict_after: config.evict_after(),
    };
    DashboardContext {
        cache: UserCache::new(service, network.clone(), timing),
        network,
        preferences: Arc::new(PreferenceStore::new(storage)),
        url,
    }
}

/// JSON files under the platform data directory, or nothing at all.
pub fn preference_backend() -> Arc<dyn KeyValueStore> {
    match JsonFileStore::open_default() {
        Ok(store) => {
            info!(
                "[Bootstrap] Preferences stored under {}",
                store.root().display()
            );
            Arc::new(store)
        }
        Err(e) => {
            warn!("[Bootstrap] {}; preferences will not persist", e);
            Arc::new(DisabledStore)
        }
    }
}
