use std::sync::Arc;

use crate::domains::network::NetworkMonitor;
use crate::domains::users::{Dashboard, DashboardContext};
use crate::infra::config::Config;
use crate::infra::storage::UrlStore;

pub mod bootstrap;
pub mod runtime;
pub mod subscriptions;

pub use runtime::{Runtime, RuntimeError};

/// Mount the dashboard on `ctx` and start driving it.
pub fn application(ctx: DashboardContext, config: &Config) -> Runtime {
    let (dashboard, boot) = Dashboard::mount(ctx, config);
    Runtime::start(dashboard, boot)
}

/// [`application`] against the HTTP backend named in `config`.
pub fn http_application(
    config: &Config,
    network: NetworkMonitor,
    url: Arc<dyn UrlStore>,
) -> anyhow::Result<Runtime> {
    let ctx = bootstrap::http_context(config, network, url)?;
    Ok(application(ctx, config))
}
