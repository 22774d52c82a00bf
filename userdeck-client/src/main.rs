use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use env_logger::{Builder, Target};
use log::LevelFilter;
use userdeck_client::app;
use userdeck_client::domains::network::NetworkMonitor;
use userdeck_client::domains::users::{LoadState, Screen};
use userdeck_client::infra::config::Config;
use userdeck_client::infra::storage::MemoryUrlStore;

/// Upper bound on the first settled load, above the HTTP client's own timeout
const SETTLE_TIMEOUT: Duration = Duration::from_secs(35);

fn init_logger() {
    Builder::new()
        .target(Target::Stderr)
        .filter_level(LevelFilter::Warn)
        .filter_module("userdeck_client", LevelFilter::Info)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    let config = Config::load();
    let query = std::env::args().nth(1).unwrap_or_default();
    log::info!("Connecting to {} with ?{}", config.server_url, query);

    // A terminal session has no connectivity signal; the first request
    // decides.
    let network = NetworkMonitor::new(true);
    let url = Arc::new(MemoryUrlStore::new(query));
    let mut runtime = app::http_application(&config, network, url)
        .context("starting the users dashboard")?;
    runtime
        .run_until_timeout(SETTLE_TIMEOUT, |dashboard| dashboard.is_settled())
        .await?;

    let dashboard = runtime.shutdown();
    match dashboard.render() {
        Screen::Dashboard(view) => {
            println!("?{}", dashboard.view_state().url_query());
            println!("{view}");
        }
        Screen::Fault(panel) => bail!("{}: {}", panel.title, panel.detail),
    }

    match dashboard.load_state() {
        LoadState::Error(message) => bail!("users request failed: {message}"),
        LoadState::Offline => bail!("backend at {} is unreachable", config.server_url),
        _ => Ok(()),
    }
}
