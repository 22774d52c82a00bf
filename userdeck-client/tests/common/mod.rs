//! Shared harness for driving the dashboard without the runtime loop
#![allow(dead_code)]

use std::sync::Arc;

use userdeck_client::app::bootstrap;
use userdeck_client::common::task::Task;
use userdeck_client::domains::network::NetworkMonitor;
use userdeck_client::domains::users::{Dashboard, Message};
use userdeck_client::infra::config::Config;
use userdeck_client::infra::storage::{
    KeyValueStore, MemoryKeyValueStore, MemoryUrlStore,
};
use userdeck_client::infra::testing::TestUserDirectory;

pub struct Harness {
    pub dashboard: Dashboard,
    pub directory: TestUserDirectory,
    pub url: Arc<MemoryUrlStore>,
    pub storage: Arc<MemoryKeyValueStore>,
}

pub fn config() -> Config {
    Config::default()
}

pub fn mount(query: &str) -> (Harness, Task<Message>) {
    mount_with(
        query,
        TestUserDirectory::default(),
        Arc::new(MemoryKeyValueStore::new()),
    )
}

pub fn mount_with(
    query: &str,
    directory: TestUserDirectory,
    storage: Arc<MemoryKeyValueStore>,
) -> (Harness, Task<Message>) {
    mount_with_network(query, directory, NetworkMonitor::default(), storage)
}

pub fn mount_with_network(
    query: &str,
    directory: TestUserDirectory,
    network: NetworkMonitor,
    storage: Arc<MemoryKeyValueStore>,
) -> (Harness, Task<Message>) {
    let url = Arc::new(MemoryUrlStore::new(query));
    let backend: Arc<dyn KeyValueStore> = storage.clone();
    let ctx = bootstrap::stub_context_with(
        &config(),
        directory.clone(),
        network,
        url.clone(),
        backend,
    );
    let (dashboard, task) = Dashboard::mount(ctx, &config());
    (
        Harness {
            dashboard,
            directory,
            url,
            storage,
        },
        task,
    )
}

/// Mount and run the boot task to completion.
pub async fn mounted(query: &str) -> Harness {
    let (mut harness, task) = mount(query);
    settle(&mut harness.dashboard, task).await;
    harness
}

/// Resolve every future in `task`, apply the messages, return the follow-up.
pub async fn step(dashboard: &mut Dashboard, task: Task<Message>) -> Task<Message> {
    let messages = task.collect().await;
    Task::batch(
        messages
            .into_iter()
            .map(|message| dashboard.update(message))
            .collect::<Vec<_>>(),
    )
}

/// Step until no work remains.
pub async fn settle(dashboard: &mut Dashboard, mut task: Task<Message>) {
    while !task.is_none() {
        task = step(dashboard, task).await;
    }
}

pub fn row_names(dashboard: &Dashboard) -> Vec<String> {
    dashboard
        .view()
        .rows
        .into_iter()
        .map(|row| row.name)
        .collect()
}
