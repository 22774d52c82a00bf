//! The tokio message loop with subscriptions attached

use std::sync::Arc;
use std::time::Duration;

use userdeck_client::app::{self, RuntimeError, bootstrap};
use userdeck_client::domains::network::ConnectivityEvent;
use userdeck_client::domains::users::{LoadState, Message, NotificationKind};
use userdeck_client::infra::config::Config;
use userdeck_client::infra::storage::{MemoryKeyValueStore, MemoryUrlStore, UrlStore};
use userdeck_client::infra::testing::TestUserDirectory;
use userdeck_model::prelude::UserID;

const WAIT: Duration = Duration::from_secs(5);

fn start(directory: &TestUserDirectory, query: &str) -> (app::Runtime, Arc<MemoryUrlStore>) {
    start_with(Config::default(), directory, query)
}

fn start_with(
    config: Config,
    directory: &TestUserDirectory,
    query: &str,
) -> (app::Runtime, Arc<MemoryUrlStore>) {
    let url = Arc::new(MemoryUrlStore::new(query));
    let ctx = bootstrap::stub_context(
        &config,
        directory.clone(),
        url.clone(),
        Arc::new(MemoryKeyValueStore::new()),
    );
    (app::application(ctx, &config), url)
}

#[tokio::test]
async fn runtime_settles_the_first_load() {
    let directory = TestUserDirectory::default();
    let (mut runtime, url) = start(&directory, "status=inactive");

    runtime
        .run_until_timeout(WAIT, |dashboard| dashboard.is_settled())
        .await
        .unwrap();

    let view = runtime.dashboard().view();
    assert_eq!(view.pagination.total_count, 5);
    assert_eq!(view.rows.len(), 5);
    assert_eq!(url.read_query(), "page=1&status=inactive");
    assert_eq!(directory.list_calls(), 1);
    runtime.shutdown();
}

#[tokio::test]
async fn cache_revisions_drive_a_refetch_after_a_toggle() {
    let directory = TestUserDirectory::default();
    let (mut runtime, _url) = start(&directory, "");
    runtime
        .run_until_timeout(WAIT, |dashboard| dashboard.is_settled())
        .await
        .unwrap();

    runtime.dispatch(Message::ToggleStatus(UserID::new("4")));
    runtime
        .run_until_timeout(WAIT, |dashboard| {
            !dashboard.notifications().is_empty() && dashboard.is_settled()
        })
        .await
        .unwrap();

    let dashboard = runtime.dashboard();
    assert_eq!(dashboard.notifications()[0].kind, NotificationKind::Success);
    assert!(dashboard.view().rows[3].active);
    assert!(directory.list_calls() >= 2);
    runtime.shutdown();
}

#[tokio::test]
async fn connectivity_changes_arrive_through_the_monitor() {
    let directory = TestUserDirectory::default();
    let (mut runtime, _url) = start(&directory, "");
    runtime
        .run_until_timeout(WAIT, |dashboard| dashboard.is_settled())
        .await
        .unwrap();

    runtime.dashboard().network().handle(ConnectivityEvent::Offline);
    runtime
        .run_until_timeout(WAIT, |dashboard| {
            dashboard.load_state() == &LoadState::Offline
        })
        .await
        .unwrap();

    runtime.dashboard().network().handle(ConnectivityEvent::Online);
    runtime
        .run_until_timeout(WAIT, |dashboard| {
            dashboard.load_state() == &LoadState::Idle
        })
        .await
        .unwrap();
    runtime.shutdown();
}

#[tokio::test]
async fn zero_stale_window_does_not_refetch_without_input() {
    let directory = TestUserDirectory::default();
    let config = Config {
        stale_after_secs: 0,
        ..Config::default()
    };
    let (mut runtime, _url) = start_with(config, &directory, "");
    runtime
        .run_until_timeout(WAIT, |dashboard| dashboard.is_settled())
        .await
        .unwrap();

    let idle = runtime
        .run_until_timeout(Duration::from_millis(200), |_| false)
        .await;
    assert!(matches!(idle, Err(RuntimeError::TimedOut(_))));
    assert!(directory.list_calls() <= 2);
    runtime.shutdown();
}
