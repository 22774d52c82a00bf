//! URL restore, pagination reset and debounced search through the dashboard

mod common;

use std::time::Duration;

use tokio::time::Instant;
use userdeck_client::common::task::Task;
use userdeck_client::domains::users::{LoadState, Message, SettleLatch};
use userdeck_client::infra::storage::UrlStore;
use userdeck_model::prelude::{Pagination, QueryParams, StatusFilter};

#[tokio::test]
async fn mounting_from_the_url_restores_the_view_without_a_reset() {
    let harness = common::mounted("page=3&status=active&query=bob").await;
    let state = harness.dashboard.view_state();

    assert_eq!(state.pagination(), Pagination::new(3, 10));
    assert_eq!(state.status(), StatusFilter::Active);
    assert_eq!(state.search_text(), "bob");
    assert_eq!(state.latch(), SettleLatch::Settled);
    assert!(harness.url.history().is_empty());

    let view = harness.dashboard.view();
    assert_eq!(view.pagination.page, 3);
    assert_eq!(view.search_text, "bob");
    assert_eq!(harness.directory.list_calls(), 1);
}

#[tokio::test]
async fn status_change_resets_the_page_and_page_size_does_not() {
    let mut harness = common::mounted("page=3&status=active").await;

    let task = harness
        .dashboard
        .update(Message::StatusFilterChanged(StatusFilter::Inactive));
    common::settle(&mut harness.dashboard, task).await;
    assert_eq!(harness.dashboard.view_state().pagination().page, 1);
    assert_eq!(harness.url.read_query(), "page=1&status=inactive");

    let task = harness.dashboard.update(Message::PageChanged(2));
    common::settle(&mut harness.dashboard, task).await;
    let task = harness.dashboard.update(Message::PageSizeChanged(3));
    common::settle(&mut harness.dashboard, task).await;

    assert_eq!(
        harness.dashboard.view_state().pagination(),
        Pagination::new(2, 3)
    );
    assert_eq!(
        harness.url.read_query(),
        "page=2&pageSize=3&status=inactive"
    );
    assert_eq!(common::row_names(&harness.dashboard), vec![
        "Jonas Berg",
        "Liam Byrne"
    ]);
}

#[tokio::test(start_paused = true)]
async fn rapid_search_input_settles_once_after_the_window() {
    let mut harness = common::mounted("page=2").await;
    assert_eq!(harness.directory.list_calls(), 1);

    let first = harness.dashboard.update(Message::SearchInput("b".into()));
    let second = harness.dashboard.update(Message::SearchInput("bo".into()));
    let last_input = Instant::now();
    let third = harness.dashboard.update(Message::SearchInput("bob".into()));

    assert_eq!(harness.dashboard.view().search_text, "bob");
    assert_eq!(harness.dashboard.view_state().params().query, "");
    assert!(harness.url.history().is_empty());

    let settled = Task::batch([first, second, third]).collect().await;
    assert_eq!(last_input.elapsed(), Duration::from_millis(300));
    assert!(matches!(settled.as_slice(), [Message::SearchSettled(3)]));

    let task = Task::batch(
        settled
            .into_iter()
            .map(|message| harness.dashboard.update(message))
            .collect::<Vec<_>>(),
    );
    common::settle(&mut harness.dashboard, task).await;

    assert_eq!(harness.url.read_query(), "page=1&query=bob");
    assert_eq!(harness.directory.list_calls(), 2);
    assert_eq!(common::row_names(&harness.dashboard), vec![
        "Bob Stone",
        "Bobby Fischer"
    ]);
}

#[tokio::test]
async fn results_for_superseded_params_are_cached_but_not_shown() {
    let mut harness = common::mounted("").await;
    harness.directory.pause_lists();

    let slow = harness.dashboard.update(Message::PageChanged(2));
    assert_eq!(harness.dashboard.load_state(), &LoadState::Loading);
    let back = harness.dashboard.update(Message::PageChanged(1));
    assert_eq!(harness.dashboard.load_state(), &LoadState::Idle);

    harness.directory.resume_lists();
    common::settle(&mut harness.dashboard, Task::batch([slow, back])).await;

    let view = harness.dashboard.view();
    assert_eq!(view.pagination.page, 1);
    assert_eq!(view.rows[0].name, "Alice Moreau");
    assert_eq!(harness.dashboard.load_state(), &LoadState::Idle);

    let page_two = QueryParams::new(Pagination::new(2, 10), "", StatusFilter::All);
    assert_eq!(
        harness.dashboard.cache().peek(&page_two).map(|p| p.users.len()),
        Some(2)
    );
}

#[tokio::test]
async fn group_memberships_render_as_named_chips() {
    let harness = common::mounted("").await;
    let view = harness.dashboard.view();
    let alice = &view.rows[0];

    let labels: Vec<&str> =
        alice.groups.iter().map(|chip| chip.label.as_str()).collect();
    assert_eq!(labels, vec!["Admins", "Users"]);
    assert!(view.rows[1].groups.is_empty());
}
