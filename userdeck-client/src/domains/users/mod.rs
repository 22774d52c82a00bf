//! Users dashboard domain
//!
//! Ties the view state, the remote cache, the preference store and the
//! network monitor together behind one `update`/`view` pair.

pub mod cache;
pub mod messages;
pub mod update;
pub mod view_model;
pub mod view_state;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use userdeck_model::prelude::{UserID, ViewPreferences};

use crate::common::boundary::{self, RenderFault};
use crate::common::debounce::Debouncer;
use crate::common::task::Task;
use crate::domains::network::NetworkMonitor;
use crate::domains::preferences::PreferenceStore;
use crate::infra::config::Config;
use crate::infra::storage::UrlStore;

pub use self::cache::{CacheTiming, UserCache};
pub use self::messages::Message;
pub use self::view_model::{DashboardView, Notification, NotificationKind};
pub use self::view_state::{SettleLatch, ViewState};

/// How long a notification stays up before it dismisses itself
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Idle,
    /// No data for the current params, request in flight
    Loading,
    /// Data shown, refresh in flight
    Fetching,
    /// Server error with its raw message
    Error(String),
    /// Backend unreachable or connectivity lost
    Offline,
}

/// Shared collaborators the dashboard is mounted with.
#[derive(Clone)]
pub struct DashboardContext {
    pub cache: Arc<UserCache>,
    pub network: NetworkMonitor,
    pub preferences: Arc<PreferenceStore>,
    pub url: Arc<dyn UrlStore>,
}

impl std::fmt::Debug for DashboardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardContext")
            .field("cache", &self.cache)
            .field("network", &self.network)
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

/// Generic panel shown in place of a dashboard whose render panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultPanel {
    pub title: &'static str,
    pub detail: String,
}

impl FaultPanel {
    pub fn retry(&self) -> Message {
        Message::Retry
    }
}

impl From<RenderFault> for FaultPanel {
    fn from(fault: RenderFault) -> Self {
        Self {
            title: "Something went wrong while showing users.",
            detail: fault.message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Dashboard(DashboardView),
    Fault(FaultPanel),
}

pub struct Dashboard {
    view_state: ViewState,
    search: Debouncer<String>,
    cache: Arc<UserCache>,
    network: NetworkMonitor,
    preferences: Arc<PreferenceStore>,
    view_id: String,
    grid: ViewPreferences,
    load_state: LoadState,
    pending_toggles: HashSet<UserID>,
    notifications: Vec<Notification>,
    next_notification: u64,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("view_state", &self.view_state)
            .field("load_state", &self.load_state)
            .field("view_id", &self.view_id)
            .field("pending_toggles", &self.pending_toggles.len())
            .field("notifications", &self.notifications.len())
            .finish()
    }
}

impl Dashboard {
    /// Restore view state from the URL, load grid preferences and start
    /// the first fetch.
    pub fn mount(ctx: DashboardContext, config: &Config) -> (Self, Task<Message>) {
        let view_state = ViewState::mount(ctx.url, config.default_page_size);
        let grid = ctx.preferences.load(&config.view_id);
        info!(
            "[Users] Mounted dashboard '{}' at {:?}",
            config.view_id,
            view_state.params()
        );

        let mut dashboard = Self {
            view_state,
            search: Debouncer::new(config.search_debounce()),
            cache: ctx.cache,
            network: ctx.network,
            preferences: ctx.preferences,
            view_id: config.view_id.clone(),
            grid,
            load_state: LoadState::Idle,
            pending_toggles: HashSet::new(),
            notifications: Vec::new(),
            next_notification: 0,
        };
        let task = dashboard.load();
        (dashboard, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        update::update_users(self, message)
    }

    pub fn view(&self) -> DashboardView {
        let params = self.view_state.params();
        let data = self.cache.peek(&params);
        let pending = |id: &UserID| self.pending_toggles.contains(id);
        view_model::build(view_model::ViewInputs {
            search_text: self.view_state.search_text(),
            status_filter: self.view_state.status(),
            page: params.page,
            page_size: params.page_size,
            data: data.as_ref(),
            load_state: &self.load_state,
            preferences: &self.grid,
            pending: &pending,
            notifications: &self.notifications,
        })
    }

    /// Render through the fault boundary.
    pub fn render(&self) -> Screen {
        self.render_with(Self::view)
    }

    pub(crate) fn render_with(
        &self,
        view: impl FnOnce(&Self) -> DashboardView,
    ) -> Screen {
        match boundary::guard("users dashboard", || view(self)) {
            Ok(view) => Screen::Dashboard(view),
            Err(fault) => Screen::Fault(fault.into()),
        }
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view_state
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn preferences(&self) -> &ViewPreferences {
        &self.grid
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn cache(&self) -> &Arc<UserCache> {
        &self.cache
    }

    pub fn network(&self) -> &NetworkMonitor {
        &self.network
    }

    /// The current params have settled data and nothing is in flight.
    pub fn is_settled(&self) -> bool {
        match self.load_state {
            LoadState::Idle => {
                self.cache.peek(&self.view_state.params()).is_some()
            }
            LoadState::Error(_) | LoadState::Offline => true,
            LoadState::Loading | LoadState::Fetching => false,
        }
    }

    /// Stop timers and requests. The runtime calls this on teardown.
    pub fn unmount(&mut self) {
        debug!("[Users] Unmounting dashboard '{}'", self.view_id);
        self.search.cancel();
        self.cache.cancel_in_flight();
    }

    /// Fetch the current params and derive the load state from what the
    /// cache already holds.
    fn load(&mut self) -> Task<Message> {
        let params = self.view_state.params();
        let has_data = self.cache.peek(&params).is_some();
        let future = self.cache.fetch(params.clone());

        self.load_state = match (has_data, self.cache.is_fetching(&params)) {
            (false, _) => LoadState::Loading,
            (true, true) => LoadState::Fetching,
            (true, false) => LoadState::Idle,
        };

        Task::perform(future, move |result| Message::UsersLoaded {
            params,
            result,
        })
    }

    fn notify(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Task<Message> {
        self.next_notification += 1;
        let id = self.next_notification;
        self.notifications.push(Notification {
            id,
            kind,
            message: message.into(),
        });
        Task::perform(tokio::time::sleep(NOTIFICATION_TTL), move |_| {
            Message::DismissNotification(id)
        })
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.cache.cancel_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::bootstrap;
    use crate::infra::storage::{MemoryKeyValueStore, MemoryUrlStore};
    use crate::infra::errors::SyncError;
    use crate::infra::testing::TestUserDirectory;

    fn mount_on(
        directory: &TestUserDirectory,
        query: &str,
    ) -> (Dashboard, Task<Message>) {
        let config = Config::default();
        let ctx = bootstrap::stub_context(
            &config,
            directory.clone(),
            Arc::new(MemoryUrlStore::new(query)),
            Arc::new(MemoryKeyValueStore::new()),
        );
        Dashboard::mount(ctx, &config)
    }

    fn dashboard() -> Dashboard {
        mount_on(&TestUserDirectory::default(), "page=2").0
    }

    fn was_cancelled(messages: &[Message]) -> bool {
        matches!(
            messages,
            [Message::UsersLoaded {
                result: Err(SyncError::Cancelled),
                ..
            }]
        )
    }

    #[tokio::test]
    async fn render_panics_become_a_fault_panel() {
        let dashboard = dashboard();
        let screen = dashboard.render_with(|_| panic!("row renderer exploded"));

        let Screen::Fault(panel) = screen else {
            panic!("expected the fault panel");
        };
        assert_eq!(panel.detail, "row renderer exploded");
        assert!(matches!(panel.retry(), Message::Retry));
    }

    #[tokio::test]
    async fn mount_starts_loading_the_restored_page() {
        let dashboard = dashboard();
        assert_eq!(dashboard.load_state(), &LoadState::Loading);
        assert!(!dashboard.is_settled());
        assert!(matches!(dashboard.render(), Screen::Dashboard(_)));
    }

    #[tokio::test]
    async fn unmount_stops_the_search_timer_and_the_pending_fetch() {
        let directory = TestUserDirectory::default();
        directory.pause_lists();
        let (mut dashboard, boot) = mount_on(&directory, "");
        let search = dashboard.update(Message::SearchInput("bob".into()));
        let cache = Arc::clone(dashboard.cache());
        let params = dashboard.view_state().params();
        assert!(cache.is_fetching(&params));

        dashboard.unmount();
        directory.resume_lists();

        assert!(search.collect().await.is_empty());
        assert!(was_cancelled(&boot.collect().await));
        tokio::task::yield_now().await;
        assert!(!cache.is_fetching(&params));
        assert!(cache.peek(&params).is_none());
        assert_eq!(dashboard.view_state().settled_search(), "");
    }

    #[tokio::test]
    async fn dropping_the_dashboard_cancels_its_work() {
        let directory = TestUserDirectory::default();
        directory.pause_lists();
        let (mut dashboard, boot) = mount_on(&directory, "");
        let search = dashboard.update(Message::SearchInput("bob".into()));
        let cache = Arc::clone(dashboard.cache());
        let params = dashboard.view_state().params();

        drop(dashboard);
        directory.resume_lists();

        assert!(search.collect().await.is_empty());
        assert!(was_cancelled(&boot.collect().await));
        tokio::task::yield_now().await;
        assert!(cache.peek(&params).is_none());
    }
}
