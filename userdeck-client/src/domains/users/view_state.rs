//! Search, filter and pagination state mirrored into the URL query string
//!
//! The URL only ever describes state that drives the grid: raw search text
//! stays local until it settles. Settled search or status changes return
//! the grid to page 1, except the first settle after mount.

use std::sync::Arc;

use log::debug;
use userdeck_model::prelude::{
    DEFAULT_PAGE, Pagination, QueryParams, StatusFilter,
};

use crate::infra::storage::UrlStore;

/// One-shot latch that keeps the mount-time settle from resetting the page
/// restored from the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleLatch {
    NotYetSettled,
    Settled,
}

pub struct ViewState {
    url: Arc<dyn UrlStore>,
    default_page_size: u32,
    search_text: String,
    settled_search: String,
    status: StatusFilter,
    pagination: Pagination,
    previous_filters: (String, StatusFilter),
    latch: SettleLatch,
}

impl std::fmt::Debug for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewState")
            .field("search_text", &self.search_text)
            .field("settled_search", &self.settled_search)
            .field("status", &self.status)
            .field("pagination", &self.pagination)
            .field("latch", &self.latch)
            .finish()
    }
}

impl ViewState {
    /// Restore state from the current URL and settle the search it carries.
    pub fn mount(url: Arc<dyn UrlStore>, default_page_size: u32) -> Self {
        let raw = url.read_query();
        let params = QueryParams::from_url_query(&raw, default_page_size);
        debug!("[ViewState] Mounted from '{}' as {:?}", raw, params);

        let mut state = Self {
            url,
            default_page_size: default_page_size.max(1),
            search_text: params.query.clone(),
            settled_search: params.query.clone(),
            status: params.status,
            pagination: params.pagination(),
            previous_filters: (params.query, params.status),
            latch: SettleLatch::NotYetSettled,
        };
        state.filters_settled();

        // Normalize malformed or non-minimal query strings in place.
        if state.url_query() != raw.strip_prefix('?').unwrap_or(&raw) {
            state.write_url();
        }
        state
    }

    /// Parameters currently driving the grid.
    pub fn params(&self) -> QueryParams {
        QueryParams::new(
            self.pagination,
            self.settled_search.clone(),
            self.status,
        )
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn settled_search(&self) -> &str {
        &self.settled_search
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    pub fn latch(&self) -> SettleLatch {
        self.latch
    }

    /// Record raw search input. Nothing else changes until it settles.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Apply a settled search value. Returns whether the params changed.
    pub fn settle_search(&mut self, settled: impl Into<String>) -> bool {
        let settled = settled.into();
        if settled == self.settled_search {
            return false;
        }
        self.apply(|state| {
            state.settled_search = settled;
            state.filters_settled();
        })
    }

    pub fn set_status(&mut self, status: StatusFilter) -> bool {
        self.apply(|state| {
            state.status = status;
            state.filters_settled();
        })
    }

    /// Explicit page navigation. Never resets anything.
    pub fn set_page(&mut self, page: u32) -> bool {
        self.apply(|state| {
            state.pagination = Pagination::new(page, state.pagination.page_size);
        })
    }

    /// Change the page size, keeping the current page.
    pub fn set_page_size(&mut self, page_size: u32) -> bool {
        self.apply(|state| {
            state.pagination = Pagination::new(state.pagination.page, page_size);
        })
    }

    pub fn url_query(&self) -> String {
        self.params().to_url_query(self.default_page_size)
    }

    fn apply(&mut self, change: impl FnOnce(&mut Self)) -> bool {
        let before = self.params();
        change(self);
        let changed = self.params() != before;
        if changed {
            self.write_url();
        }
        changed
    }

    fn filters_settled(&mut self) {
        let current = (self.settled_search.clone(), self.status);
        match self.latch {
            SettleLatch::NotYetSettled => self.latch = SettleLatch::Settled,
            SettleLatch::Settled if current != self.previous_filters => {
                if self.pagination.page != DEFAULT_PAGE {
                    debug!(
                        "[ViewState] Filters changed, resetting page {} to 1",
                        self.pagination.page
                    );
                }
                self.pagination.page = DEFAULT_PAGE;
            }
            SettleLatch::Settled => {}
        }
        self.previous_filters = current;
    }

    fn write_url(&self) {
        let query = self.url_query();
        debug!("[ViewState] URL -> ?{}", query);
        self.url.replace_query(&query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::storage::MemoryUrlStore;

    fn mount(query: &str) -> (ViewState, Arc<MemoryUrlStore>) {
        let url = Arc::new(MemoryUrlStore::new(query));
        let state = ViewState::mount(url.clone(), 10);
        (state, url)
    }

    #[test]
    fn mount_restores_state_without_resetting_the_page() {
        let (state, url) = mount("page=3&status=active&query=bob");
        assert_eq!(state.pagination(), Pagination::new(3, 10));
        assert_eq!(state.status(), StatusFilter::Active);
        assert_eq!(state.search_text(), "bob");
        assert_eq!(state.settled_search(), "bob");
        assert_eq!(state.latch(), SettleLatch::Settled);
        assert!(url.history().is_empty());
    }

    #[test]
    fn status_change_resets_to_the_first_page() {
        let (mut state, url) = mount("page=3&status=active");
        assert!(state.set_status(StatusFilter::Inactive));
        assert_eq!(state.pagination().page, 1);
        assert_eq!(url.read_query(), "page=1&status=inactive");
    }

    #[test]
    fn page_size_change_keeps_the_page() {
        let (mut state, url) = mount("page=3&status=active");
        assert!(state.set_page_size(25));
        assert_eq!(state.pagination(), Pagination::new(3, 25));
        assert_eq!(url.read_query(), "page=3&pageSize=25&status=active");
    }

    #[test]
    fn settled_search_resets_but_raw_text_is_not_written() {
        let (mut state, url) = mount("page=4");
        state.set_search_text("gra");
        assert_eq!(state.params().query, "");
        assert!(url.history().is_empty());

        assert!(state.settle_search("grace"));
        assert_eq!(state.pagination().page, 1);
        assert_eq!(url.read_query(), "page=1&query=grace");
    }

    #[test]
    fn resettling_the_same_search_is_a_no_op() {
        let (mut state, url) = mount("page=2&query=bob");
        assert!(!state.settle_search("bob"));
        assert_eq!(state.pagination().page, 2);
        assert!(url.history().is_empty());
    }

    #[test]
    fn malformed_values_fall_back_and_are_normalized() {
        let (state, url) = mount("?page=0&pageSize=abc&status=banned&query=");
        assert_eq!(state.params(), QueryParams::default());
        assert_eq!(url.read_query(), "page=1");
    }

    #[test]
    fn page_navigation_writes_page_only() {
        let (mut state, url) = mount("");
        assert!(state.set_page(2));
        assert!(!state.set_page(2));
        assert_eq!(url.history(), vec!["page=1".to_string(), "page=2".to_string()]);
    }

    #[test]
    fn url_round_trips_the_driving_params() {
        let (mut state, url) = mount("");
        state.set_status(StatusFilter::Active);
        state.settle_search("a b&c");
        state.set_page(2);

        let restored = ViewState::mount(
            Arc::new(MemoryUrlStore::new(url.read_query())),
            10,
        );
        assert_eq!(restored.params(), state.params());
    }
}
