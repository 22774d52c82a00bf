pub mod routes;

/// Defaults shared by the config loader and the view-state controller
pub mod defaults {
    pub const PAGE_SIZE: u32 = userdeck_model::query::DEFAULT_PAGE_SIZE;
    pub const SEARCH_DEBOUNCE_MS: u64 = 300;
    pub const STALE_AFTER_SECS: u64 = 30;
    /// A zero window would refetch on every revision
    pub const MIN_STALE_AFTER_SECS: u64 = 1;
    pub const EVICT_AFTER_SECS: u64 = 300;
    pub const VIEW_ID: &str = "users";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}
