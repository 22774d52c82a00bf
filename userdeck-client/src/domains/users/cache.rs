//! Fetch-by-params cache for user pages
//!
//! Entries are keyed by the full [`QueryParams`] tuple. Identical fetches
//! share one in-flight request; a response is only written back if its
//! request is still the registered one for that key, so cancelled requests
//! never touch the cache.
//!
//! Status mutations are optimistic: the cached rows are rewritten before the
//! request is issued and restored if it fails. While a mutation is pending
//! its write is re-applied to every page the cache stores, so a refresh
//! that raced the update cannot bring back the old status.
//!
//! Entries nobody has read for [`CacheTiming::evict_after`] are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use userdeck_model::prelude::{
    QueryParams, StatusAck, UserID, UserStatus, UsersPage,
};

use crate::domains::network::NetworkMonitor;
use crate::infra::constants::defaults;
use crate::infra::errors::SyncError;
use crate::infra::services::UserDirectoryService;

type SharedFetch = Shared<BoxFuture<'static, Result<UsersPage, SyncError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTiming {
    /// Entries older than this are served, then refreshed in the background
    pub stale_after: Duration,
    /// Entries not read for this long are dropped
    pub evict_after: Duration,
}

impl Default for CacheTiming {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(defaults::STALE_AFTER_SECS),
            evict_after: Duration::from_secs(defaults::EVICT_AFTER_SECS),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    page: UsersPage,
    fetched_at: Instant,
    read_at: Instant,
    stale: bool,
}

impl CacheEntry {
    fn fresh(page: UsersPage) -> Self {
        let now = Instant::now();
        Self {
            page,
            fetched_at: now,
            read_at: now,
            stale: false,
        }
    }
}

/// Optimistic status write awaiting the server.
struct PendingWrite {
    id: u64,
    user_id: UserID,
    status: UserStatus,
}

struct InFlight {
    id: u64,
    token: CancellationToken,
    future: SharedFetch,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryParams, CacheEntry>,
    in_flight: HashMap<QueryParams, InFlight>,
    next_request: u64,
    pending_writes: Vec<PendingWrite>,
    next_write: u64,
}

impl CacheInner {
    fn overlay_pending(&self, page: &mut UsersPage) {
        for write in &self.pending_writes {
            page.set_status(&write.user_id, write.status);
        }
    }
}

pub struct UserCache {
    service: Arc<dyn UserDirectoryService>,
    network: NetworkMonitor,
    timing: CacheTiming,
    inner: Mutex<CacheInner>,
    revision: watch::Sender<u64>,
}

impl std::fmt::Debug for UserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("UserCache")
            .field("entries", &inner.entries.len())
            .field("in_flight", &inner.in_flight.len())
            .field("pending_writes", &inner.pending_writes.len())
            .field("timing", &self.timing)
            .field("revision", &*self.revision.borrow())
            .finish()
    }
}

impl UserCache {
    pub fn new(
        service: Arc<dyn UserDirectoryService>,
        network: NetworkMonitor,
        timing: CacheTiming,
    ) -> Arc<Self> {
        let (revision, _) = watch::channel(0);
        Arc::new(Self {
            service,
            network,
            timing,
            inner: Mutex::new(CacheInner::default()),
            revision,
        })
    }

    /// Read a page.
    ///
    /// The cache decision is made when this is called, not when the returned
    /// future is first polled. Fresh entries resolve without a request; stale
    /// ones resolve to the cached page while a refresh runs in the
    /// background; misses join (or start) the in-flight request for `params`.
    pub fn fetch(
        self: &Arc<Self>,
        params: QueryParams,
    ) -> BoxFuture<'static, Result<UsersPage, SyncError>> {
        let (outcome, spawn) = {
            let mut inner = self.inner.lock();
            self.evict_unread(&mut inner);
            let stale_after = self.timing.stale_after;
            match inner.entries.get_mut(&params) {
                Some(entry) if !entry.is_stale(stale_after) => {
                    entry.read_at = Instant::now();
                    let page = entry.page.clone();
                    return async move { Ok(page) }.boxed();
                }
                Some(entry) => {
                    entry.read_at = Instant::now();
                    let page = entry.page.clone();
                    debug!(
                        "[UserCache] Serving stale page {} for '{}', refreshing",
                        params.page, params.query
                    );
                    let (_, spawn) = self.start_request(&mut inner, &params);
                    (Err(page), spawn)
                }
                None => {
                    let (future, spawn) =
                        self.start_request(&mut inner, &params);
                    (Ok(future), spawn)
                }
            }
        };

        if let Some(driver) = spawn {
            tokio::spawn(driver);
        }

        match outcome {
            Ok(future) => future.boxed(),
            Err(stale_page) => async move { Ok(stale_page) }.boxed(),
        }
    }

    /// Cached page for `params`, fresh or stale, without fetching. Counts as
    /// a read for eviction.
    pub fn peek(&self, params: &QueryParams) -> Option<UsersPage> {
        self.inner.lock().entries.get_mut(params).map(|entry| {
            entry.read_at = Instant::now();
            entry.page.clone()
        })
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn is_fetching(&self, params: &QueryParams) -> bool {
        self.inner.lock().in_flight.contains_key(params)
    }

    /// Mark every entry stale. Entries stay readable and are refreshed on
    /// their next read.
    pub fn invalidate(&self) {
        let mut marked = 0;
        for entry in self.inner.lock().entries.values_mut() {
            if !entry.stale {
                entry.stale = true;
                marked += 1;
            }
        }
        debug!("[UserCache] Invalidated {} entries", marked);
        self.bump_revision();
    }

    /// Cancel every in-flight request. Their awaiters resolve to
    /// [`SyncError::Cancelled`] and their responses are discarded.
    pub fn cancel_in_flight(&self) {
        let cancelled: Vec<InFlight> = {
            let mut inner = self.inner.lock();
            inner.in_flight.drain().map(|(_, in_flight)| in_flight).collect()
        };
        if !cancelled.is_empty() {
            debug!(
                "[UserCache] Cancelling {} in-flight request(s)",
                cancelled.len()
            );
        }
        for in_flight in cancelled {
            in_flight.token.cancel();
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Optimistically set `user_id` to `status` across every cached page.
    ///
    /// In-flight fetches are cancelled and the optimistic rewrite is applied
    /// before this returns. The returned future issues the update; on
    /// success every entry is invalidated, on failure the user's rows are
    /// put back as they were here before invalidating.
    pub fn mutate_status(
        self: &Arc<Self>,
        user_id: UserID,
        status: UserStatus,
    ) -> BoxFuture<'static, Result<StatusAck, SyncError>> {
        self.cancel_in_flight();

        let (write_id, snapshot) = {
            let mut inner = self.inner.lock();
            let mut snapshot = Vec::new();
            for (params, entry) in inner.entries.iter_mut() {
                let Some(before) = entry.page.find(&user_id).map(|u| u.status)
                else {
                    continue;
                };
                if entry.page.set_status(&user_id, status) {
                    snapshot.push((params.clone(), before));
                }
            }
            inner.next_write += 1;
            let write_id = inner.next_write;
            inner.pending_writes.push(PendingWrite {
                id: write_id,
                user_id: user_id.clone(),
                status,
            });
            (write_id, snapshot)
        };
        let rewritten = snapshot.len();
        debug!(
            "[UserCache] Optimistically set {} to {} in {} page(s)",
            user_id, status, rewritten
        );
        if rewritten > 0 {
            self.bump_revision();
        }

        let cache = Arc::downgrade(self);
        let service = Arc::clone(&self.service);
        let network = self.network.clone();
        async move {
            let result = service.update_status(&user_id, status).await;
            let Some(cache) = cache.upgrade() else {
                return result.map_err(|err| {
                    let network = network.is_network_error(&err);
                    err.into_mutation_failure(network)
                });
            };

            let result = match result {
                Ok(ack) => {
                    info!("[UserCache] Status update confirmed: {}", ack.message);
                    cache.settle_write(write_id, &user_id, None);
                    Ok(ack)
                }
                Err(err) => {
                    let network = network.is_network_error(&err);
                    warn!(
                        "[UserCache] Status update for {} failed, rolling back: {}",
                        user_id, err
                    );
                    cache.settle_write(write_id, &user_id, Some(snapshot));
                    Err(err.into_mutation_failure(network))
                }
            };
            // Requests issued while the write was pending carry no overlay
            // once it is gone.
            cache.cancel_in_flight();
            cache.invalidate();
            result
        }
        .boxed()
    }

    /// Drop entries not read within the eviction window. Keys with a
    /// request in flight are kept.
    fn evict_unread(&self, inner: &mut CacheInner) {
        let evict_after = self.timing.evict_after;
        let CacheInner {
            entries, in_flight, ..
        } = inner;
        let before = entries.len();
        entries.retain(|params, entry| {
            in_flight.contains_key(params) || entry.read_at.elapsed() < evict_after
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("[UserCache] Evicted {} unread entries", evicted);
        }
    }

    /// Join the in-flight request for `params` or register a new one. A new
    /// request is returned alongside a driver the caller must spawn once
    /// the lock is released.
    fn start_request(
        self: &Arc<Self>,
        inner: &mut CacheInner,
        params: &QueryParams,
    ) -> (SharedFetch, Option<SharedFetch>) {
        if let Some(in_flight) = inner.in_flight.get(params) {
            debug!(
                "[UserCache] Joining in-flight request #{} for page {}",
                in_flight.id, params.page
            );
            return (in_flight.future.clone(), None);
        }

        inner.next_request += 1;
        let id = inner.next_request;
        let token = CancellationToken::new();
        let future = request(
            Arc::downgrade(self),
            Arc::clone(&self.service),
            id,
            params.clone(),
            token.clone(),
        )
        .boxed()
        .shared();

        debug!(
            "[UserCache] Request #{} for page {} (size {}, query '{}', status {})",
            id, params.page, params.page_size, params.query, params.status
        );
        inner.in_flight.insert(
            params.clone(),
            InFlight {
                id,
                token,
                future: future.clone(),
            },
        );
        (future.clone(), Some(future))
    }

    fn complete(
        &self,
        id: u64,
        params: &QueryParams,
        result: &Result<UsersPage, SyncError>,
    ) {
        let written = {
            let mut inner = self.inner.lock();
            let current = inner
                .in_flight
                .get(params)
                .is_some_and(|in_flight| in_flight.id == id);
            if !current {
                debug!("[UserCache] Discarding response of request #{}", id);
                return;
            }
            inner.in_flight.remove(params);

            match result {
                Ok(page) => {
                    let mut page = page.clone();
                    inner.overlay_pending(&mut page);
                    inner.entries.insert(params.clone(), CacheEntry::fresh(page));
                    true
                }
                Err(err) => {
                    warn!("[UserCache] Request #{} failed: {}", id, err);
                    false
                }
            }
        };

        if written {
            self.bump_revision();
        }
    }

    /// Retire pending write `id`, putting the user's previous status back
    /// into the pages recorded in `rollback`. Rows of other users are left
    /// alone so concurrent writes survive.
    fn settle_write(
        &self,
        id: u64,
        user_id: &UserID,
        rollback: Option<Vec<(QueryParams, UserStatus)>>,
    ) {
        let mut inner = self.inner.lock();
        inner.pending_writes.retain(|write| write.id != id);
        for (params, before) in rollback.into_iter().flatten() {
            if let Some(entry) = inner.entries.get_mut(&params) {
                entry.page.set_status(user_id, before);
            }
        }
    }

    fn bump_revision(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

impl CacheEntry {
    fn is_stale(&self, stale_after: Duration) -> bool {
        self.stale || self.fetched_at.elapsed() >= stale_after
    }
}

async fn request(
    cache: Weak<UserCache>,
    service: Arc<dyn UserDirectoryService>,
    id: u64,
    params: QueryParams,
    token: CancellationToken,
) -> Result<UsersPage, SyncError> {
    let result = tokio::select! {
        biased;
        _ = token.cancelled() => Err(SyncError::Cancelled),
        result = service.list_users(&params) => result,
    };
    if let Some(cache) = cache.upgrade() {
        cache.complete(id, &params, &result);
    }
    result
}
