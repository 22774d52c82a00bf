use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use userdeck_model::prelude::{
    QueryParams, StatusAck, User, UserID, UserStatus, UsersPage,
};

use crate::infra::errors::SyncError;
use crate::infra::services::user_directory::UserDirectoryService;

/// In-memory users backend with call counting, a gate for holding list
/// requests in flight and one-shot failure injection.
#[derive(Debug, Clone)]
pub struct TestUserDirectory {
    users: Arc<RwLock<Vec<User>>>,
    list_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    list_failure: Arc<Mutex<Option<SyncError>>>,
    update_failure: Arc<Mutex<Option<SyncError>>>,
    list_gate: Arc<watch::Sender<bool>>,
}

impl Default for TestUserDirectory {
    fn default() -> Self {
        Self::new(crate::infra::testing::fixtures::sample_users())
    }
}

impl TestUserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        let (gate, _) = watch::channel(true);
        Self {
            users: Arc::new(RwLock::new(users)),
            list_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            list_failure: Arc::new(Mutex::new(None)),
            update_failure: Arc::new(Mutex::new(None)),
            list_gate: Arc::new(gate),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn users(&self) -> Vec<User> {
        self.users.read().clone()
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.users.read().iter().find(|u| u.id.as_str() == id).cloned()
    }

    /// Hold every list request until [`Self::resume_lists`].
    pub fn pause_lists(&self) {
        self.list_gate.send_replace(false);
    }

    pub fn resume_lists(&self) {
        self.list_gate.send_replace(true);
    }

    pub fn fail_next_list(&self, err: SyncError) {
        *self.list_failure.lock() = Some(err);
    }

    pub fn fail_next_update(&self, err: SyncError) {
        *self.update_failure.lock() = Some(err);
    }

    /// Change a user behind the client's back.
    pub fn set_server_status(&self, id: &str, status: UserStatus) {
        if let Some(user) = self
            .users
            .write()
            .iter_mut()
            .find(|u| u.id.as_str() == id)
        {
            user.status = status;
        }
    }

    fn page_for(&self, params: &QueryParams) -> UsersPage {
        let needle = params.query.trim().to_lowercase();
        let matching: Vec<User> = self
            .users
            .read()
            .iter()
            .filter(|user| params.status.matches(user.status))
            .filter(|user| {
                needle.is_empty()
                    || user.name.to_lowercase().contains(&needle)
                    || user.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        let total_count = matching.len() as u64;
        let page_size = params.page_size.max(1) as usize;
        let start = (params.page.max(1) as usize - 1) * page_size;
        let users = matching.into_iter().skip(start).take(page_size).collect();
        UsersPage::new(users, total_count)
    }
}

#[async_trait]
impl UserDirectoryService for TestUserDirectory {
    async fn list_users(
        &self,
        params: &QueryParams,
    ) -> Result<UsersPage, SyncError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let mut gate = self.list_gate.subscribe();
        if gate.wait_for(|open| *open).await.is_err() {
            return Err(SyncError::Cancelled);
        }

        if let Some(err) = self.list_failure.lock().take() {
            return Err(err);
        }
        Ok(self.page_for(params))
    }

    async fn update_status(
        &self,
        user_id: &UserID,
        status: UserStatus,
    ) -> Result<StatusAck, SyncError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.update_failure.lock().take() {
            return Err(err);
        }

        let mut users = self.users.write();
        match users.iter_mut().find(|u| &u.id == user_id) {
            Some(user) => {
                user.status = status;
                Ok(StatusAck {
                    message: format!("User {} is now {}", user.name, status),
                })
            }
            None => Err(SyncError::server(
                Some(404),
                format!("Request failed with status 404 Not Found: no user {user_id}"),
            )),
        }
    }
}
