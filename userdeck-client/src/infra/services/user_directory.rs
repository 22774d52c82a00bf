use async_trait::async_trait;
use std::sync::Arc;
use userdeck_model::prelude::{
    ApiResponse, QueryParams, StatusAck, UpdateStatusRequest, UserID,
    UserStatus, UsersPage,
};

use crate::infra::{
    api_client::ApiClient,
    constants::routes::{users, utils},
    errors::SyncError,
};

/// Remote source of truth for user accounts
#[async_trait]
pub trait UserDirectoryService: Send + Sync {
    /// Fetch one page of users matching `params`
    async fn list_users(
        &self,
        params: &QueryParams,
    ) -> Result<UsersPage, SyncError>;

    /// Set a user's account status
    async fn update_status(
        &self,
        user_id: &UserID,
        status: UserStatus,
    ) -> Result<StatusAck, SyncError>;
}

#[derive(Clone, Debug)]
pub struct UserDirectoryApiAdapter {
    client: Arc<ApiClient>,
}

impl UserDirectoryApiAdapter {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectoryService for UserDirectoryApiAdapter {
    async fn list_users(
        &self,
        params: &QueryParams,
    ) -> Result<UsersPage, SyncError> {
        // Server wraps the page as { data: { users, totalCount } }
        let response: ApiResponse<UsersPage> =
            self.client.get(users::COLLECTION, &params.api_pairs()).await?;
        Ok(response.data)
    }

    async fn update_status(
        &self,
        user_id: &UserID,
        status: UserStatus,
    ) -> Result<StatusAck, SyncError> {
        let path = utils::replace_param(users::ITEM, "{id}", user_id.as_str());
        self.client
            .patch(&path, &UpdateStatusRequest { status })
            .await
    }
}
