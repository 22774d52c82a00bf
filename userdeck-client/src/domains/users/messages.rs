use userdeck_model::prelude::{
    Density, QueryParams, SortSpec, StatusAck, StatusFilter, UserID,
    UserStatus, UsersPage,
};

use crate::domains::network::ConnectivityEvent;
use crate::infra::errors::SyncError;

#[derive(Clone, Debug)]
pub enum Message {
    // View state
    SearchInput(String),
    SearchSettled(u64),
    StatusFilterChanged(StatusFilter),
    PageChanged(u32),
    PageSizeChanged(u32),

    // Remote data
    UsersLoaded {
        params: QueryParams,
        result: Result<UsersPage, SyncError>,
    },
    CacheChanged,
    ToggleStatus(UserID),
    StatusUpdated {
        user_id: UserID,
        status: UserStatus,
        result: Result<StatusAck, SyncError>,
    },
    Retry,
    Connectivity(ConnectivityEvent),

    // Grid preferences
    SetColumnVisible { column: String, visible: bool },
    SetSorting(Vec<SortSpec>),
    SetDensity(Density),
    ResetPreferences,

    DismissNotification(u64),
}

impl Message {
    pub fn name(&self) -> &'static str {
        match self {
            // View state
            Self::SearchInput(_) => "Users::SearchInput",
            Self::SearchSettled(_) => "Users::SearchSettled",
            Self::StatusFilterChanged(_) => "Users::StatusFilterChanged",
            Self::PageChanged(_) => "Users::PageChanged",
            Self::PageSizeChanged(_) => "Users::PageSizeChanged",

            // Remote data
            Self::UsersLoaded { .. } => "Users::UsersLoaded",
            Self::CacheChanged => "Users::CacheChanged",
            Self::ToggleStatus(_) => "Users::ToggleStatus",
            Self::StatusUpdated { .. } => "Users::StatusUpdated",
            Self::Retry => "Users::Retry",
            Self::Connectivity(_) => "Users::Connectivity",

            // Grid preferences
            Self::SetColumnVisible { .. } => "Users::SetColumnVisible",
            Self::SetSorting(_) => "Users::SetSorting",
            Self::SetDensity(_) => "Users::SetDensity",
            Self::ResetPreferences => "Users::ResetPreferences",

            Self::DismissNotification(_) => "Users::DismissNotification",
        }
    }
}
