//! Snapshot of the types surface used by the console client.
//! Prefer importing from this module instead of individual tree nodes when
//! working in userdeck-client or other presentation layers.

pub use super::error::{ModelError, Result as ModelResult};
pub use super::ids::{GroupID, RoleID, UserID};
pub use super::page::{ApiResponse, UsersPage};
pub use super::preferences::{Density, SortSpec, ViewPreferences};
pub use super::query::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Pagination, QueryParams, StatusFilter,
};
pub use super::user::{
    Group, Role, StatusAck, UpdateStatusRequest, User, UserStatus,
};
