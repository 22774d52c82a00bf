//! Core data model definitions shared across userdeck crates.
#![allow(missing_docs)]

pub use ::chrono;

pub mod error;
pub mod ids;
pub mod page;
pub mod prelude;
pub mod preferences;
pub mod query;
pub mod user;

// Intentionally curated re-exports for downstream consumers.
pub use error::{ModelError, Result as ModelResult};
pub use ids::{GroupID, RoleID, UserID};
pub use page::{ApiResponse, UsersPage};
pub use preferences::{Density, SortSpec, ViewPreferences};
pub use query::{Pagination, QueryParams, StatusFilter};
pub use user::{Group, Role, StatusAck, UpdateStatusRequest, User, UserStatus};
