//! Infrastructure: HTTP access, external stores, configuration and test
//! doubles. Domains depend on the traits here, never on concrete clients.

pub mod api_client;
pub mod config;
pub mod constants;
pub mod errors;
pub mod services;
pub mod storage;
pub mod testing;

pub use errors::{StorageError, SyncError};
