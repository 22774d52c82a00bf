//! Userdeck client library
//!
//! Synchronization core of the users admin console: view state mirrored
//! into the URL, a de-duplicating page cache with optimistic status updates,
//! persisted grid preferences and connectivity tracking. The `userdeck`
//! binary in `src/main.rs` drives it headlessly.
//!
//! Notes
//! - Rendering ends at [`domains::users::DashboardView`]; there is no
//!   widget toolkit in this crate.
//! - Public items are subject to change while the client stabilizes.

pub mod app;
pub mod common;
pub mod domains;
pub mod infra;
