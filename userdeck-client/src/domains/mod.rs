//! Domain modules for the users console
//!
//! `users` owns the dashboard state machine; `network` and `preferences`
//! are the shared collaborators it is mounted with.

pub mod network;
pub mod preferences;
pub mod users;
