// Service abstractions the domains depend on

pub mod user_directory;

pub use user_directory::{UserDirectoryApiAdapter, UserDirectoryService};
