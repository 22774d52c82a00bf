//! Test doubles and fixtures for exercising the client without a backend

pub mod fixtures;
pub mod stubs;

pub use stubs::TestUserDirectory;
