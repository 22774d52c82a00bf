//! Common module containing shared utilities and types
//!
//! This module provides common functionality used across multiple domains

pub mod boundary;
pub mod debounce;
pub mod task;

// Re-export commonly used items
pub use boundary::{RenderFault, guard};
pub use debounce::{DebounceTimer, Debouncer, Push};
pub use task::Task;
