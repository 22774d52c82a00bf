//! External stores the client reads and writes: the location query string
//! and a string key/value store. Both are injected so tests can substitute
//! in-memory fakes.

pub mod kv;
pub mod location;

pub use kv::{DisabledStore, JsonFileStore, KeyValueStore, MemoryKeyValueStore};
pub use location::{MemoryUrlStore, UrlStore};
