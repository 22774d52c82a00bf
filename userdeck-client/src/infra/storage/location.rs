use parking_lot::Mutex;

/// The query-string half of the current location.
pub trait UrlStore: Send + Sync {
    /// Current query string, without the leading `?`
    fn read_query(&self) -> String;

    /// Replace the current query string in place (no new history entry)
    fn replace_query(&self, query: &str);
}

/// In-memory location that records every replacement.
#[derive(Debug, Default)]
pub struct MemoryUrlStore {
    current: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryUrlStore {
    pub fn new(initial: impl Into<String>) -> Self {
        let initial: String = initial.into();
        let initial = initial.strip_prefix('?').unwrap_or(&initial).to_string();
        Self {
            current: Mutex::new(initial),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every query string written so far, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl UrlStore for MemoryUrlStore {
    fn read_query(&self) -> String {
        self.current.lock().clone()
    }

    fn replace_query(&self, query: &str) {
        *self.current.lock() = query.to_string();
        self.history.lock().push(query.to_string());
    }
}
