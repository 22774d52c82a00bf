//! Connectivity tracking and failure classification

use std::fmt::Display;
use std::sync::Arc;

use log::info;
use tokio::sync::watch;

/// Substrings that mark an error as "no response was reachable"
const NETWORK_ERROR_MARKERS: &[&str] = &[
    "network",
    "failed to fetch",
    "fetch failed",
    "timeout",
    "timed out",
    "abort",
    "connection",
];

/// The two connectivity transitions a platform reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// Classify a failure message. Always true while offline.
pub fn is_network_error(message: &str, online: bool) -> bool {
    if !online {
        return true;
    }
    let message = message.to_lowercase();
    NETWORK_ERROR_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    online: Arc<watch::Sender<bool>>,
}

impl NetworkMonitor {
    /// Start from the platform's synchronous connectivity flag
    pub fn new(initially_online: bool) -> Self {
        let (online, _) = watch::channel(initially_online);
        Self {
            online: Arc::new(online),
        }
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Apply a transition. Returns whether connectivity changed.
    pub fn handle(&self, event: ConnectivityEvent) -> bool {
        let online = matches!(event, ConnectivityEvent::Online);
        let changed = self.online.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(
                "[Network] Connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }

    pub fn is_network_error(&self, err: &impl Display) -> bool {
        is_network_error(&err.to_string(), self.is_online())
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::errors::SyncError;

    #[test]
    fn offline_classifies_every_error_as_network() {
        assert!(is_network_error("validation failed: email taken", false));
        assert!(is_network_error("", false));
    }

    #[test]
    fn markers_match_case_insensitively() {
        assert!(is_network_error("TypeError: Failed to fetch", true));
        assert!(is_network_error("operation timed out", true));
        assert!(is_network_error("The user aborted a request.", true));
        assert!(is_network_error("Connection refused", true));
        assert!(!is_network_error("Request failed with status 500", true));
    }

    #[test]
    fn monitor_applies_transitions_and_flag() {
        let monitor = NetworkMonitor::new(true);
        let mut rx = monitor.subscribe();
        let server = SyncError::server(Some(500), "boom");

        assert!(!monitor.is_network_error(&server));
        assert!(!monitor.handle(ConnectivityEvent::Online));
        assert!(monitor.handle(ConnectivityEvent::Offline));
        assert!(rx.has_changed().unwrap());
        assert!(!*rx.borrow_and_update());
        assert!(monitor.is_network_error(&server));

        assert!(monitor.handle(ConnectivityEvent::Online));
        assert!(monitor.is_online());
    }
}
