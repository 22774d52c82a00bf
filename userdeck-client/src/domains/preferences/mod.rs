//! Per-view grid preference persistence
//!
//! The in-memory copy is authoritative. Storage is best-effort: once a
//! write fails the store keeps working from memory and logs the failure.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use parking_lot::Mutex;
use userdeck_model::prelude::ViewPreferences;

use crate::infra::storage::KeyValueStore;

pub const STORAGE_KEY_PREFIX: &str = "userdeck.grid.";

pub fn storage_key(view_id: &str) -> String {
    format!("{STORAGE_KEY_PREFIX}{view_id}")
}

pub struct PreferenceStore {
    backend: Arc<dyn KeyValueStore>,
    memory: Mutex<HashMap<String, ViewPreferences>>,
    degraded: AtomicBool,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("views", &self.memory.lock().len())
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

impl PreferenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            memory: Mutex::new(HashMap::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// True once storage has failed and the store runs from memory only
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn load(&self, view_id: &str) -> ViewPreferences {
        if let Some(prefs) = self.memory.lock().get(view_id) {
            return prefs.clone();
        }

        let prefs = match self.backend.get(&storage_key(view_id)) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(prefs) => prefs,
                Err(e) => {
                    warn!(
                        "[Preferences] Discarding unparsable preferences for '{}': {}",
                        view_id, e
                    );
                    ViewPreferences::default()
                }
            },
            Ok(None) => ViewPreferences::default(),
            Err(e) => {
                self.mark_degraded(&e);
                ViewPreferences::default()
            }
        };

        self.memory
            .lock()
            .insert(view_id.to_string(), prefs.clone());
        prefs
    }

    pub fn save(&self, view_id: &str, prefs: &ViewPreferences) {
        self.memory
            .lock()
            .insert(view_id.to_string(), prefs.clone());

        let raw = match serde_json::to_string(prefs) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[Preferences] Failed to encode preferences: {}", e);
                return;
            }
        };
        match self.backend.set(&storage_key(view_id), &raw) {
            Ok(()) => debug!("[Preferences] Saved preferences for '{}'", view_id),
            Err(e) => self.mark_degraded(&e),
        }
    }

    pub fn reset(&self, view_id: &str) -> ViewPreferences {
        let prefs = ViewPreferences::default();
        self.memory
            .lock()
            .insert(view_id.to_string(), prefs.clone());
        if let Err(e) = self.backend.remove(&storage_key(view_id)) {
            self.mark_degraded(&e);
        }
        prefs
    }

    fn mark_degraded(&self, err: &crate::infra::errors::StorageError) {
        if !self.degraded.swap(true, Ordering::Relaxed) {
            warn!(
                "[Preferences] Storage unavailable, keeping preferences in memory only: {}",
                err
            );
        }
    }
}
