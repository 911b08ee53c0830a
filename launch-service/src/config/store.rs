// Settings Stores
// Read-only key lookup over live configuration sources

use std::collections::HashMap;

/// Setting keys consulted by the resolver.
pub mod keys {
    /// Administrative override for the run log level.
    pub const LOG_LEVEL: &str = "settings/log_level";
    /// Administrative override for safe-mode row checking.
    pub const SAFE_MODE: &str = "settings/safe_mode";
    /// Administrative override for engine metrics gathering.
    pub const GATHER_METRICS: &str = "settings/gather_metrics";
    /// Variable-resolution policy toggle ("Y"/"true" switches it on).
    pub const USE_STORED_VARIABLES: &str = "USE_STORED_VARIABLES";
}

/// A read-only view over a live configuration source.
///
/// Each `get` reads the backing source directly, so values edited by an
/// operator between runs are picked up without a restart. Implementations
/// must return whole values only; a lookup never observes a partial write.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Settings store backed by process environment variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvStore;

impl SettingsStore for EnvStore {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory settings store, for administrative override fixtures and tests.
#[derive(Debug, Default, Clone)]
pub struct MapStore {
    values: HashMap<String, String>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

impl SettingsStore for MapStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_store_get() {
        let store = MapStore::new().with(keys::SAFE_MODE, "true");
        assert_eq!(store.get(keys::SAFE_MODE), Some("true".to_string()));
        assert_eq!(store.get(keys::LOG_LEVEL), None);
    }

    #[test]
    fn test_map_store_empty_value_is_present() {
        let store = MapStore::new().with("custom", "");
        assert_eq!(store.get("custom"), Some(String::new()));
    }

    #[test]
    fn test_env_store_missing() {
        assert_eq!(EnvStore.get("LAUNCH_SERVICE_TEST_UNSET_KEY"), None);
    }
}
