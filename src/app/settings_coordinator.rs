//! Generic settings persistence coordination.
//!
//! Provides a reusable API for persisting application settings to storage.
//! Settings are stored as JSON strings; the tiling layout is the main user.

use rzpl::LayoutSnapshot;
use serde::{Deserialize, Serialize};

const LAYOUT_KEY: &str = "tiling_layout";

/// Coordinates generic settings persistence.
///
/// This coordinator provides type-safe loading and saving of any serializable
/// settings to eframe's persistent storage. Settings are stored as JSON strings.
pub struct SettingsCoordinator;

impl SettingsCoordinator {
    /// Saves a setting to persistent storage.
    ///
    /// # Type Parameters
    /// * `T` - The type to serialize, must implement Serialize
    ///
    /// # Arguments
    /// * `storage` - The eframe storage interface (mutable)
    /// * `key` - The storage key for this setting
    /// * `value` - The value to serialize and save
    ///
    pub fn save_setting<T>(storage: &mut dyn eframe::Storage, key: &str, value: &T)
    where
        T: Serialize,
    {
        match serde_json::to_string(value) {
            Ok(json_str) => {
                storage.set_string(key, json_str);
                storage.flush();
            }
            Err(e) => log::warn!("Failed to serialize setting '{}': {}", key, e),
        }
    }

    /// Attempts to load a setting, returning None if not found or invalid.
    ///
    /// # Type Parameters
    /// * `T` - The type to deserialize, must implement Deserialize
    ///
    /// # Arguments
    /// * `storage` - The eframe storage interface
    /// * `key` - The storage key for this setting
    ///
    /// # Returns
    /// Some(value) if found and valid, None otherwise
    pub fn try_load_setting<T>(storage: Option<&dyn eframe::Storage>, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let storage = storage?;
        let json_str = storage.get_string(key)?;
        match serde_json::from_str(&json_str) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Ignoring unreadable setting '{}': {}", key, e);
                None
            }
        }
    }

    // ===== Layout =====

    /// Loads the saved tiling layout, if any.
    pub fn load_layout(storage: Option<&dyn eframe::Storage>) -> Option<LayoutSnapshot> {
        Self::try_load_setting(storage, LAYOUT_KEY)
    }

    pub fn save_layout(storage: &mut dyn eframe::Storage, layout: &LayoutSnapshot) {
        Self::save_setting(storage, LAYOUT_KEY, layout);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Simple mock storage for testing
    struct MockStorage {
        data: HashMap<String, String>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                data: HashMap::new(),
            }
        }
    }

    impl eframe::Storage for MockStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.data.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.data.insert(key.to_string(), value);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_save_and_load_layout() {
        use rzpl::panels::builtin::{register_builtin_panels, CPU_LOAD, FLAMEGRAPH};
        use rzpl::{GroupRegistry, LayoutController, PanelRegistry, VirtualTraceGenerator};

        let mut panels = PanelRegistry::new();
        register_builtin_panels(&mut panels).unwrap();
        let mut groups = GroupRegistry::new();
        groups.insert(VirtualTraceGenerator::new().generate("npu"));
        panels.refresh_availability(&groups);

        let mut layout = LayoutController::new();
        layout.add_node(&panels, &groups, FLAMEGRAPH);
        layout.add_node(&panels, &groups, CPU_LOAD);

        let mut storage = MockStorage::new();
        SettingsCoordinator::save_layout(&mut storage, &layout.snapshot());
        let loaded = SettingsCoordinator::load_layout(Some(&storage)).unwrap();
        assert_eq!(loaded, layout.snapshot());
    }

    #[test]
    fn test_corrupt_layout_is_ignored() {
        let mut storage = MockStorage::new();
        eframe::Storage::set_string(&mut storage, LAYOUT_KEY, "{not json".to_string());
        assert!(SettingsCoordinator::load_layout(Some(&storage)).is_none());
    }

    #[test]
    fn test_try_load_setting() {
        let mut storage = MockStorage::new();

        // Non-existent key
        let result: Option<i32> = SettingsCoordinator::try_load_setting(Some(&storage), "missing");
        assert_eq!(result, None);

        // Save and load
        SettingsCoordinator::save_setting(&mut storage, "test", &123i32);
        let result: Option<i32> = SettingsCoordinator::try_load_setting(Some(&storage), "test");
        assert_eq!(result, Some(123));
    }
}
