use std::collections::HashMap;

use crate::error::RegistryError;
use crate::panels::{ButtonState, PanelDescriptor};
use crate::trace::GroupRegistry;

/// Table of panel descriptors keyed by their unique title.
///
/// Instance counters live inside each descriptor as observables, so a shared
/// reference is enough to create and destroy instances.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    descriptors: Vec<PanelDescriptor>,
    by_title: HashMap<String, usize>,
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: PanelDescriptor) -> Result<(), RegistryError> {
        if self.by_title.contains_key(descriptor.title()) {
            return Err(RegistryError::DuplicateTitle(descriptor.title().to_string()));
        }
        if descriptor.max_instance_count() == 0 {
            return Err(RegistryError::ZeroInstances(descriptor.title().to_string()));
        }
        log::debug!("Registered panel '{}'", descriptor.title());
        self.by_title
            .insert(descriptor.title().to_string(), self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, title: &str) -> Option<&PanelDescriptor> {
        self.by_title.get(title).map(|&i| &self.descriptors[i])
    }

    /// Descriptors in registration order.
    pub fn list(&self) -> &[PanelDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn instances(&self, title: &str) -> usize {
        self.get(title).map_or(0, |d| d.instances().get())
    }

    pub fn can_spawn(&self, title: &str) -> bool {
        self.get(title)
            .is_some_and(|d| d.instances().get() < d.max_instance_count())
    }

    pub fn button_state(&self, title: &str) -> ButtonState {
        self.get(title)
            .map_or(ButtonState::Hidden, PanelDescriptor::button_state)
    }

    // ===== Live counters =====

    pub fn increment_instances(&self, title: &str) {
        let Some(descriptor) = self.get(title) else {
            log::error!("Cannot count instance of unknown panel '{}'", title);
            return;
        };
        let count = descriptor.instances().get() + 1;
        descriptor.instances().set(count);
    }

    /// Panics if the counter would drop below zero.
    pub fn decrement_instances(&self, title: &str) {
        let Some(descriptor) = self.get(title) else {
            log::error!("Cannot uncount instance of unknown panel '{}'", title);
            return;
        };
        let count = descriptor.instances().get();
        assert!(count > 0, "instance counter underflow for panel '{}'", title);
        descriptor.instances().set(count - 1);
    }

    // ===== Availability =====

    /// Recomputes every descriptor's availability flag from the loaded groups.
    /// Only changed flags are published.
    pub fn refresh_availability(&self, groups: &GroupRegistry) {
        for descriptor in &self.descriptors {
            let available = descriptor.compute_availability(groups);
            if descriptor.available().get() != available {
                log::debug!(
                    "Panel '{}' is now {}",
                    descriptor.title(),
                    if available { "available" } else { "unavailable" }
                );
                descriptor.available().set(available);
            }
        }
    }

    /// Drops every descriptor.
    pub fn reset(&mut self) {
        self.descriptors.clear();
        self.by_title.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::PanelKind;
    use crate::trace::TraceGroup;

    fn registry() -> PanelRegistry {
        let mut registry = PanelRegistry::new();
        registry
            .register(PanelDescriptor::new("X", PanelKind::Details))
            .unwrap();
        registry
    }

    #[test]
    fn test_duplicate_title_rejected() {
        let mut registry = registry();
        let err = registry
            .register(PanelDescriptor::new("X", PanelKind::CpuLoad))
            .unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTitle("X".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_zero_instances_rejected() {
        let mut registry = PanelRegistry::new();
        let result = registry.register(PanelDescriptor::new("Y", PanelKind::Details).max_instances(0));
        assert!(matches!(result, Err(RegistryError::ZeroInstances(_))));
    }

    #[test]
    fn test_counter_drives_button_state() {
        let registry = registry();
        let mut groups = GroupRegistry::new();
        assert_eq!(registry.button_state("X"), ButtonState::Hidden);

        groups.insert(TraceGroup::new("g1"));
        registry.refresh_availability(&groups);
        assert_eq!(registry.button_state("X"), ButtonState::Enabled);

        registry.increment_instances("X");
        assert!(!registry.can_spawn("X"));
        assert_eq!(registry.button_state("X"), ButtonState::Disabled);

        registry.decrement_instances("X");
        assert_eq!(registry.button_state("X"), ButtonState::Enabled);
        assert_eq!(registry.button_state("missing"), ButtonState::Hidden);
    }

    #[test]
    #[should_panic(expected = "underflow")]
    fn test_decrement_below_zero_panics() {
        registry().decrement_instances("X");
    }

    #[test]
    fn test_list_keeps_registration_order_and_reset_clears() {
        let mut registry = registry();
        registry
            .register(PanelDescriptor::new("A", PanelKind::CpuLoad))
            .unwrap();
        let titles: Vec<_> = registry.list().iter().map(|d| d.title()).collect();
        assert_eq!(titles, vec!["X", "A"]);

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.get("X").is_none());
    }
}
