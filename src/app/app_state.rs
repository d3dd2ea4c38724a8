//! Centralized application state for the trace viewer.
//!
//! The state is composed of the library's registries plus focused UI state
//! components. Registries and the synchronization bus are created once here and
//! passed by reference to everything that needs them.

use rzpl::panels::builtin::register_builtin_panels;
use rzpl::{GroupRegistry, LayoutController, PanelRegistry, RegistryError, SelectedNode, SyncBus};

use crate::state::{DragState, ThemeState};

/// Main application state composed of focused state components.
pub struct AppState {
    // ===== Shared Registries =====
    /// Loaded trace groups and the active group
    pub groups: GroupRegistry,

    /// Panel descriptors with their availability and instance counters
    pub panels: PanelRegistry,

    /// Tiling layout and live panel instances
    pub layout: LayoutController,

    /// Cross-panel hover, selection and timestamp channels
    pub bus: SyncBus,

    // ===== Focused State Components =====
    /// Theme and styling state
    pub theme: ThemeState,

    /// Synthetic drag session and drop container
    pub drag: DragState,

    // ===== Top-Level State =====
    /// Frame picked in the flamegraph, shown by the details panel
    pub selected_node: Option<SelectedNode>,

    /// Current error message to display (if any)
    pub error_message: Option<String>,
}

impl AppState {
    /// Creates the application state with the built-in panels registered and
    /// a specific theme loaded from storage.
    pub fn with_theme(theme_name: &str) -> Result<Self, RegistryError> {
        let mut panels = PanelRegistry::new();
        register_builtin_panels(&mut panels)?;
        Ok(Self {
            groups: GroupRegistry::new(),
            panels,
            layout: LayoutController::new(),
            bus: SyncBus::new(),
            theme: ThemeState::with_theme(theme_name),
            drag: DragState::new(),
            selected_node: None,
            error_message: None,
        })
    }

    // ===== High-Level Coordination Methods =====

    /// Propagates a change of the loaded groups to panels and the bus.
    ///
    /// Availability flags are recomputed, instances whose groups disappeared are
    /// re-bound, and the bus publishes the active profile.
    pub fn groups_changed(&mut self) {
        self.panels.refresh_availability(&self.groups);
        self.layout.reconcile_groups(&self.panels, &self.groups);
        self.bus.active_profile.set(self.groups.active_index());

        let node_gone = self
            .selected_node
            .as_ref()
            .is_some_and(|node| self.groups.get(&node.group).is_none());
        if node_gone {
            self.selected_node = None;
            self.bus.selected_frame.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rzpl::panels::builtin::{CPU_LOAD, FLAMEGRAPH};
    use rzpl::{ButtonState, VirtualTraceGenerator};

    #[test]
    fn test_new_registers_builtin_panels() {
        let state = AppState::with_theme("Dark").unwrap();
        assert!(state.panels.get(FLAMEGRAPH).is_some());
        assert_eq!(state.panels.button_state(CPU_LOAD), ButtonState::Hidden);
    }

    #[test]
    fn test_groups_changed_enables_panels_and_publishes_profile() {
        let mut state = AppState::with_theme("Dark").unwrap();
        state.groups.insert(VirtualTraceGenerator::new().generate("npu"));
        state.groups_changed();

        assert_eq!(state.panels.button_state(CPU_LOAD), ButtonState::Enabled);
        assert_eq!(state.bus.active_profile.get(), Some(0));
    }

    #[test]
    fn test_unknown_theme_falls_back_to_dark() {
        let state = AppState::with_theme("Sepia").unwrap();
        assert_eq!(state.theme.current_theme_name(), "Dark");
    }
}
