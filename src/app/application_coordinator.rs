//! Application-level coordination and workflow management.
//!
//! Handles high-level application operations like trace loading, panel
//! spawning and closing, error handling, and coordinating between the
//! registries, the layout and the synchronization bus.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rzpl::panels::builtin::FLAMEGRAPH;
use rzpl::trace::io::write_groups;
use rzpl::trace::normalize_op_name;
use rzpl::{DropTarget, FrameRef, InstanceId, SelectedNode, TraceGroup, VirtualTraceGenerator};

use crate::app::AppState;
use crate::io::{AsyncLoader, LoadResult};

/// Coordinates application-level operations and workflows.
///
/// This struct is responsible for:
/// - Managing trace loading workflows
/// - Applying loaded groups to the registries
/// - Spawning, moving and closing panel instances
/// - Managing error states
pub struct ApplicationCoordinator;

impl ApplicationCoordinator {
    // ===== Loading =====

    /// Initiates asynchronous loading of trace group files.
    pub fn open_files(state: &mut AppState, loader: &mut AsyncLoader, paths: Vec<PathBuf>, ctx: &egui::Context) {
        if paths.is_empty() {
            return;
        }
        state.error_message = None;
        loader.start_load(paths, ctx);
    }

    /// Checks for loading completion and applies results to application state.
    ///
    /// Called once per frame in the update loop.
    /// Returns true if a load operation completed (success or error).
    pub fn check_loading_completion(state: &mut AppState, loader: &mut AsyncLoader) -> bool {
        match loader.check_completion() {
            LoadResult::Success { groups, paths } => {
                log::info!("Loaded {} group(s) from {} file(s)", groups.len(), paths.len());
                Self::apply_groups(state, groups);
                true
            }
            LoadResult::Error(error_msg) => {
                log::error!("Error loading trace: {}", error_msg);
                state.error_message = Some(format!("Error loading trace: {}", error_msg));
                state.bus.error_flag.set(true);
                true
            }
            LoadResult::None => false,
        }
    }

    /// Generates a synthetic group and adds it next to the loaded ones.
    pub fn open_virtual_trace(state: &mut AppState) {
        let index = state.groups.len() as u64;
        let name = format!("virtual-{}", index + 1);
        let group = VirtualTraceGenerator::with_config(8, 42 + index).generate(&name);
        Self::apply_groups(state, vec![group]);
    }

    /// Inserts groups, refreshes everything that depends on them and opens the
    /// flamegraph when the layout does not show one yet.
    pub fn apply_groups(state: &mut AppState, groups: Vec<TraceGroup>) {
        for group in groups {
            state.groups.insert(group);
        }
        state.error_message = None;
        state.bus.error_flag.set(false);
        state.groups_changed();

        if state.layout.count_of(FLAMEGRAPH) == 0 {
            state.layout.add_node(&state.panels, &state.groups, FLAMEGRAPH);
        }
    }

    /// Makes the group at `index` the active profile.
    pub fn set_active_group(state: &mut AppState, index: usize) {
        if !state.groups.set_active(index) {
            log::debug!("No group at index {}", index);
            return;
        }
        state.bus.hovered_frame.set(None);
        state.bus.active_profile.set(Some(index));
    }

    /// Writes every loaded group to `path`.
    pub fn save_groups(state: &AppState, path: &Path) -> anyhow::Result<()> {
        if state.groups.is_empty() {
            anyhow::bail!("No trace groups loaded");
        }
        let groups: Vec<&TraceGroup> = state.groups.iter().collect();
        write_groups(path, &groups).with_context(|| format!("Failed to save {}", path.display()))
    }

    // ===== Panels =====

    /// Spawns a panel at `target`, or in the focused tabset without one.
    pub fn spawn_panel(state: &mut AppState, title: &str, target: Option<DropTarget>) -> Option<InstanceId> {
        let target = target.unwrap_or_else(|| state.layout.default_target());
        state.layout.add_node_at(&state.panels, &state.groups, title, target)
    }

    /// Closes a panel instance unless its descriptor forbids it.
    pub fn close_panel(state: &mut AppState, id: InstanceId) -> bool {
        let closable = state
            .layout
            .instance(id)
            .and_then(|instance| state.panels.get(instance.title()))
            .is_some_and(|descriptor| descriptor.is_closable());
        if !closable {
            log::debug!("Panel instance {} cannot be closed", id);
            return false;
        }
        state.layout.remove_node(&state.panels, id)
    }

    pub fn move_panel(state: &mut AppState, id: InstanceId, target: DropTarget) -> bool {
        state.layout.move_node(id, target)
    }

    // ===== Selection =====

    /// Selects a flamegraph frame and publishes it to linked plots.
    pub fn select_frame(state: &mut AppState, node: SelectedNode) {
        let frame = FrameRef::new(normalize_op_name(&node.frame.name));
        state.bus.selected_frame.set(Some(frame));
        state.selected_node = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rzpl::panels::builtin::{CPU_LOAD, OPERATOR_TYPE_EXECUTION};
    use rzpl::trace::FrameSpan;

    fn loaded_state() -> AppState {
        let mut state = AppState::with_theme("Dark").unwrap();
        ApplicationCoordinator::open_virtual_trace(&mut state);
        state
    }

    #[test]
    fn test_first_group_opens_flamegraph() {
        let state = loaded_state();
        assert_eq!(state.groups.len(), 1);
        assert_eq!(state.layout.count_of(FLAMEGRAPH), 1);
        assert_eq!(state.panels.instances(FLAMEGRAPH), 1);
    }

    #[test]
    fn test_second_virtual_group_keeps_single_flamegraph() {
        let mut state = loaded_state();
        ApplicationCoordinator::open_virtual_trace(&mut state);
        assert_eq!(state.groups.len(), 2);
        assert_eq!(state.layout.count_of(FLAMEGRAPH), 1);
    }

    #[test]
    fn test_flamegraph_cannot_be_closed() {
        let mut state = loaded_state();
        let id = state.layout.instances().next().map(|i| i.id()).unwrap();
        assert!(!ApplicationCoordinator::close_panel(&mut state, id));
        assert_eq!(state.layout.instance_count(), 1);
    }

    #[test]
    fn test_spawn_respects_cap_and_close_frees_slot() {
        let mut state = loaded_state();
        let first = ApplicationCoordinator::spawn_panel(&mut state, OPERATOR_TYPE_EXECUTION, None);
        assert!(first.is_some());
        assert!(ApplicationCoordinator::spawn_panel(&mut state, OPERATOR_TYPE_EXECUTION, None).is_none());

        assert!(ApplicationCoordinator::close_panel(&mut state, first.unwrap()));
        assert_eq!(state.panels.instances(OPERATOR_TYPE_EXECUTION), 0);
        assert!(ApplicationCoordinator::spawn_panel(&mut state, OPERATOR_TYPE_EXECUTION, None).is_some());
    }

    #[test]
    fn test_set_active_group_publishes_profile() {
        let mut state = loaded_state();
        ApplicationCoordinator::open_virtual_trace(&mut state);
        ApplicationCoordinator::set_active_group(&mut state, 1);
        assert_eq!(state.groups.active_index(), Some(1));
        assert_eq!(state.bus.active_profile.get(), Some(1));

        ApplicationCoordinator::set_active_group(&mut state, 7);
        assert_eq!(state.bus.active_profile.get(), Some(1));
    }

    #[test]
    fn test_select_frame_publishes_normalized_name() {
        let mut state = loaded_state();
        let node = SelectedNode {
            group: "virtual-1".to_string(),
            frame: FrameSpan {
                name: "MODEL::conv_2d_0".to_string(),
                start: 0.0,
                end: 1.0,
                depth: 1,
                op_type: Some("CONV_2D".to_string()),
                args: Default::default(),
            },
        };
        ApplicationCoordinator::select_frame(&mut state, node);
        assert_eq!(state.bus.selected_frame.get(), Some(FrameRef::new("conv_2d_0")));
        assert!(state.selected_node.is_some());
    }

    #[test]
    fn test_save_without_groups_fails() {
        let state = AppState::with_theme("Dark").unwrap();
        let path = std::env::temp_dir().join("zpl-empty-save.json");
        assert!(ApplicationCoordinator::save_groups(&state, &path).is_err());
    }

    #[test]
    fn test_spawned_cpu_panel_binds_active_group() {
        let mut state = loaded_state();
        let id = ApplicationCoordinator::spawn_panel(&mut state, CPU_LOAD, None).unwrap();
        let instance = state.layout.instance(id).unwrap();
        assert_eq!(instance.selected_groups(), ["virtual-1".to_string()]);
    }
}
