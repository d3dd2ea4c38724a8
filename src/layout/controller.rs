//! Tiling layout controller.
//!
//! Owns the layout tree and the live panel instances. It is the only place
//! where instances are created or destroyed, and it keeps the registry's
//! instance counters in step with both.

use std::collections::BTreeMap;

use egui::Vec2;
use serde::{Deserialize, Serialize};

use crate::layout::{DropTarget, DropZone, LayoutTree, NodeId, SplitAxis};
use crate::panels::{GroupSelection, InstanceId, PanelInstance, PanelRegistry};
use crate::trace::GroupRegistry;

/// How an instance currently sits in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Sole tab of its tabset.
    Docked,
    /// Shares its tabset with other instances.
    Tabbed,
    /// Being dragged; drawn as a floating preview until drop or cancel.
    FloatingPreview,
}

/// What an in-progress drag would place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewSource {
    /// A new instance of the titled panel.
    Spawn(String),
    /// An existing instance being moved.
    Existing(InstanceId),
}

/// Transient drop preview of a drag session. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPreview {
    pub source: PreviewSource,
    pub target: Option<DropTarget>,
}

/// Persisted form of a panel instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub id: InstanceId,
    pub title: String,
    pub selection: GroupSelection,
}

/// Persisted layout: the tree plus the instances it references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub tree: LayoutTree,
    pub panels: Vec<PanelSnapshot>,
}

#[derive(Debug, Default)]
pub struct LayoutController {
    tree: LayoutTree,
    instances: BTreeMap<InstanceId, PanelInstance>,
    next_instance: InstanceId,
    focused: Option<NodeId>,
    preview: Option<DragPreview>,
}

impl LayoutController {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Queries =====

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    pub fn instance(&self, id: InstanceId) -> Option<&PanelInstance> {
        self.instances.get(&id)
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Option<&mut PanelInstance> {
        self.instances.get_mut(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &PanelInstance> {
        self.instances.values()
    }

    pub fn instances_mut(&mut self) -> impl Iterator<Item = &mut PanelInstance> {
        self.instances.values_mut()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Live instances of the titled panel.
    pub fn count_of(&self, title: &str) -> usize {
        self.instances.values().filter(|i| i.title() == title).count()
    }

    pub fn placement(&self, id: InstanceId) -> Option<Placement> {
        if !self.instances.contains_key(&id) {
            return None;
        }
        if matches!(&self.preview, Some(DragPreview { source: PreviewSource::Existing(dragged), .. }) if *dragged == id)
        {
            return Some(Placement::FloatingPreview);
        }
        let tabset = self.tree.tabset_of(id)?;
        Some(if self.tree.tabs(tabset).len() == 1 {
            Placement::Docked
        } else {
            Placement::Tabbed
        })
    }

    pub fn focused_tabset(&self) -> Option<NodeId> {
        self.focused.filter(|node| self.tree.tabsets().contains(node))
    }

    pub fn focus(&mut self, tabset: NodeId) {
        self.focused = Some(tabset);
    }

    /// Where a panel spawned from a button click goes: the focused tabset,
    /// else the last tabset, else a new root.
    pub fn default_target(&self) -> DropTarget {
        self.focused_tabset()
            .or_else(|| self.tree.tabsets().last().copied())
            .map_or(DropTarget::Root, |node| DropTarget::Tabset {
                node,
                zone: DropZone::Center,
            })
    }

    // ===== Instance lifecycle =====

    /// Spawns the titled panel at the default target.
    pub fn add_node(&mut self, registry: &PanelRegistry, groups: &GroupRegistry, title: &str) -> Option<InstanceId> {
        let target = self.default_target();
        self.add_node_at(registry, groups, title, target)
    }

    /// Spawns the titled panel at `target`.
    ///
    /// A no-op when the panel is unknown or its instance cap is reached; the
    /// registry counter is incremented together with the insertion.
    pub fn add_node_at(
        &mut self,
        registry: &PanelRegistry,
        groups: &GroupRegistry,
        title: &str,
        target: DropTarget,
    ) -> Option<InstanceId> {
        let Some(descriptor) = registry.get(title) else {
            log::warn!("Cannot add unknown panel '{}'", title);
            return None;
        };
        if !registry.can_spawn(title) {
            log::info!(
                "Panel '{}' already has {} of {} instances",
                title,
                registry.instances(title),
                descriptor.max_instance_count()
            );
            return None;
        }

        let id = self.next_instance;
        self.next_instance += 1;
        let tabset = self.tree.insert(id, target);
        self.instances.insert(id, PanelInstance::new(id, descriptor, groups));
        registry.increment_instances(title);
        self.focused = Some(tabset);
        log::debug!("Added panel '{}' as instance {}", title, id);
        Some(id)
    }

    /// Closes an instance; the registry counter is decremented together with
    /// the removal.
    pub fn remove_node(&mut self, registry: &PanelRegistry, id: InstanceId) -> bool {
        let Some(instance) = self.instances.remove(&id) else {
            log::debug!("Instance {} is not in the layout", id);
            return false;
        };
        self.tree.remove(id);
        registry.decrement_instances(instance.title());
        if matches!(&self.preview, Some(DragPreview { source: PreviewSource::Existing(dragged), .. }) if *dragged == id)
        {
            self.preview = None;
        }
        log::debug!("Removed panel '{}' instance {}", instance.title(), id);
        true
    }

    /// Moves an instance to `target`. Dropping a tabset's only tab onto an
    /// edge of itself is a no-op.
    pub fn move_node(&mut self, id: InstanceId, target: DropTarget) -> bool {
        let Some(current) = self.tree.tabset_of(id) else {
            return false;
        };
        match target {
            DropTarget::Tabset { node, .. } if self.tree.tabs(node).is_empty() => {
                log::debug!("Move target {} is not a tabset", node);
                return false;
            }
            DropTarget::Tabset { node, zone: DropZone::Center } if node == current => {
                return self.tree.activate(id);
            }
            DropTarget::Tabset { node, .. } if node == current && self.tree.tabs(current).len() == 1 => {
                return false;
            }
            DropTarget::Root if self.tree.tabsets().len() == 1 && self.tree.tabs(current).len() == 1 => {
                return false;
            }
            _ => {}
        }
        self.tree.remove(id);
        let tabset = self.tree.insert(id, target);
        self.focused = Some(tabset);
        true
    }

    pub fn activate(&mut self, id: InstanceId) -> bool {
        let activated = self.tree.activate(id);
        if activated {
            self.focused = self.tree.tabset_of(id);
        }
        activated
    }

    /// Moves a divider by `delta`, a fraction of the split's `extent` in
    /// pixels, without shrinking either side below its panels' minimum size.
    pub fn resize(&mut self, registry: &PanelRegistry, split: NodeId, index: usize, delta: f32, extent: f32) -> bool {
        let minimums = match self.tree.divider_children(split, index) {
            Some((axis, before, after)) if extent > 0.0 => {
                let hint = |id: InstanceId| {
                    self.instances
                        .get(&id)
                        .and_then(|instance| registry.get(instance.title()))
                        .map_or(Vec2::ZERO, |descriptor| descriptor.min_size_hint())
                };
                let along = |size: Vec2| match axis {
                    SplitAxis::Horizontal => size.x / extent,
                    SplitAxis::Vertical => size.y / extent,
                };
                [along(self.tree.min_size(before, &hint)), along(self.tree.min_size(after, &hint))]
            }
            _ => [0.0, 0.0],
        };
        self.tree.resize_with_minimums(split, index, delta, minimums)
    }

    /// Re-binds every instance whose groups were unloaded.
    pub fn reconcile_groups(&mut self, registry: &PanelRegistry, groups: &GroupRegistry) {
        for instance in self.instances.values_mut() {
            if let Some(descriptor) = registry.get(instance.title()) {
                instance.reconcile(descriptor, groups);
            }
        }
    }

    /// Closes every instance.
    pub fn clear(&mut self, registry: &PanelRegistry) {
        let ids: Vec<InstanceId> = self.instances.keys().copied().collect();
        for id in ids {
            self.remove_node(registry, id);
        }
        self.tree = LayoutTree::new();
        self.focused = None;
        self.preview = None;
    }

    // ===== Drag preview =====

    pub fn preview(&self) -> Option<&DragPreview> {
        self.preview.as_ref()
    }

    pub fn begin_preview(&mut self, source: PreviewSource) {
        if self.preview.is_some() {
            log::debug!("Replacing an unfinished drag preview");
        }
        self.preview = Some(DragPreview { source, target: None });
    }

    pub fn update_preview(&mut self, target: Option<DropTarget>) {
        if let Some(preview) = &mut self.preview {
            preview.target = target;
        }
    }

    /// Turns the preview into a layout change. Without a target (pointer
    /// outside the layout) nothing changes.
    pub fn commit_preview(&mut self, registry: &PanelRegistry, groups: &GroupRegistry) -> Option<InstanceId> {
        let preview = self.preview.take()?;
        let target = preview.target?;
        match preview.source {
            PreviewSource::Spawn(title) => self.add_node_at(registry, groups, &title, target),
            PreviewSource::Existing(id) => self.move_node(id, target).then_some(id),
        }
    }

    pub fn cancel_preview(&mut self) {
        if self.preview.take().is_some() {
            log::debug!("Drag preview discarded");
        }
    }

    // ===== Persistence =====

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            tree: self.tree.clone(),
            panels: self
                .instances
                .values()
                .map(|i| PanelSnapshot {
                    id: i.id(),
                    title: i.title().to_string(),
                    selection: i.selection().clone(),
                })
                .collect(),
        }
    }

    /// Replaces the layout with `snapshot`.
    ///
    /// Panels that are unknown or over their cap are dropped from the tree;
    /// counters are incremented for every restored instance. Returns the
    /// number of restored instances.
    pub fn restore(&mut self, registry: &PanelRegistry, groups: &GroupRegistry, snapshot: LayoutSnapshot) -> usize {
        self.clear(registry);
        if !snapshot.tree.validate() {
            log::warn!("Ignoring malformed saved layout");
            return 0;
        }

        let mut panels: BTreeMap<InstanceId, PanelSnapshot> =
            snapshot.panels.into_iter().map(|p| (p.id, p)).collect();
        self.tree = snapshot.tree;

        for id in self.tree.instances() {
            let restorable = panels
                .remove(&id)
                .filter(|p| registry.get(&p.title).is_some() && registry.can_spawn(&p.title));
            match restorable {
                Some(panel) => {
                    let mut instance = PanelInstance::restore(id, panel.title, panel.selection);
                    if let Some(descriptor) = registry.get(instance.title()) {
                        instance.reconcile(descriptor, groups);
                    }
                    registry.increment_instances(instance.title());
                    self.instances.insert(id, instance);
                }
                None => {
                    log::info!("Dropping saved panel instance {}", id);
                    self.tree.remove(id);
                }
            }
        }

        self.next_instance = self.instances.keys().max().map_or(0, |max| max + 1);
        log::info!("Restored {} panels", self.instances.len());
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::{PanelDescriptor, PanelKind};
    use crate::trace::TraceGroup;

    fn setup() -> (PanelRegistry, GroupRegistry) {
        let mut registry = PanelRegistry::new();
        registry
            .register(PanelDescriptor::new("X", PanelKind::Details).max_instances(1))
            .unwrap();
        registry
            .register(PanelDescriptor::new("Y", PanelKind::Details).max_instances(3))
            .unwrap();
        let mut groups = GroupRegistry::new();
        groups.insert(TraceGroup::new("g1"));
        (registry, groups)
    }

    #[test]
    fn test_cap_blocks_second_instance() {
        let (registry, groups) = setup();
        let mut layout = LayoutController::new();
        let first = layout.add_node(&registry, &groups, "X");
        assert!(first.is_some());
        assert_eq!(layout.add_node(&registry, &groups, "X"), None);
        assert_eq!(layout.count_of("X"), 1);
        assert_eq!(registry.instances("X"), 1);

        layout.remove_node(&registry, first.unwrap());
        assert_eq!(registry.instances("X"), 0);
        assert!(layout.add_node(&registry, &groups, "X").is_some());
    }

    #[test]
    fn test_unknown_panel_is_ignored() {
        let (registry, groups) = setup();
        let mut layout = LayoutController::new();
        assert_eq!(layout.add_node(&registry, &groups, "Nope"), None);
        assert!(layout.tree().is_empty());
    }

    #[test]
    fn test_placement_follows_tabs() {
        let (registry, groups) = setup();
        let mut layout = LayoutController::new();
        let a = layout.add_node(&registry, &groups, "Y").unwrap();
        assert_eq!(layout.placement(a), Some(Placement::Docked));

        let b = layout.add_node(&registry, &groups, "Y").unwrap();
        assert_eq!(layout.placement(a), Some(Placement::Tabbed));

        layout.begin_preview(PreviewSource::Existing(b));
        assert_eq!(layout.placement(b), Some(Placement::FloatingPreview));
        layout.cancel_preview();
        assert_eq!(layout.placement(b), Some(Placement::Tabbed));
    }

    #[test]
    fn test_move_to_edge_splits_and_back_collapses() {
        let (registry, groups) = setup();
        let mut layout = LayoutController::new();
        let a = layout.add_node(&registry, &groups, "Y").unwrap();
        let b = layout.add_node(&registry, &groups, "Y").unwrap();
        let tabset = layout.tree().tabset_of(a).unwrap();

        assert!(layout.move_node(b, DropTarget::Tabset { node: tabset, zone: DropZone::Left }));
        assert_eq!(layout.tree().tabsets().len(), 2);
        assert_eq!(layout.placement(b), Some(Placement::Docked));

        let b_tabset = layout.tree().tabset_of(b).unwrap();
        assert!(!layout.move_node(b, DropTarget::Tabset { node: b_tabset, zone: DropZone::Top }));
        assert!(layout.move_node(b, DropTarget::Tabset { node: tabset, zone: DropZone::Center }));
        assert_eq!(layout.tree().tabsets(), vec![tabset]);
        assert!(layout.tree().validate());
    }

    #[test]
    fn test_commit_without_target_adds_nothing() {
        let (registry, groups) = setup();
        let mut layout = LayoutController::new();
        layout.begin_preview(PreviewSource::Spawn("Y".into()));
        assert_eq!(layout.commit_preview(&registry, &groups), None);
        assert_eq!(layout.instance_count(), 0);
        assert!(layout.preview().is_none());

        layout.begin_preview(PreviewSource::Spawn("Y".into()));
        layout.update_preview(Some(DropTarget::Root));
        assert!(layout.commit_preview(&registry, &groups).is_some());
        assert_eq!(registry.instances("Y"), 1);
    }

    #[test]
    fn test_snapshot_restore_reapplies_counters() {
        let (registry, groups) = setup();
        let mut layout = LayoutController::new();
        layout.add_node(&registry, &groups, "X");
        layout.add_node(&registry, &groups, "Y");
        let snapshot = layout.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();

        let mut restored = LayoutController::new();
        let (fresh_registry, _) = setup();
        let count = restored.restore(&fresh_registry, &groups, serde_json::from_str(&json).unwrap());
        assert_eq!(count, 2);
        assert_eq!(fresh_registry.instances("X"), 1);
        assert_eq!(restored.tree(), layout.tree());
        assert!(restored.add_node(&fresh_registry, &groups, "X").is_none());
        assert!(restored.add_node(&fresh_registry, &groups, "Y").is_some());
    }

    #[test]
    fn test_restore_drops_unknown_and_capped_panels() {
        let (registry, groups) = setup();
        let mut tree = LayoutTree::new();
        let root = tree.insert(0, DropTarget::Root);
        tree.insert(1, DropTarget::Tabset { node: root, zone: DropZone::Center });
        tree.insert(2, DropTarget::Tabset { node: root, zone: DropZone::Right });
        let panel = |id, title: &str| PanelSnapshot {
            id,
            title: title.to_string(),
            selection: GroupSelection::None,
        };
        let snapshot = LayoutSnapshot {
            tree,
            panels: vec![panel(0, "X"), panel(1, "X"), panel(2, "Gone")],
        };

        let mut layout = LayoutController::new();
        assert_eq!(layout.restore(&registry, &groups, snapshot), 1);
        assert_eq!(registry.instances("X"), 1);
        assert_eq!(layout.tree().instances(), vec![0]);
        assert!(layout.tree().validate());
    }

    #[test]
    fn test_restore_before_groups_load_keeps_bindings() {
        let (mut registry, _) = setup();
        registry
            .register(PanelDescriptor::new("Z", PanelKind::CpuLoad).multiple_plots())
            .unwrap();
        let mut tree = LayoutTree::new();
        tree.insert(0, DropTarget::Root);
        let saved = GroupSelection::Multiple(vec!["g2".into(), "g1".into()]);
        let snapshot = LayoutSnapshot {
            tree,
            panels: vec![PanelSnapshot {
                id: 0,
                title: "Z".to_string(),
                selection: saved.clone(),
            }],
        };

        let mut layout = LayoutController::new();
        assert_eq!(layout.restore(&registry, &GroupRegistry::new(), snapshot), 1);
        assert_eq!(layout.instance(0).unwrap().selection(), &saved);

        let mut groups = GroupRegistry::new();
        groups.insert(TraceGroup::new("g1"));
        groups.insert(TraceGroup::new("g2"));
        layout.reconcile_groups(&registry, &groups);
        assert_eq!(layout.instance(0).unwrap().selected_groups(), ["g2", "g1"]);
    }

    #[test]
    fn test_resize_stops_at_panel_minimum_width() {
        let mut registry = PanelRegistry::new();
        registry
            .register(PanelDescriptor::new("Wide", PanelKind::Flamegraph).min_size(300.0, 100.0))
            .unwrap();
        registry
            .register(PanelDescriptor::new("Free", PanelKind::Details))
            .unwrap();
        let groups = GroupRegistry::new();
        let mut layout = LayoutController::new();
        let wide = layout.add_node(&registry, &groups, "Wide").unwrap();
        let node = layout.tree().tabset_of(wide).unwrap();
        layout
            .add_node_at(&registry, &groups, "Free", DropTarget::Tabset { node, zone: DropZone::Right })
            .unwrap();
        let split = layout.tree().root().unwrap();
        let area = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(600.0, 400.0));

        assert!(layout.resize(&registry, split, 0, -0.8, 600.0));
        let rects = layout.tree().tabset_rects(area);
        assert!((rects[0].1.width() - 300.0).abs() < 0.01);

        assert!(layout.resize(&registry, split, 0, 0.8, 600.0));
        let rects = layout.tree().tabset_rects(area);
        assert!((rects[1].1.width() - 60.0).abs() < 0.01);
    }
}
