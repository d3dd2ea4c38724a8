//! Tiling layout tree.
//!
//! The tree is made of splits (rows or columns of weighted children) and
//! tabsets (leaves holding one or more panel instances, one of them active).
//! It is plain data: serde round-trips it for persistence and geometry is
//! computed on demand from the area it is laid out in.

use std::collections::BTreeMap;

use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::panels::InstanceId;

pub type NodeId = u64;

/// Smallest share of a split a child can be resized down to.
pub const MIN_SPLIT_FRACTION: f32 = 0.1;

/// Width of the edge bands of a tabset, as a fraction of its size, that dock
/// a dropped panel beside it instead of into it.
const EDGE_BAND: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitAxis {
    /// Children side by side, left to right.
    Horizontal,
    /// Children stacked, top to bottom.
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayoutNode {
    Split {
        axis: SplitAxis,
        children: Vec<NodeId>,
        weights: Vec<f32>,
    },
    Tabs {
        tabs: Vec<InstanceId>,
        active: usize,
    },
}

/// Where in a tabset a drop lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl DropZone {
    /// Zone of `rect` under `pos`: the nearest edge band, else the center.
    pub fn from_point(rect: Rect, pos: Pos2) -> Self {
        let rx = (pos.x - rect.min.x) / rect.width().max(1.0);
        let ry = (pos.y - rect.min.y) / rect.height().max(1.0);
        let candidates = [
            (rx, DropZone::Left),
            (1.0 - rx, DropZone::Right),
            (ry, DropZone::Top),
            (1.0 - ry, DropZone::Bottom),
        ];
        candidates
            .into_iter()
            .filter(|(distance, _)| *distance < EDGE_BAND)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map_or(DropZone::Center, |(_, zone)| zone)
    }

    /// Part of `rect` the dropped panel would occupy.
    pub fn preview_rect(self, rect: Rect) -> Rect {
        let half_w = rect.width() / 2.0;
        let half_h = rect.height() / 2.0;
        match self {
            DropZone::Center => rect,
            DropZone::Left => Rect::from_min_size(rect.min, egui::vec2(half_w, rect.height())),
            DropZone::Right => Rect::from_min_max(egui::pos2(rect.min.x + half_w, rect.min.y), rect.max),
            DropZone::Top => Rect::from_min_size(rect.min, egui::vec2(rect.width(), half_h)),
            DropZone::Bottom => Rect::from_min_max(egui::pos2(rect.min.x, rect.min.y + half_h), rect.max),
        }
    }

    fn split(self) -> Option<(SplitAxis, bool)> {
        match self {
            DropZone::Center => None,
            DropZone::Left => Some((SplitAxis::Horizontal, false)),
            DropZone::Right => Some((SplitAxis::Horizontal, true)),
            DropZone::Top => Some((SplitAxis::Vertical, false)),
            DropZone::Bottom => Some((SplitAxis::Vertical, true)),
        }
    }
}

/// Where a new or moved panel goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// The layout as a whole: becomes the root of an empty layout, or docks
    /// to the right of everything.
    Root,
    Tabset { node: NodeId, zone: DropZone },
}

/// Draggable boundary between two children of a split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Divider {
    pub split: NodeId,
    /// Boundary between child `index` and `index + 1`.
    pub index: usize,
    pub axis: SplitAxis,
    pub rect: Rect,
    /// Length of the split along its axis; divides pointer deltas into
    /// the fractions [`LayoutTree::resize`] expects.
    pub extent: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    nodes: BTreeMap<NodeId, LayoutNode>,
    root: Option<NodeId>,
    next_node: NodeId,
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Queries =====

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn node(&self, id: NodeId) -> Option<&LayoutNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.iter().find_map(|(&parent, node)| match node {
            LayoutNode::Split { children, .. } if children.contains(&id) => Some(parent),
            _ => None,
        })
    }

    /// Tabsets in depth-first order.
    pub fn tabsets(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.walk(root, &mut |id, node| {
                if matches!(node, LayoutNode::Tabs { .. }) {
                    out.push(id);
                }
            });
        }
        out
    }

    /// Every instance in depth-first, tab order.
    pub fn instances(&self) -> Vec<InstanceId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.walk(root, &mut |_, node| {
                if let LayoutNode::Tabs { tabs, .. } = node {
                    out.extend(tabs.iter().copied());
                }
            });
        }
        out
    }

    fn walk(&self, id: NodeId, visit: &mut impl FnMut(NodeId, &LayoutNode)) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        visit(id, node);
        if let LayoutNode::Split { children, .. } = node {
            for &child in children {
                self.walk(child, visit);
            }
        }
    }

    pub fn tabset_of(&self, instance: InstanceId) -> Option<NodeId> {
        self.nodes.iter().find_map(|(&id, node)| match node {
            LayoutNode::Tabs { tabs, .. } if tabs.contains(&instance) => Some(id),
            _ => None,
        })
    }

    pub fn tabs(&self, tabset: NodeId) -> &[InstanceId] {
        match self.nodes.get(&tabset) {
            Some(LayoutNode::Tabs { tabs, .. }) => tabs,
            _ => &[],
        }
    }

    pub fn active_tab(&self, tabset: NodeId) -> Option<InstanceId> {
        match self.nodes.get(&tabset) {
            Some(LayoutNode::Tabs { tabs, active }) => tabs.get(*active).copied(),
            _ => None,
        }
    }

    /// Checks that every referenced node exists and is reached once, each
    /// instance appears once and no split or tabset is empty.
    pub fn validate(&self) -> bool {
        let Some(root) = self.root else {
            return self.nodes.is_empty();
        };
        let mut visited = std::collections::HashSet::new();
        let mut instances = std::collections::HashSet::new();
        let mut pending = vec![root];
        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                return false;
            }
            match self.nodes.get(&id) {
                None => return false,
                Some(LayoutNode::Split { children, weights, .. }) => {
                    if children.is_empty() || children.len() != weights.len() {
                        return false;
                    }
                    pending.extend(children.iter().copied());
                }
                Some(LayoutNode::Tabs { tabs, active }) => {
                    if tabs.is_empty() || *active >= tabs.len() {
                        return false;
                    }
                    if !tabs.iter().all(|t| instances.insert(*t)) {
                        return false;
                    }
                }
            }
        }
        visited.len() == self.nodes.len() && self.nodes.keys().all(|id| *id < self.next_node)
    }

    // ===== Mutation =====

    fn alloc(&mut self, node: LayoutNode) -> NodeId {
        let id = self.next_node;
        self.next_node += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Swaps `old` for `new` in `parent`, or at the root.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            Some(parent) => {
                if let Some(LayoutNode::Split { children, .. }) = self.nodes.get_mut(&parent) {
                    if let Some(slot) = children.iter_mut().find(|c| **c == old) {
                        *slot = new;
                    }
                }
            }
            None => self.root = Some(new),
        }
    }

    /// Inserts `instance` at `target` and returns the tabset holding it.
    ///
    /// A target naming a missing tabset falls back to [`DropTarget::Root`].
    pub fn insert(&mut self, instance: InstanceId, target: DropTarget) -> NodeId {
        let target = match target {
            DropTarget::Tabset { node, .. }
                if !matches!(self.nodes.get(&node), Some(LayoutNode::Tabs { .. })) =>
            {
                log::debug!("Drop target {} is gone, docking at root", node);
                DropTarget::Root
            }
            other => other,
        };

        match target {
            DropTarget::Root => match self.root {
                None => {
                    let id = self.alloc(LayoutNode::Tabs {
                        tabs: vec![instance],
                        active: 0,
                    });
                    self.root = Some(id);
                    id
                }
                Some(root) => self.dock_beside(root, instance, SplitAxis::Horizontal, true),
            },
            DropTarget::Tabset { node, zone } => match zone.split() {
                None => {
                    if let Some(LayoutNode::Tabs { tabs, active }) = self.nodes.get_mut(&node) {
                        tabs.push(instance);
                        *active = tabs.len() - 1;
                    }
                    node
                }
                Some((axis, after)) => self.dock_beside(node, instance, axis, after),
            },
        }
    }

    /// Puts a new tabset with `instance` next to `target` along `axis`.
    fn dock_beside(&mut self, target: NodeId, instance: InstanceId, axis: SplitAxis, after: bool) -> NodeId {
        let tabset = self.alloc(LayoutNode::Tabs {
            tabs: vec![instance],
            active: 0,
        });

        let parent = self.parent_of(target);
        if let Some(parent) = parent {
            if let Some(LayoutNode::Split {
                axis: parent_axis,
                children,
                weights,
            }) = self.nodes.get_mut(&parent)
            {
                if *parent_axis == axis {
                    if let Some(pos) = children.iter().position(|c| *c == target) {
                        let half = weights[pos] / 2.0;
                        weights[pos] = half;
                        let at = if after { pos + 1 } else { pos };
                        children.insert(at, tabset);
                        weights.insert(at, half);
                        return tabset;
                    }
                }
            }
        }

        let children = if after {
            vec![target, tabset]
        } else {
            vec![tabset, target]
        };
        let split = self.alloc(LayoutNode::Split {
            axis,
            children,
            weights: vec![0.5, 0.5],
        });
        self.replace_child(parent, target, split);
        tabset
    }

    /// Removes `instance`; empty tabsets are dropped and single-child splits
    /// collapse into their child.
    pub fn remove(&mut self, instance: InstanceId) -> bool {
        let Some(tabset) = self.tabset_of(instance) else {
            return false;
        };
        let now_empty = match self.nodes.get_mut(&tabset) {
            Some(LayoutNode::Tabs { tabs, active }) => {
                tabs.retain(|t| *t != instance);
                *active = (*active).min(tabs.len().saturating_sub(1));
                tabs.is_empty()
            }
            _ => false,
        };
        if now_empty {
            self.remove_node(tabset);
        }
        true
    }

    fn remove_node(&mut self, id: NodeId) {
        let parent = self.parent_of(id);
        self.nodes.remove(&id);
        let Some(parent) = parent else {
            self.root = None;
            return;
        };

        let remaining = match self.nodes.get_mut(&parent) {
            Some(LayoutNode::Split { children, weights, .. }) => {
                if let Some(pos) = children.iter().position(|c| *c == id) {
                    children.remove(pos);
                    weights.remove(pos);
                }
                children.clone()
            }
            _ => return,
        };

        match remaining.as_slice() {
            [] => self.remove_node(parent),
            [only] => {
                let grandparent = self.parent_of(parent);
                self.replace_child(grandparent, parent, *only);
                self.nodes.remove(&parent);
            }
            _ => {}
        }
    }

    /// Makes `instance` the active tab of its tabset.
    pub fn activate(&mut self, instance: InstanceId) -> bool {
        let Some(tabset) = self.tabset_of(instance) else {
            return false;
        };
        if let Some(LayoutNode::Tabs { tabs, active }) = self.nodes.get_mut(&tabset) {
            if let Some(pos) = tabs.iter().position(|t| *t == instance) {
                *active = pos;
                return true;
            }
        }
        false
    }

    /// Moves divider `index` of `split` by `delta`, a fraction of the split's
    /// extent. Both neighbours keep at least [`MIN_SPLIT_FRACTION`].
    pub fn resize(&mut self, split: NodeId, index: usize, delta: f32) -> bool {
        self.resize_with_minimums(split, index, delta, [0.0, 0.0])
    }

    /// Like [`LayoutTree::resize`], with per-neighbour minimum shares given as
    /// fractions of the split's extent. When the two minimums do not fit
    /// together they are scaled down in proportion.
    pub fn resize_with_minimums(&mut self, split: NodeId, index: usize, delta: f32, minimums: [f32; 2]) -> bool {
        let Some(LayoutNode::Split { weights, .. }) = self.nodes.get_mut(&split) else {
            return false;
        };
        if index + 1 >= weights.len() {
            return false;
        }
        let total: f32 = weights.iter().sum();
        let pair = weights[index] + weights[index + 1];
        let floor = MIN_SPLIT_FRACTION * total;
        if pair < 2.0 * floor {
            return false;
        }
        let mut min_left = (minimums[0] * total).max(floor);
        let mut min_right = (minimums[1] * total).max(floor);
        if min_left + min_right > pair {
            let scale = pair / (min_left + min_right);
            min_left *= scale;
            min_right *= scale;
        }
        let left = (weights[index] + delta * total).clamp(min_left, (pair - min_right).max(min_left));
        weights[index] = left;
        weights[index + 1] = pair - left;
        true
    }

    /// Axis and the two children on either side of divider `index`.
    pub fn divider_children(&self, split: NodeId, index: usize) -> Option<(SplitAxis, NodeId, NodeId)> {
        match self.nodes.get(&split) {
            Some(LayoutNode::Split { axis, children, .. }) => {
                Some((*axis, *children.get(index)?, *children.get(index + 1)?))
            }
            _ => None,
        }
    }

    /// Smallest size `node` can take: a tabset needs the largest hint among
    /// its tabs, a split the sum of its children along its axis.
    pub fn min_size(&self, node: NodeId, hint: &impl Fn(InstanceId) -> Vec2) -> Vec2 {
        match self.nodes.get(&node) {
            Some(LayoutNode::Tabs { tabs, .. }) => tabs.iter().fold(Vec2::ZERO, |acc, &tab| acc.max(hint(tab))),
            Some(LayoutNode::Split { axis, children, .. }) => {
                children.iter().fold(Vec2::ZERO, |acc, &child| {
                    let size = self.min_size(child, hint);
                    match axis {
                        SplitAxis::Horizontal => egui::vec2(acc.x + size.x, acc.y.max(size.y)),
                        SplitAxis::Vertical => egui::vec2(acc.x.max(size.x), acc.y + size.y),
                    }
                })
            }
            None => Vec2::ZERO,
        }
    }

    // ===== Geometry =====

    fn child_rects(rect: Rect, axis: SplitAxis, weights: &[f32]) -> Vec<Rect> {
        let total: f32 = weights.iter().sum::<f32>().max(f32::EPSILON);
        let mut offset = 0.0;
        weights
            .iter()
            .map(|w| {
                let start = offset / total;
                offset += w;
                let end = offset / total;
                match axis {
                    SplitAxis::Horizontal => Rect::from_min_max(
                        egui::pos2(rect.min.x + rect.width() * start, rect.min.y),
                        egui::pos2(rect.min.x + rect.width() * end, rect.max.y),
                    ),
                    SplitAxis::Vertical => Rect::from_min_max(
                        egui::pos2(rect.min.x, rect.min.y + rect.height() * start),
                        egui::pos2(rect.max.x, rect.min.y + rect.height() * end),
                    ),
                }
            })
            .collect()
    }

    fn layout_into(&self, id: NodeId, rect: Rect, tabsets: &mut Vec<(NodeId, Rect)>, dividers: &mut Vec<Divider>) {
        match self.nodes.get(&id) {
            Some(LayoutNode::Tabs { .. }) => tabsets.push((id, rect)),
            Some(LayoutNode::Split { axis, children, weights }) => {
                let rects = Self::child_rects(rect, *axis, weights);
                for (index, pair) in rects.windows(2).enumerate() {
                    let line = match axis {
                        SplitAxis::Horizontal => Rect::from_x_y_ranges(
                            pair[0].max.x - 2.0..=pair[1].min.x + 2.0,
                            rect.y_range(),
                        ),
                        SplitAxis::Vertical => Rect::from_x_y_ranges(
                            rect.x_range(),
                            pair[0].max.y - 2.0..=pair[1].min.y + 2.0,
                        ),
                    };
                    dividers.push(Divider {
                        split: id,
                        index,
                        axis: *axis,
                        rect: line,
                        extent: match axis {
                            SplitAxis::Horizontal => rect.width(),
                            SplitAxis::Vertical => rect.height(),
                        },
                    });
                }
                for (&child, child_rect) in children.iter().zip(rects) {
                    self.layout_into(child, child_rect, tabsets, dividers);
                }
            }
            None => {}
        }
    }

    /// Screen rectangles of every tabset within `area`.
    pub fn tabset_rects(&self, area: Rect) -> Vec<(NodeId, Rect)> {
        self.layout(area).0
    }

    /// Tabset rectangles and split dividers within `area`.
    pub fn layout(&self, area: Rect) -> (Vec<(NodeId, Rect)>, Vec<Divider>) {
        let mut tabsets = Vec::new();
        let mut dividers = Vec::new();
        if let Some(root) = self.root {
            self.layout_into(root, area, &mut tabsets, &mut dividers);
        }
        (tabsets, dividers)
    }

    /// Drop target under `pos`, or `None` outside `area`.
    pub fn hit_test(&self, area: Rect, pos: Pos2) -> Option<DropTarget> {
        if !area.contains(pos) {
            return None;
        }
        if self.is_empty() {
            return Some(DropTarget::Root);
        }
        self.tabset_rects(area)
            .into_iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(node, rect)| DropTarget::Tabset {
                node,
                zone: DropZone::from_point(rect, pos),
            })
    }
}
