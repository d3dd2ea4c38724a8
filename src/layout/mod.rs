mod controller;
mod tree;

pub use controller::{DragPreview, LayoutController, LayoutSnapshot, PanelSnapshot, Placement, PreviewSource};
pub use tree::{Divider, DropTarget, DropZone, LayoutNode, LayoutTree, NodeId, SplitAxis, MIN_SPLIT_FRACTION};
