//! Seam between the panel subsystem and the viewer that embeds it.

use std::path::PathBuf;

use egui::Pos2;

use crate::drag::DropAction;
use crate::sync::FrameRef;
use crate::trace::FrameSpan;

/// A frame picked in the flamegraph, with the group it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedNode {
    pub group: String,
    pub frame: FrameSpan,
}

/// Operations the hosting viewer provides to panels and drop targets.
pub trait HostViewer {
    /// Opens a file picker and loads the chosen traces.
    fn browse_for_file(&mut self);

    /// Loads trace files dropped on the layout.
    fn load_drop_file(&mut self, files: Vec<PathBuf>);

    /// Writes the loaded groups to a file chosen by the user.
    fn save_file(&mut self) -> anyhow::Result<()>;

    /// Requests a repaint of the flamegraph canvas.
    fn redraw_canvas(&mut self);

    fn selected_frame(&self) -> Option<FrameRef>;

    fn set_selected_frame(&mut self, frame: Option<FrameRef>);

    fn selected_node(&self) -> Option<&SelectedNode>;

    fn set_selected_node(&mut self, node: Option<SelectedNode>);
}

/// Routes a drop to the host. File drops are handled here; a panel drop is
/// returned so the caller can place the panel.
pub fn dispatch_drop(host: &mut impl HostViewer, action: DropAction) -> Option<(String, Pos2)> {
    match action {
        DropAction::LoadFiles(files) => {
            log::info!("Loading {} dropped file(s)", files.len());
            host.load_drop_file(files);
            host.redraw_canvas();
            None
        }
        DropAction::SpawnPanel { title, pos } => Some((title, pos)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        loaded: Vec<PathBuf>,
        redraws: usize,
        frame: Option<FrameRef>,
        node: Option<SelectedNode>,
    }

    impl HostViewer for RecordingHost {
        fn browse_for_file(&mut self) {}

        fn load_drop_file(&mut self, files: Vec<PathBuf>) {
            self.loaded.extend(files);
        }

        fn save_file(&mut self) -> anyhow::Result<()> {
            Ok(())
        }

        fn redraw_canvas(&mut self) {
            self.redraws += 1;
        }

        fn selected_frame(&self) -> Option<FrameRef> {
            self.frame.clone()
        }

        fn set_selected_frame(&mut self, frame: Option<FrameRef>) {
            self.frame = frame;
        }

        fn selected_node(&self) -> Option<&SelectedNode> {
            self.node.as_ref()
        }

        fn set_selected_node(&mut self, node: Option<SelectedNode>) {
            self.node = node;
        }
    }

    #[test]
    fn test_file_drop_goes_to_host() {
        let mut host = RecordingHost::default();
        let result = dispatch_drop(&mut host, DropAction::LoadFiles(vec![PathBuf::from("a.json")]));
        assert!(result.is_none());
        assert_eq!(host.loaded, vec![PathBuf::from("a.json")]);
        assert_eq!(host.redraws, 1);
    }

    #[test]
    fn test_panel_drop_is_returned() {
        let mut host = RecordingHost::default();
        let pos = egui::pos2(1.0, 2.0);
        let result = dispatch_drop(&mut host, DropAction::SpawnPanel { title: "X".into(), pos });
        assert_eq!(result, Some(("X".to_string(), pos)));
        assert!(host.loaded.is_empty());
    }
}
