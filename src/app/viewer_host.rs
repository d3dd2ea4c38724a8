//! The viewer side of the host seam.
//!
//! Panels and the drop container reach file dialogs, loading and the shared
//! selection only through [`HostViewer`]; this adapter implements it over the
//! application state for the duration of one frame.

use std::path::PathBuf;

use rzpl::{FrameRef, HostViewer, SelectedNode};

use crate::app::{AppState, ApplicationCoordinator};
use crate::io::AsyncLoader;

const TRACE_EXTENSIONS: &[&str] = &["json", "br"];

pub struct ViewerHost<'a> {
    state: &'a mut AppState,
    loader: &'a mut AsyncLoader,
    ctx: &'a egui::Context,
}

impl<'a> ViewerHost<'a> {
    pub fn new(state: &'a mut AppState, loader: &'a mut AsyncLoader, ctx: &'a egui::Context) -> Self {
        Self { state, loader, ctx }
    }

    fn file_dialog() -> rfd::FileDialog {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Trace Groups", TRACE_EXTENSIONS)
            .add_filter("JSON", &["json"])
            .add_filter("Brotli JSON", &["br"]);
        if let Ok(cwd) = std::env::current_dir() {
            dialog = dialog.set_directory(cwd);
        }
        dialog
    }
}

impl HostViewer for ViewerHost<'_> {
    fn browse_for_file(&mut self) {
        if let Some(paths) = Self::file_dialog().pick_files() {
            ApplicationCoordinator::open_files(self.state, self.loader, paths, self.ctx);
        }
    }

    fn load_drop_file(&mut self, files: Vec<PathBuf>) {
        let (traces, ignored): (Vec<PathBuf>, Vec<PathBuf>) = files.into_iter().partition(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| TRACE_EXTENSIONS.contains(&ext))
        });
        for path in &ignored {
            log::warn!("Ignoring dropped file {}", path.display());
        }
        if traces.is_empty() {
            self.state.error_message = Some("Dropped files are not trace groups (.json or .br)".to_string());
            return;
        }
        ApplicationCoordinator::open_files(self.state, self.loader, traces, self.ctx);
    }

    fn save_file(&mut self) -> anyhow::Result<()> {
        let Some(path) = Self::file_dialog().set_file_name("groups.json").save_file() else {
            return Ok(());
        };
        ApplicationCoordinator::save_groups(self.state, &path)
    }

    fn redraw_canvas(&mut self) {
        self.ctx.request_repaint();
    }

    fn selected_frame(&self) -> Option<FrameRef> {
        self.state.bus.selected_frame.get()
    }

    fn set_selected_frame(&mut self, frame: Option<FrameRef>) {
        self.state.bus.selected_frame.set(frame);
    }

    fn selected_node(&self) -> Option<&SelectedNode> {
        self.state.selected_node.as_ref()
    }

    fn set_selected_node(&mut self, node: Option<SelectedNode>) {
        match node {
            Some(node) => ApplicationCoordinator::select_frame(self.state, node),
            None => {
                self.state.selected_node = None;
                self.state.bus.selected_frame.set(None);
            }
        }
    }
}
