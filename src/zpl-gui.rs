//! Profile Trace Viewer GUI Application
//!
//! This module provides an interactive viewer for profiling trace groups using the egui framework.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
//! The viewer features:
//! - Tiling layout of panels spawned from a toolbar by click or drag and drop
//! - Flamegraph, plot and details panels bound to one or more trace groups
//! - Linked hover, selection and timestamps across panels
//! - Asynchronous file loading, including files dropped on the window
//! - Multiple theme support with persistent preferences and layout
//!
//! The application is built with a modular architecture:
//! - `app/` - Application state management and coordination
//! - `io/` - Background loading of trace group files
//! - `utils/` - Utility functions for formatting
//! - `ui/` - Panel toolbar, tiling view and panel rendering
//! - `rendering/` - Low-level painting of flamegraphs and plots
//! - `state/` - Theme and drag state

use eframe::egui;
use rzpl::host::dispatch_drop;
use rzpl::layout::PreviewSource;
use rzpl::HostViewer;
use std::path::PathBuf;

mod app;
mod io;
mod rendering;
mod state;
mod ui;
mod utils;

use app::{AppState, ApplicationCoordinator, SettingsCoordinator, ThemeCoordinator, ViewerHost};
use io::AsyncLoader;
use ui::panel_manager::{PanelInteraction, PanelManager};
use ui::panel_views::PanelViews;

/// Main application entry point that initializes and launches the viewer GUI.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Files named on the command line are loaded on the first frame
    let initial_files: Vec<PathBuf> = std::env::args().skip(1).map(PathBuf::from).collect();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Profile Trace Viewer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Profile Trace Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(ZplViewerApp::new(cc, initial_files)?))),
    )
    .map_err(|err| anyhow::anyhow!("Viewer failed: {}", err))
}

/// The main viewer application.
///
/// Delegates most functionality to coordinators:
/// - `ApplicationCoordinator` handles loading, panels and selection
/// - `ThemeCoordinator` and `SettingsCoordinator` handle persistence
/// - `PanelManager` handles UI panel layout and rendering
struct ZplViewerApp {
    /// Centralized application state
    state: AppState,
    /// Asynchronous file loader
    loader: AsyncLoader,
    /// Mounted charts of the live panels
    views: PanelViews,
    /// Files to load on first frame
    pending_files: Vec<PathBuf>,
}

impl ZplViewerApp {
    /// Creates a new viewer with theme and layout loaded from persistent storage.
    fn new(cc: &eframe::CreationContext, initial_files: Vec<PathBuf>) -> Result<Self, rzpl::RegistryError> {
        let theme_name = ThemeCoordinator::load_theme_from_storage(cc.storage);
        let mut state = AppState::with_theme(&theme_name)?;

        if let Some(snapshot) = SettingsCoordinator::load_layout(cc.storage) {
            state.layout.restore(&state.panels, &state.groups, snapshot);
        }

        Ok(Self {
            state,
            loader: AsyncLoader::new(),
            views: PanelViews::new(),
            pending_files: initial_files,
        })
    }

    /// Handles panel interactions by delegating to the coordinators.
    fn handle_panel_interaction(&mut self, interaction: PanelInteraction, ctx: &egui::Context) {
        match interaction {
            PanelInteraction::BrowseRequested => {
                ViewerHost::new(&mut self.state, &mut self.loader, ctx).browse_for_file();
            }
            PanelInteraction::SaveRequested => {
                let result = ViewerHost::new(&mut self.state, &mut self.loader, ctx).save_file();
                if let Err(err) = result {
                    log::error!("{:#}", err);
                    self.state.error_message = Some(format!("{:#}", err));
                }
            }
            PanelInteraction::OpenVirtualTraceRequested => {
                ApplicationCoordinator::open_virtual_trace(&mut self.state);
            }
            PanelInteraction::ActiveGroupChanged(index) => {
                ApplicationCoordinator::set_active_group(&mut self.state, index);
            }
            PanelInteraction::SpawnPanel { title } => {
                ApplicationCoordinator::spawn_panel(&mut self.state, &title, None);
            }
            PanelInteraction::SyntheticDrag(outcome) => {
                log::debug!("Grip pressed: {:?}", outcome);
                if !self.state.drag.synthetic.is_active() {
                    self.state.layout.cancel_preview();
                }
            }
            PanelInteraction::DragCancelled => {
                self.state.layout.cancel_preview();
            }
            PanelInteraction::Dropped { action, target } => {
                let placed = {
                    let mut host = ViewerHost::new(&mut self.state, &mut self.loader, ctx);
                    dispatch_drop(&mut host, action)
                };
                if let Some((title, pos)) = placed {
                    log::debug!("Placing '{}' dropped at {:?}", title, pos);
                    let previewed = matches!(
                        self.state.layout.preview().map(|p| &p.source),
                        Some(PreviewSource::Spawn(source)) if *source == title
                    );
                    if previewed && target.is_some() {
                        self.state.layout.update_preview(target);
                        self.state.layout.commit_preview(&self.state.panels, &self.state.groups);
                    } else {
                        ApplicationCoordinator::spawn_panel(&mut self.state, &title, target);
                    }
                }
                self.state.layout.cancel_preview();
                self.state.drag.container.finish_drop();
            }
            PanelInteraction::MovePanel { id, target } => {
                let previewed = matches!(
                    self.state.layout.preview().map(|p| &p.source),
                    Some(PreviewSource::Existing(source)) if *source == id
                );
                if previewed {
                    self.state.layout.update_preview(Some(target));
                    self.state.layout.commit_preview(&self.state.panels, &self.state.groups);
                } else {
                    ApplicationCoordinator::move_panel(&mut self.state, id, target);
                }
            }
            PanelInteraction::ClosePanel(id) => {
                ApplicationCoordinator::close_panel(&mut self.state, id);
            }
            PanelInteraction::Activate(id) => {
                self.state.layout.activate(id);
            }
            PanelInteraction::Resize { split, index, delta, extent } => {
                self.state.layout.resize(&self.state.panels, split, index, delta, extent);
            }
            PanelInteraction::FrameSelected(node) => {
                ApplicationCoordinator::select_frame(&mut self.state, node);
            }
        }
    }
}

impl eframe::App for ZplViewerApp {
    /// Called when the app is being shut down - ensures preferences are saved.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        ThemeCoordinator::save_theme_to_storage(storage, self.state.theme.current_theme_name());
        SettingsCoordinator::save_layout(storage, &self.state.layout.snapshot());
    }

    /// Main update loop that renders all UI panels and handles application state.
    ///
    /// 1. Check for async loading completion
    /// 2. Apply theme
    /// 3. Load initial files if specified via command line
    /// 4. Render all panels via PanelManager
    /// 5. Handle panel interactions
    /// 6. Release charts of closed panels
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        ApplicationCoordinator::check_loading_completion(&mut self.state, &mut self.loader);

        ThemeCoordinator::apply_current_theme(ctx, &self.state);

        // Persist a changed theme right away
        if self.state.theme.take_dirty() {
            if let Some(storage) = frame.storage_mut() {
                ThemeCoordinator::save_theme_to_storage(storage, self.state.theme.current_theme_name());
            }
        }

        if !self.pending_files.is_empty() {
            let files = std::mem::take(&mut self.pending_files);
            ApplicationCoordinator::open_files(&mut self.state, &mut self.loader, files, ctx);
        }

        if let Some(interaction) = PanelManager::render_all_panels(ctx, &mut self.state, &mut self.views, &self.loader)
        {
            self.handle_panel_interaction(interaction, ctx);
        }

        let layout = &self.state.layout;
        self.views.prune(|id| layout.instance(id).is_some());
    }
}
