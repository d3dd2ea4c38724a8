//! Panel orchestration and layout management.
//!
//! Coordinates the top bar, the panel toolbar, the tiling area and the status
//! bar, and funnels their interactions into one value for the application.

use eframe::egui;
use rzpl::drag::{DragOutcome, DropAction};
use rzpl::layout::NodeId;
use rzpl::{DropTarget, InstanceId, SelectedNode};

use crate::app::AppState;
use crate::io::AsyncLoader;
use crate::ui::panel_buttons::{self, PanelButtonInteraction};
use crate::ui::panel_views::PanelViews;
use crate::ui::tiling_view::{self, TilingInteraction};
use crate::ui::top_bar::{self, TopBarInteraction};
use crate::ui::status_bar;

/// Result of panel interactions that need to be handled by the application coordinator.
pub enum PanelInteraction {
    /// User asked for the open file dialog
    BrowseRequested,
    /// User asked to save the loaded groups
    SaveRequested,
    /// User requested to open a virtual trace
    OpenVirtualTraceRequested,
    /// Another group became the active profile
    ActiveGroupChanged(usize),
    /// A panel button was clicked
    SpawnPanel { title: String },
    /// A grip press started or toggled off the synthetic drag
    SyntheticDrag(DragOutcome),
    /// A drag ended without placing anything
    DragCancelled,
    /// Something was dropped on the layout
    Dropped { action: DropAction, target: Option<DropTarget> },
    MovePanel { id: InstanceId, target: DropTarget },
    ClosePanel(InstanceId),
    Activate(InstanceId),
    Resize { split: NodeId, index: usize, delta: f32, extent: f32 },
    /// A flamegraph frame was clicked
    FrameSelected(SelectedNode),
}

impl From<TopBarInteraction> for PanelInteraction {
    fn from(interaction: TopBarInteraction) -> Self {
        match interaction {
            TopBarInteraction::BrowseRequested => PanelInteraction::BrowseRequested,
            TopBarInteraction::SaveRequested => PanelInteraction::SaveRequested,
            TopBarInteraction::OpenVirtualTraceRequested => PanelInteraction::OpenVirtualTraceRequested,
            TopBarInteraction::ActiveGroupChanged(index) => PanelInteraction::ActiveGroupChanged(index),
        }
    }
}

impl From<PanelButtonInteraction> for PanelInteraction {
    fn from(interaction: PanelButtonInteraction) -> Self {
        match interaction {
            PanelButtonInteraction::SpawnRequested(title) => PanelInteraction::SpawnPanel { title },
            PanelButtonInteraction::SyntheticDrag(outcome) => PanelInteraction::SyntheticDrag(outcome),
        }
    }
}

impl From<TilingInteraction> for PanelInteraction {
    fn from(interaction: TilingInteraction) -> Self {
        match interaction {
            TilingInteraction::Activate(id) => PanelInteraction::Activate(id),
            TilingInteraction::Resize { split, index, delta, extent } => {
                PanelInteraction::Resize { split, index, delta, extent }
            }
            TilingInteraction::ClosePanel(id) => PanelInteraction::ClosePanel(id),
            TilingInteraction::Dropped { action, target } => PanelInteraction::Dropped { action, target },
            TilingInteraction::MovePanel { id, target } => PanelInteraction::MovePanel { id, target },
            TilingInteraction::DragCancelled => PanelInteraction::DragCancelled,
            TilingInteraction::FrameSelected(node) => PanelInteraction::FrameSelected(node),
        }
    }
}

/// Manages the layout and rendering of all UI panels.
pub struct PanelManager;

impl PanelManager {
    /// Renders all panels in the application window.
    ///
    /// This is the main entry point for rendering the entire UI, called from
    /// the eframe::App::update() implementation.
    pub fn render_all_panels(
        ctx: &egui::Context,
        state: &mut AppState,
        views: &mut PanelViews,
        loader: &AsyncLoader,
    ) -> Option<PanelInteraction> {
        let mut interaction: Option<PanelInteraction> = None;
        let theme_colors = state.theme.current_theme().colors;
        let loading = loader.is_loading();

        // Top bar
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            if let Some(top) = top_bar::render_top_bar(ui, state, loading) {
                interaction = Some(top.into());
            }
        });

        // Panel toolbar below the top bar
        egui::TopBottomPanel::top("panel_buttons").show(ctx, |ui| {
            if let Some(buttons) = panel_buttons::render_panel_buttons(ui, &state.panels, &mut state.drag) {
                interaction = Some(buttons.into());
            }
        });

        // Status panel at the very bottom
        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            status_bar::render_status_bar(ui, state, loading);
        });

        // Tiling area fills the rest
        let tiling_frame = egui::Frame::default()
            .inner_margin(egui::Margin::same(2))
            .fill(theme_colors.extreme_background);

        egui::CentralPanel::default().frame(tiling_frame).show(ctx, |ui| {
            if let Some(tiling) = tiling_view::render_tiling_view(ui, state, views, &theme_colors) {
                interaction = Some(tiling.into());
            }
        });

        interaction
    }
}
