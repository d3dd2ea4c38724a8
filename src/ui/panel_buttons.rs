//! Toolbar of panel buttons.
//!
//! One button per registered panel, shown according to its button state.
//! Clicking spawns the panel in the focused tabset. Dragging the button
//! carries a native payload onto the layout; dragging its grip runs the
//! pointer-driven drag instead.

use eframe::egui;
use rzpl::drag::DragOutcome;
use rzpl::{ButtonState, PanelRegistry};

use crate::state::{DragState, SpawnPayload};

/// Result of user interaction with the panel toolbar
pub enum PanelButtonInteraction {
    /// A panel button was clicked
    SpawnRequested(String),
    /// A grip was pressed; carries what the synthetic drag made of it
    SyntheticDrag(DragOutcome),
}

/// Renders the panel toolbar.
pub fn render_panel_buttons(
    ui: &mut egui::Ui,
    panels: &PanelRegistry,
    drag: &mut DragState,
) -> Option<PanelButtonInteraction> {
    let mut interaction = None;

    ui.horizontal_wrapped(|ui| {
        ui.label("Panels:");
        for descriptor in panels.list() {
            let title = descriptor.title();
            let state = descriptor.button_state();
            if state == ButtonState::Hidden {
                continue;
            }
            let enabled = state == ButtonState::Enabled;
            let dragged = drag.synthetic.dragged_button_title() == Some(title);

            let button = egui::Button::new(title)
                .selected(dragged)
                .sense(egui::Sense::click_and_drag());
            let response = ui.add_enabled(enabled, button).on_disabled_hover_text(format!(
                "{} of {} open",
                descriptor.instances().get(),
                descriptor.max_instance_count()
            ));
            if enabled {
                response.dnd_set_drag_payload(SpawnPayload(title.to_string()));
            }
            if response.clicked() {
                interaction = Some(PanelButtonInteraction::SpawnRequested(title.to_string()));
            }

            let grip = ui
                .add_enabled(enabled, egui::Button::new("✥").small().sense(egui::Sense::click_and_drag()))
                .on_hover_text("Drag to place the panel");
            if grip.drag_started() {
                let pointer = grip.interact_pointer_pos().unwrap_or(grip.rect.center());
                let outcome = drag.synthetic.begin(title, pointer, grip.rect);
                interaction = Some(PanelButtonInteraction::SyntheticDrag(outcome));
            }
        }
    });

    interaction
}
