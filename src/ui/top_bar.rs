//! Top bar UI rendering
//!
//! Handles the file controls, the active group selector and the theme selector.

use eframe::egui;
use egui::Color32;

use crate::app::AppState;

/// Result of user interaction with the top bar
pub enum TopBarInteraction {
    /// User clicked "Open" button
    BrowseRequested,
    /// User clicked "Save" button
    SaveRequested,
    /// User clicked "Virtual Trace" button
    OpenVirtualTraceRequested,
    /// User picked another active group
    ActiveGroupChanged(usize),
}

/// Renders the top bar
///
/// # Arguments
/// * `ui` - The egui UI context for drawing
/// * `state` - Mutable reference to application state
/// * `loading` - Whether a load is in flight
///
/// # Returns
/// * `Option<TopBarInteraction>` - User interaction result
pub fn render_top_bar(ui: &mut egui::Ui, state: &mut AppState, loading: bool) -> Option<TopBarInteraction> {
    let mut interaction = None;

    ui.horizontal(|ui| {
        if ui.add_enabled(!loading, egui::Button::new("📁 Open")).clicked() {
            interaction = Some(TopBarInteraction::BrowseRequested);
        }

        if ui.button("🔮 Virtual Trace").clicked() {
            interaction = Some(TopBarInteraction::OpenVirtualTraceRequested);
        }

        if ui
            .add_enabled(!state.groups.is_empty(), egui::Button::new("💾 Save"))
            .on_hover_text("Save all loaded groups to one file")
            .clicked()
        {
            interaction = Some(TopBarInteraction::SaveRequested);
        }

        ui.separator();

        if !state.groups.is_empty() {
            ui.label("Active group:");
            let active = state.groups.active_index();
            let names = state.groups.list_group_names();
            let mut picked = active;
            egui::ComboBox::from_id_salt("active_group")
                .selected_text(state.groups.active_group().unwrap_or("-"))
                .show_ui(ui, |ui| {
                    for (index, name) in names.iter().enumerate() {
                        ui.selectable_value(&mut picked, Some(index), *name);
                    }
                });
            if picked != active {
                if let Some(index) = picked {
                    interaction = Some(TopBarInteraction::ActiveGroupChanged(index));
                }
            }
        }

        // Push theme selector to the right
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let old_theme = state.theme.current_theme_name().to_string();
            let mut current_theme = old_theme.clone();
            egui::ComboBox::from_id_salt("theme_selector")
                .selected_text(&current_theme)
                .show_ui(ui, |ui| {
                    for theme_name in state.theme.theme_manager().list_themes() {
                        ui.selectable_value(&mut current_theme, theme_name.to_string(), theme_name);
                    }
                });

            // Saved on the next update through the dirty flag
            if old_theme != current_theme {
                state.theme.set_theme(&current_theme);
                ui.ctx().request_repaint();
            }

            ui.label("Theme:");
        });
    });

    if let Some(err) = &state.error_message {
        ui.colored_label(Color32::RED, err);
    }

    interaction
}
