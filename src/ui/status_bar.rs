//! Status bar UI rendering
//!
//! Handles the bottom status bar: memory, loaded groups and open panels.

use eframe::egui;
use egui::RichText;

use crate::app::AppState;
use crate::utils::{format_duration_ms, format_memory_mb, get_current_memory_mb};

/// Renders the status panel at the bottom of the window
///
/// # Arguments
/// * `ui` - The egui UI context for drawing
/// * `state` - Reference to application state
/// * `loading` - Whether a load is in flight
pub fn render_status_bar(ui: &mut egui::Ui, state: &AppState, loading: bool) {
    ui.horizontal(|ui| {
        // Always show memory usage first
        let memory_text = format_memory_mb(get_current_memory_mb());
        ui.label(RichText::new(&memory_text).strong());
        ui.label(RichText::new("|").strong());

        if loading {
            ui.spinner();
            ui.label(RichText::new("Loading...").strong());
            ui.label(RichText::new("|").strong());
        }

        match state.groups.active_group().and_then(|name| state.groups.get(name)) {
            Some(group) => {
                let span = group
                    .time_extent()
                    .map(|(start, end)| format_duration_ms(end - start))
                    .unwrap_or_else(|| "-".to_string());
                ui.label(
                    RichText::new(format!(
                        "Groups: {} | Active: {} | Frames: {} | Span: {}",
                        state.groups.len(),
                        group.name,
                        group.frames.len(),
                        span
                    ))
                    .strong(),
                );
            }
            None => {
                ui.label(RichText::new("No trace loaded").strong());
            }
        }

        ui.label(RichText::new("|").strong());
        ui.label(RichText::new(format!("Panels: {}", state.layout.instance_count())).strong());
    });
}
