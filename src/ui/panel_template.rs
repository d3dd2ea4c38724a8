//! Common chrome around every panel body.
//!
//! Renders the title, the group selector (one dropdown, or one row per group
//! with add/remove controls for multi-plot panels) and the close button.

use eframe::egui;
use rzpl::{GroupRegistry, PanelDescriptor, PanelInstance};

/// Result of user interaction with a panel header
pub enum TemplateInteraction {
    /// The close button was clicked
    CloseRequested,
    /// The selected groups changed; the view refetches on its next frame
    SelectionChanged,
}

/// Renders the header of `instance` above its body.
pub fn render_panel_header(
    ui: &mut egui::Ui,
    instance: &mut PanelInstance,
    descriptor: &PanelDescriptor,
    groups: &GroupRegistry,
) -> Option<TemplateInteraction> {
    let mut interaction = None;

    ui.horizontal(|ui| {
        ui.strong(descriptor.title());

        if descriptor.allows_group_selection() {
            let changed = if descriptor.allows_multiple_plots() {
                render_group_rows(ui, instance, descriptor, groups)
            } else {
                render_group_combo(ui, instance, descriptor, groups)
            };
            if changed {
                interaction = Some(TemplateInteraction::SelectionChanged);
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if descriptor.is_closable() && ui.small_button("✖").on_hover_text("Close panel").clicked() {
                interaction = Some(TemplateInteraction::CloseRequested);
            }
        });
    });

    interaction
}

/// Single-group dropdown. Returns true when the selection changed.
fn render_group_combo(
    ui: &mut egui::Ui,
    instance: &mut PanelInstance,
    descriptor: &PanelDescriptor,
    groups: &GroupRegistry,
) -> bool {
    let current = instance.target_group().unwrap_or("-").to_string();
    let mut picked = None;
    egui::ComboBox::from_id_salt(("group", instance.id()))
        .selected_text(&current)
        .show_ui(ui, |ui| {
            for name in PanelInstance::eligible_groups(descriptor, groups) {
                if ui.selectable_label(name == current, name).clicked() && name != current {
                    picked = Some(name.to_string());
                }
            }
        });

    match picked {
        Some(group) => instance.set_target_group(descriptor, groups, &group).is_some(),
        None => false,
    }
}

/// One dropdown per selected group plus add/remove buttons.
fn render_group_rows(
    ui: &mut egui::Ui,
    instance: &mut PanelInstance,
    descriptor: &PanelDescriptor,
    groups: &GroupRegistry,
) -> bool {
    let selected: Vec<String> = instance.selected_groups().to_vec();
    let candidates: Vec<String> = instance
        .add_candidates(descriptor, groups)
        .into_iter()
        .map(str::to_string)
        .collect();
    let can_remove = instance.can_remove_group();

    let mut replace: Option<(usize, String)> = None;
    let mut remove: Option<usize> = None;

    for (index, current) in selected.iter().enumerate() {
        egui::ComboBox::from_id_salt(("group_row", instance.id(), index))
            .selected_text(current)
            .show_ui(ui, |ui| {
                ui.label(current);
                for name in &candidates {
                    if ui.selectable_label(false, name).clicked() {
                        replace = Some((index, name.clone()));
                    }
                }
            });
        if ui
            .add_enabled(can_remove, egui::Button::new("➖").small())
            .on_hover_text("Remove group from plot")
            .clicked()
        {
            remove = Some(index);
        }
    }

    let add_clicked = ui
        .add_enabled(!candidates.is_empty(), egui::Button::new("➕").small())
        .on_hover_text("Add group to plot")
        .clicked();

    let mut changed = false;
    if let Some((index, group)) = replace {
        changed |= instance.replace_group(descriptor, groups, index, &group).is_some();
    }
    if let Some(index) = remove {
        changed |= instance.remove_group(index);
    }
    if add_clicked {
        changed |= instance.add_next_group(descriptor, groups).is_some();
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rzpl::panels::PanelKind;
    use rzpl::TraceGroup;

    #[test]
    fn test_idle_group_rows_change_nothing() {
        let descriptor = PanelDescriptor::new("Plot", PanelKind::CpuLoad).multiple_plots();
        let mut groups = GroupRegistry::new();
        groups.insert(TraceGroup::new("g1"));
        groups.insert(TraceGroup::new("g2"));
        let mut instance = PanelInstance::new(1, &descriptor, &groups);
        let before = instance.selection().clone();

        let ctx = egui::Context::default();
        let mut interaction = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                interaction = render_panel_header(ui, &mut instance, &descriptor, &groups);
            });
        });

        assert!(interaction.is_none());
        assert_eq!(instance.selection(), &before);
    }
}
