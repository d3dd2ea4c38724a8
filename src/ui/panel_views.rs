//! Panel bodies, keyed by panel kind.
//!
//! Provider-backed panels own a [`ChartMount`] for as long as their selection
//! stays the same. A selection change or a reload of the groups re-keys the
//! mount, which drops the old subscriptions before the new ones are taken.

use std::collections::HashMap;

use eframe::egui;
use rzpl::panels::PanelData;
use rzpl::trace::layer::{event_args, layer_info};
use rzpl::{
    ChartMount, GroupRegistry, InstanceId, PanelDescriptor, PanelInstance, PanelKind, SelectedNode, SyncBus,
    ThemeColors,
};

use crate::rendering::{flame_renderer, plot_renderer};
use crate::utils::format_duration_ms;

/// Result of user interaction with a panel body
pub enum ViewInteraction {
    /// A flamegraph frame was clicked
    FrameSelected(SelectedNode),
}

struct MountedPlot {
    mount: ChartMount,
    data: PanelData,
    last_pointer: Option<(f64, f64)>,
}

/// Mounted charts of the live panel instances.
#[derive(Default)]
pub struct PanelViews {
    plots: HashMap<InstanceId, MountedPlot>,
}

impl PanelViews {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops mounts of instances that are no longer in the layout.
    pub fn prune(&mut self, is_live: impl Fn(InstanceId) -> bool) {
        self.plots.retain(|id, _| is_live(*id));
    }

    /// Mounts, re-keys or unmounts the chart of `instance` to match its
    /// current selection. Returns false when there is nothing to plot.
    pub fn sync_mount(
        &mut self,
        instance: &PanelInstance,
        descriptor: &PanelDescriptor,
        groups: &GroupRegistry,
        bus: &SyncBus,
    ) -> bool {
        let key = format!("{}@{}", instance.chart_key(), groups.revision());
        let current = self.plots.get(&instance.id()).is_some_and(|plot| plot.mount.key() == key);

        if !current {
            // Unmount first so the bus never holds two mounts of one instance
            self.plots.remove(&instance.id());
            let Some(data) = PanelData::merge(instance.fetch(descriptor, groups)) else {
                return false;
            };
            log::debug!("Mounting chart {} for panel '{}'", key, descriptor.title());
            let mount = ChartMount::mount(key, data.to_chart(), descriptor.kind().link_mode(), bus);
            self.plots.insert(
                instance.id(),
                MountedPlot {
                    mount,
                    data,
                    last_pointer: None,
                },
            );
        }

        if let Some(plot) = self.plots.get(&instance.id()) {
            let linked = groups
                .active_group()
                .is_some_and(|active| instance.selected_groups().iter().any(|g| g == active));
            plot.mount.set_linked(linked);
        }
        true
    }

    /// Renders the body of `instance`.
    #[allow(clippy::too_many_arguments)]
    pub fn render_body(
        &mut self,
        ui: &mut egui::Ui,
        instance: &PanelInstance,
        descriptor: &PanelDescriptor,
        groups: &GroupRegistry,
        bus: &SyncBus,
        selected_node: Option<&SelectedNode>,
        colors: &ThemeColors,
    ) -> Option<ViewInteraction> {
        match descriptor.kind() {
            PanelKind::Flamegraph => render_flamegraph_body(ui, groups, bus, selected_node, colors),
            PanelKind::Details => {
                render_details_body(ui, groups, selected_node, colors);
                None
            }
            _ => {
                self.render_plot_body(ui, instance, descriptor, groups, bus, colors);
                None
            }
        }
    }

    fn render_plot_body(
        &mut self,
        ui: &mut egui::Ui,
        instance: &PanelInstance,
        descriptor: &PanelDescriptor,
        groups: &GroupRegistry,
        bus: &SyncBus,
        colors: &ThemeColors,
    ) {
        if !self.sync_mount(instance, descriptor, groups, bus) {
            plot_renderer::render_empty(ui, "No data for the selected group", colors.text_dim);
            return;
        }
        let Some(plot) = self.plots.get_mut(&instance.id()) else {
            return;
        };

        let selected = plot
            .mount
            .is_linked()
            .then(|| bus.selected_frame.get())
            .flatten()
            .map(|frame| frame.name);
        let response = {
            let chart = plot.mount.chart().borrow();
            plot_renderer::render_plot(ui, &chart, &plot.data, selected.as_deref(), colors)
        };

        if response.pointer != plot.last_pointer {
            plot.last_pointer = response.pointer;
            plot.mount.on_pointer(bus, response.pointer);
        }
        if let Some(pointer) = response.clicked {
            if let Some(frame) = plot.mount.on_click(bus, pointer) {
                log::debug!("Selected frame '{}' from panel '{}'", frame.name, descriptor.title());
            }
        }
        if plot.mount.chart().borrow_mut().take_redraw() {
            ui.ctx().request_repaint();
        }
    }
}

fn render_flamegraph_body(
    ui: &mut egui::Ui,
    groups: &GroupRegistry,
    bus: &SyncBus,
    selected_node: Option<&SelectedNode>,
    colors: &ThemeColors,
) -> Option<ViewInteraction> {
    let Some(group) = groups.active_group().and_then(|name| groups.get(name)) else {
        plot_renderer::render_empty(ui, "Open a trace to see its flamegraph", colors.text_dim);
        return None;
    };
    let selected = selected_node
        .filter(|node| node.group == group.name)
        .map(|node| &node.frame);

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui| flame_renderer::render_flamegraph(ui, group, bus, selected, colors))
        .inner
        .map(|frame| {
            ViewInteraction::FrameSelected(SelectedNode {
                group: group.name.clone(),
                frame,
            })
        })
}

fn render_details_body(
    ui: &mut egui::Ui,
    groups: &GroupRegistry,
    selected_node: Option<&SelectedNode>,
    colors: &ThemeColors,
) {
    let Some(node) = selected_node else {
        ui.label("Select a frame in the flamegraph");
        return;
    };
    let frame = &node.frame;

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        egui::Grid::new("details_grid").num_columns(2).striped(true).show(ui, |ui| {
            ui.label("Group");
            ui.label(&node.group);
            ui.end_row();
            ui.label("Name");
            ui.label(&frame.name);
            ui.end_row();
            ui.label("Operator type");
            ui.label(frame.op_type.as_deref().unwrap_or("-"));
            ui.end_row();
            ui.label("Start");
            ui.label(format_duration_ms(frame.start));
            ui.end_row();
            ui.label("End");
            ui.label(format_duration_ms(frame.end));
            ui.end_row();
            ui.label("Duration");
            ui.label(format_duration_ms(frame.duration()));
            ui.end_row();
            ui.label("Depth");
            ui.label(frame.depth.to_string());
            ui.end_row();
        });

        let args = event_args(frame);
        if !args.is_empty() {
            ui.separator();
            egui::Grid::new("details_args").num_columns(3).striped(true).show(ui, |ui| {
                ui.strong("Param");
                ui.strong("Start");
                ui.strong("End");
                ui.end_row();
                for arg in args {
                    ui.label(arg.key);
                    ui.label(arg.start);
                    ui.label(arg.end.unwrap_or_default());
                    ui.end_row();
                }
            });
        }

        let layer = groups.get(&node.group).and_then(|group| layer_info(group, frame));
        let Some(layer) = layer else {
            return;
        };
        ui.separator();
        ui.heading("Layer info");
        ui.label(format!("Operation type: {}", layer.op_type));
        for (title, tensors) in [("Inputs", &layer.inputs), ("Outputs", &layer.outputs)] {
            ui.strong(title);
            for (i, tensor) in tensors.iter().enumerate() {
                ui.label(format!("{}. {}", i + 1, tensor.describe()));
            }
        }
        if !layer.parameters.is_empty() {
            ui.strong("Parameters");
            for (name, value) in &layer.parameters {
                ui.colored_label(colors.text_dim, format!("{}: {}", name, value));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rzpl::panels::builtin::{register_builtin_panels, CPU_LOAD, OPERATOR_EXECUTION};
    use rzpl::{PanelRegistry, VirtualTraceGenerator};

    fn setup() -> (PanelRegistry, GroupRegistry) {
        let mut panels = PanelRegistry::new();
        register_builtin_panels(&mut panels).unwrap();
        let mut groups = GroupRegistry::new();
        groups.insert(VirtualTraceGenerator::with_config(2, 1).generate("g1"));
        groups.insert(VirtualTraceGenerator::with_config(2, 2).generate("g2"));
        panels.refresh_availability(&groups);
        (panels, groups)
    }

    #[test]
    fn test_remount_on_group_switch_keeps_one_subscription_set() {
        let (panels, groups) = setup();
        let bus = SyncBus::new();
        let descriptor = panels.get(OPERATOR_EXECUTION).unwrap();
        let mut instance = PanelInstance::new(1, descriptor, &groups);
        let mut views = PanelViews::new();

        assert!(views.sync_mount(&instance, descriptor, &groups, &bus));
        let subscribers = bus.subscriber_count();
        assert!(subscribers > 0);

        assert!(instance.set_target_group(descriptor, &groups, "g2").is_some());
        assert!(views.sync_mount(&instance, descriptor, &groups, &bus));
        assert_eq!(bus.subscriber_count(), subscribers);
        assert_eq!(views.plots.len(), 1);
    }

    #[test]
    fn test_only_active_group_is_linked() {
        let (panels, groups) = setup();
        let bus = SyncBus::new();
        let descriptor = panels.get(OPERATOR_EXECUTION).unwrap();
        let mut instance = PanelInstance::new(1, descriptor, &groups);
        let mut views = PanelViews::new();

        views.sync_mount(&instance, descriptor, &groups, &bus);
        assert!(views.plots[&1].mount.is_linked());

        instance.set_target_group(descriptor, &groups, "g2");
        views.sync_mount(&instance, descriptor, &groups, &bus);
        assert!(!views.plots[&1].mount.is_linked());
    }

    #[test]
    fn test_prune_releases_subscriptions() {
        let (panels, groups) = setup();
        let bus = SyncBus::new();
        let descriptor = panels.get(CPU_LOAD).unwrap();
        let instance = PanelInstance::new(4, descriptor, &groups);
        let mut views = PanelViews::new();

        views.sync_mount(&instance, descriptor, &groups, &bus);
        assert!(bus.subscriber_count() > 0);
        views.prune(|_| false);
        assert_eq!(views.plots.len(), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
