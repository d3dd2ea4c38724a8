//! Static description of a panel type.

use std::rc::Rc;

use egui::Vec2;

use crate::chart::PointMetric;
use crate::observable::Observable;
use crate::panels::{DataProvider, PanelData};
use crate::sync::LinkMode;
use crate::trace::GroupRegistry;

/// What a descriptor renders; the viewer maps each kind to a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Flamegraph,
    Details,
    CpuLoad,
    DieTemperature,
    OperatorExecution,
    OperatorTypeExecution,
    OperatorSize,
    MemoryUsage,
}

impl PanelKind {
    /// Shared channels a plot of this kind joins.
    pub fn link_mode(self) -> LinkMode {
        match self {
            PanelKind::CpuLoad | PanelKind::DieTemperature | PanelKind::MemoryUsage => {
                LinkMode::Timestamps
            }
            PanelKind::OperatorExecution | PanelKind::OperatorSize => LinkMode::Frames,
            PanelKind::OperatorTypeExecution | PanelKind::Flamegraph | PanelKind::Details => {
                LinkMode::Independent
            }
        }
    }

    pub fn metric(self) -> PointMetric {
        match self.link_mode() {
            LinkMode::Timestamps => PointMetric::Normalized,
            _ => PointMetric::Vertical,
        }
    }
}

/// Button state derived from availability and the live instance count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Hidden,
    Disabled,
    Enabled,
}

impl ButtonState {
    pub fn from_counts(available: bool, instances: usize, max_instances: usize) -> Self {
        if !available {
            ButtonState::Hidden
        } else if instances >= max_instances {
            ButtonState::Disabled
        } else {
            ButtonState::Enabled
        }
    }
}

#[derive(Clone)]
pub struct PanelDescriptor {
    title: String,
    kind: PanelKind,
    provider: Option<DataProvider>,
    available: Observable<bool>,
    instances: Observable<usize>,
    max_instances: usize,
    min_size: Vec2,
    closable: bool,
    allow_group_selection: bool,
    allow_multiple_plots: bool,
}

impl std::fmt::Debug for PanelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelDescriptor")
            .field("title", &self.title)
            .field("kind", &self.kind)
            .field("has_provider", &self.provider.is_some())
            .field("available", &self.available.get())
            .field("instances", &self.instances.get())
            .field("max_instances", &self.max_instances)
            .finish_non_exhaustive()
    }
}

impl PanelDescriptor {
    pub fn new(title: impl Into<String>, kind: PanelKind) -> Self {
        Self {
            title: title.into(),
            kind,
            provider: None,
            available: Observable::new(false),
            instances: Observable::new(0),
            max_instances: 1,
            min_size: Vec2::new(200.0, 150.0),
            closable: true,
            allow_group_selection: false,
            allow_multiple_plots: false,
        }
    }

    // ===== Builder =====

    pub fn with_provider(
        mut self,
        provider: impl Fn(&GroupRegistry, &str) -> Option<PanelData> + 'static,
    ) -> Self {
        self.provider = Some(Rc::new(provider));
        self.allow_group_selection = true;
        self
    }

    pub fn max_instances(mut self, max: usize) -> Self {
        self.max_instances = max;
        self
    }

    pub fn min_size(mut self, width: f32, height: f32) -> Self {
        self.min_size = Vec2::new(width, height);
        self
    }

    pub fn not_closable(mut self) -> Self {
        self.closable = false;
        self
    }

    pub fn multiple_plots(mut self) -> Self {
        self.allow_multiple_plots = true;
        self
    }

    pub fn without_group_selection(mut self) -> Self {
        self.allow_group_selection = false;
        self
    }

    // ===== Accessors =====

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn max_instance_count(&self) -> usize {
        self.max_instances
    }

    pub fn min_size_hint(&self) -> Vec2 {
        self.min_size
    }

    pub fn is_closable(&self) -> bool {
        self.closable
    }

    pub fn allows_group_selection(&self) -> bool {
        self.allow_group_selection && self.provider.is_some()
    }

    pub fn allows_multiple_plots(&self) -> bool {
        self.allow_multiple_plots && self.allows_group_selection()
    }

    pub fn available(&self) -> &Observable<bool> {
        &self.available
    }

    pub fn instances(&self) -> &Observable<usize> {
        &self.instances
    }

    pub fn button_state(&self) -> ButtonState {
        ButtonState::from_counts(self.available.get(), self.instances.get(), self.max_instances)
    }

    // ===== Data =====

    /// Runs the provider for `group`. Provider-less panels yield nothing.
    pub fn provide(&self, groups: &GroupRegistry, group: &str) -> Option<PanelData> {
        self.provider.as_ref().and_then(|provider| provider(groups, group))
    }

    /// Whether `group` can be selected: it exists and the provider accepts it.
    pub fn accepts(&self, groups: &GroupRegistry, group: &str) -> bool {
        match &self.provider {
            Some(provider) => provider(groups, group).is_some(),
            None => groups.get(group).is_some(),
        }
    }

    /// Availability over the currently loaded groups.
    pub fn compute_availability(&self, groups: &GroupRegistry) -> bool {
        groups.iter().any(|g| self.accepts(groups, &g.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::TraceGroup;

    #[test]
    fn test_button_state_truth_table() {
        assert_eq!(ButtonState::from_counts(false, 0, 1), ButtonState::Hidden);
        assert_eq!(ButtonState::from_counts(false, 1, 1), ButtonState::Hidden);
        assert_eq!(ButtonState::from_counts(true, 1, 1), ButtonState::Disabled);
        assert_eq!(ButtonState::from_counts(true, 0, 1), ButtonState::Enabled);
    }

    #[test]
    fn test_provider_gates_acceptance() {
        let mut groups = GroupRegistry::new();
        groups.insert(TraceGroup::new("empty"));
        let descriptor = PanelDescriptor::new("Never", PanelKind::CpuLoad).with_provider(|_, _| None);
        assert!(!descriptor.accepts(&groups, "empty"));
        assert!(!descriptor.compute_availability(&groups));

        let plain = PanelDescriptor::new("Details", PanelKind::Details);
        assert!(plain.accepts(&groups, "empty"));
        assert!(!plain.accepts(&groups, "missing"));
        assert!(!plain.allows_group_selection());
    }

    #[test]
    fn test_multiple_plots_require_provider() {
        let descriptor = PanelDescriptor::new("X", PanelKind::Details).multiple_plots();
        assert!(!descriptor.allows_multiple_plots());
    }
}
