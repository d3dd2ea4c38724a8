//! A live panel and the group(s) it shows.

use serde::{Deserialize, Serialize};

use crate::panels::{PanelData, PanelDescriptor};
use crate::trace::GroupRegistry;

pub type InstanceId = u64;

/// Groups a panel is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupSelection {
    /// Nothing selected: provider-less panels follow the active group, and
    /// provider-backed panels wait for an eligible group.
    None,
    Single(String),
    /// Ordered and duplicate-free.
    Multiple(Vec<String>),
}

impl GroupSelection {
    pub fn groups(&self) -> &[String] {
        match self {
            GroupSelection::None => &[],
            GroupSelection::Single(group) => std::slice::from_ref(group),
            GroupSelection::Multiple(groups) => groups,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelInstance {
    id: InstanceId,
    title: String,
    selection: GroupSelection,
}

impl PanelInstance {
    /// Creates an instance bound to the active group when the provider
    /// accepts it, else to the first eligible group.
    pub fn new(id: InstanceId, descriptor: &PanelDescriptor, groups: &GroupRegistry) -> Self {
        let mut instance = Self {
            id,
            title: descriptor.title().to_string(),
            selection: GroupSelection::None,
        };
        instance.select_initial(descriptor, groups);
        instance
    }

    /// Rebuilds an instance from persisted state without touching providers.
    pub fn restore(id: InstanceId, title: impl Into<String>, selection: GroupSelection) -> Self {
        Self {
            id,
            title: title.into(),
            selection,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selection(&self) -> &GroupSelection {
        &self.selection
    }

    pub fn selected_groups(&self) -> &[String] {
        self.selection.groups()
    }

    pub fn target_group(&self) -> Option<&str> {
        self.selected_groups().first().map(String::as_str)
    }

    /// Groups the descriptor can show, in registry order.
    pub fn eligible_groups<'a>(
        descriptor: &PanelDescriptor,
        groups: &'a GroupRegistry,
    ) -> Vec<&'a str> {
        groups
            .iter()
            .map(|g| g.name.as_str())
            .filter(|name| descriptor.accepts(groups, name))
            .collect()
    }

    fn select_initial(&mut self, descriptor: &PanelDescriptor, groups: &GroupRegistry) {
        if !descriptor.allows_group_selection() {
            self.selection = GroupSelection::None;
            return;
        }
        let initial = groups
            .active_group()
            .filter(|active| descriptor.accepts(groups, active))
            .or_else(|| Self::eligible_groups(descriptor, groups).first().copied())
            .map(str::to_string);

        self.selection = match initial {
            None => GroupSelection::None,
            Some(group) if descriptor.allows_multiple_plots() => GroupSelection::Multiple(vec![group]),
            Some(group) => GroupSelection::Single(group),
        };
    }

    /// Drops selected groups that were unloaded and binds an empty selection
    /// to the first eligible group. Returns true if the selection changed.
    ///
    /// With no group loaded at all the selection is kept as is, so a restored
    /// layout keeps its bindings until its groups arrive.
    pub fn reconcile(&mut self, descriptor: &PanelDescriptor, groups: &GroupRegistry) -> bool {
        if groups.is_empty() {
            return false;
        }
        let before = self.selection.clone();
        match &mut self.selection {
            GroupSelection::None => {}
            GroupSelection::Single(group) => {
                if groups.get(group).is_none() {
                    self.selection = GroupSelection::None;
                }
            }
            GroupSelection::Multiple(list) => {
                list.retain(|g| groups.get(g).is_some());
                if list.is_empty() {
                    self.selection = GroupSelection::None;
                }
            }
        }
        if self.selection == GroupSelection::None {
            self.select_initial(descriptor, groups);
        }
        self.selection != before
    }

    // ===== Single-group selection =====

    /// Switches the panel to `group`, returning the freshly fetched data.
    ///
    /// Rejected, keeping the previous selection, when the provider has no
    /// data for `group`. In multi-group mode this replaces the first row.
    pub fn set_target_group(
        &mut self,
        descriptor: &PanelDescriptor,
        groups: &GroupRegistry,
        group: &str,
    ) -> Option<PanelData> {
        if matches!(self.selection, GroupSelection::Multiple(_)) {
            return self.replace_group(descriptor, groups, 0, group);
        }
        let Some(data) = descriptor.provide(groups, group) else {
            log::debug!("Group '{}' has no data for panel '{}'", group, self.title);
            return None;
        };
        self.selection = GroupSelection::Single(group.to_string());
        Some(data)
    }

    // ===== Multi-group selection =====

    /// Eligible groups not selected yet.
    pub fn add_candidates<'a>(
        &self,
        descriptor: &PanelDescriptor,
        groups: &'a GroupRegistry,
    ) -> Vec<&'a str> {
        let selected = self.selected_groups();
        Self::eligible_groups(descriptor, groups)
            .into_iter()
            .filter(|name| !selected.iter().any(|s| s == name))
            .collect()
    }

    /// Appends the first eligible group not selected yet.
    ///
    /// No-op when the panel is not in multi-group mode or the pool is
    /// exhausted. Returns the added group.
    pub fn add_next_group(
        &mut self,
        descriptor: &PanelDescriptor,
        groups: &GroupRegistry,
    ) -> Option<String> {
        if !matches!(self.selection, GroupSelection::Multiple(_)) {
            return None;
        }
        let Some(next) = self.add_candidates(descriptor, groups).first().map(|g| g.to_string()) else {
            log::debug!("No group left to add to panel '{}'", self.title);
            return None;
        };
        if let GroupSelection::Multiple(list) = &mut self.selection {
            list.push(next.clone());
        }
        Some(next)
    }

    pub fn can_remove_group(&self) -> bool {
        matches!(&self.selection, GroupSelection::Multiple(list) if list.len() > 1)
    }

    /// Removes the group at `index`; refused when it is the last one.
    pub fn remove_group(&mut self, index: usize) -> bool {
        let GroupSelection::Multiple(list) = &mut self.selection else {
            return false;
        };
        if list.len() <= 1 || index >= list.len() {
            log::debug!("Refusing to remove group {} from panel '{}'", index, self.title);
            return false;
        }
        list.remove(index);
        true
    }

    /// Replaces the group at `index`. Rejected when the provider has no data
    /// or `group` is already selected in another row.
    pub fn replace_group(
        &mut self,
        descriptor: &PanelDescriptor,
        groups: &GroupRegistry,
        index: usize,
        group: &str,
    ) -> Option<PanelData> {
        let GroupSelection::Multiple(list) = &mut self.selection else {
            return None;
        };
        if index >= list.len() {
            return None;
        }
        if list.iter().enumerate().any(|(i, g)| i != index && g == group) {
            log::debug!("Group '{}' already shown in panel '{}'", group, self.title);
            return None;
        }
        let data = descriptor.provide(groups, group)?;
        list[index] = group.to_string();
        Some(data)
    }

    // ===== Data =====

    /// One dataset per selected group, in selection order.
    pub fn fetch(&self, descriptor: &PanelDescriptor, groups: &GroupRegistry) -> Vec<(String, PanelData)> {
        self.selected_groups()
            .iter()
            .filter_map(|group| descriptor.provide(groups, group).map(|data| (group.clone(), data)))
            .collect()
    }

    /// Key that changes on every selection change; views remount their chart
    /// whenever it differs from the mounted one.
    pub fn chart_key(&self) -> String {
        format!("{}:{}", self.id, self.selected_groups().join("+"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panels::PanelKind;
    use crate::trace::TraceGroup;

    fn groups(names: &[&str]) -> GroupRegistry {
        let mut groups = GroupRegistry::new();
        for name in names {
            groups.insert(TraceGroup::new(*name));
        }
        groups
    }

    /// Accepts every group except "nodata".
    fn descriptor(multi: bool) -> PanelDescriptor {
        let descriptor = PanelDescriptor::new("Plot", PanelKind::CpuLoad).with_provider(|groups, name| {
            groups
                .get(name)
                .filter(|g| g.name != "nodata")
                .map(|_| PanelData::lines(vec![], "%", None))
        });
        if multi {
            descriptor.multiple_plots()
        } else {
            descriptor
        }
    }

    #[test]
    fn test_initial_group_prefers_active_then_first_eligible() {
        let mut registry = groups(&["nodata", "g2"]);
        let instance = PanelInstance::new(1, &descriptor(false), &registry);
        assert_eq!(instance.target_group(), Some("g2"));

        registry.set_active(1);
        let instance = PanelInstance::new(2, &descriptor(true), &registry);
        assert_eq!(instance.selection(), &GroupSelection::Multiple(vec!["g2".into()]));
    }

    #[test]
    fn test_set_target_group_rejects_group_without_data() {
        let registry = groups(&["g1", "nodata"]);
        let descriptor = descriptor(false);
        let mut instance = PanelInstance::new(1, &descriptor, &registry);

        assert!(instance.set_target_group(&descriptor, &registry, "nodata").is_none());
        assert_eq!(instance.target_group(), Some("g1"));
        assert!(instance.set_target_group(&descriptor, &registry, "missing").is_none());
        assert_eq!(instance.target_group(), Some("g1"));
    }

    #[test]
    fn test_add_next_group_until_exhausted() {
        let registry = groups(&["g1", "g2"]);
        let descriptor = descriptor(true);
        let mut instance = PanelInstance::new(1, &descriptor, &registry);

        assert_eq!(instance.add_next_group(&descriptor, &registry), Some("g2".to_string()));
        assert_eq!(instance.selected_groups(), &["g1".to_string(), "g2".to_string()]);
        assert_eq!(instance.add_next_group(&descriptor, &registry), None);
        assert_eq!(instance.selected_groups().len(), 2);
    }

    #[test]
    fn test_remove_refused_at_last_group() {
        let registry = groups(&["g1", "g2"]);
        let descriptor = descriptor(true);
        let mut instance = PanelInstance::new(1, &descriptor, &registry);
        assert!(!instance.can_remove_group());
        assert!(!instance.remove_group(0));

        instance.add_next_group(&descriptor, &registry);
        assert!(instance.remove_group(0));
        assert_eq!(instance.selected_groups(), &["g2".to_string()]);
        assert!(!instance.remove_group(0));
    }

    #[test]
    fn test_replace_group_keeps_rows_unique() {
        let registry = groups(&["g1", "g2", "g3"]);
        let descriptor = descriptor(true);
        let mut instance = PanelInstance::new(1, &descriptor, &registry);
        instance.add_next_group(&descriptor, &registry);

        assert!(instance.replace_group(&descriptor, &registry, 1, "g1").is_none());
        assert!(instance.replace_group(&descriptor, &registry, 1, "g3").is_some());
        assert_eq!(instance.add_candidates(&descriptor, &registry), vec!["g2"]);
    }

    #[test]
    fn test_chart_key_changes_with_selection() {
        let registry = groups(&["g1", "g2"]);
        let descriptor = descriptor(false);
        let mut instance = PanelInstance::new(7, &descriptor, &registry);
        let before = instance.chart_key();
        instance.set_target_group(&descriptor, &registry, "g2");
        assert_ne!(before, instance.chart_key());
        assert_eq!(instance.fetch(&descriptor, &registry).len(), 1);
    }

    #[test]
    fn test_reconcile_after_unload() {
        let mut registry = groups(&["g1", "g2"]);
        let descriptor = descriptor(false);
        let mut instance = PanelInstance::new(1, &descriptor, &registry);
        registry.remove("g1");
        assert!(instance.reconcile(&descriptor, &registry));
        assert_eq!(instance.target_group(), Some("g2"));
        assert!(!instance.reconcile(&descriptor, &registry));
    }

    #[test]
    fn test_reconcile_keeps_selection_while_nothing_is_loaded() {
        let descriptor = descriptor(true);
        let saved = GroupSelection::Multiple(vec!["g2".into(), "g1".into()]);
        let mut instance = PanelInstance::restore(1, "Plot", saved.clone());

        assert!(!instance.reconcile(&descriptor, &GroupRegistry::new()));
        assert_eq!(instance.selection(), &saved);

        assert!(!instance.reconcile(&descriptor, &groups(&["g1", "g2"])));
        assert_eq!(instance.selection(), &saved);
    }
}
