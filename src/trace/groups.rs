//! Registry of loaded trace groups.

use crate::trace::TraceGroup;

/// Ordered set of loaded groups plus the active one.
///
/// This is the sole owner of group data; panels only read from it. Every
/// mutation bumps [`GroupRegistry::revision`] so views can tell that data
/// they derived earlier is stale.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: Vec<TraceGroup>,
    active: Option<usize>,
    revision: u64,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a group, replacing one with the same name in place.
    ///
    /// The first group loaded into an empty registry becomes active.
    /// Returns the group's index.
    pub fn insert(&mut self, group: TraceGroup) -> usize {
        self.revision += 1;
        if let Some(index) = self.index_of(&group.name) {
            log::info!("Replacing group '{}'", group.name);
            self.groups[index] = group;
            return index;
        }
        log::info!("Adding group '{}'", group.name);
        self.groups.push(group);
        let index = self.groups.len() - 1;
        if self.active.is_none() {
            self.active = Some(index);
        }
        index
    }

    /// Removes a group by name. The active index follows the remaining groups.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(index) = self.index_of(name) else {
            return false;
        };
        self.groups.remove(index);
        self.revision += 1;
        self.active = match self.active {
            _ if self.groups.is_empty() => None,
            Some(active) if active > index => Some(active - 1),
            Some(active) if active == index => Some(index.min(self.groups.len() - 1)),
            other => other,
        };
        true
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.active = None;
        self.revision += 1;
    }

    pub fn list_group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&TraceGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_group(&self) -> Option<&str> {
        self.active.map(|i| self.groups[i].name.as_str())
    }

    /// Makes the group at `index` active. Returns false if out of range.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.groups.len() {
            return false;
        }
        if self.active != Some(index) {
            self.active = Some(index);
            self.revision += 1;
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraceGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
