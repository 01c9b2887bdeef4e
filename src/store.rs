//! Resource Store
//!
//! Authoritative in-memory state for one client: resource groups keyed by
//! name, resources keyed by id, and a group -> resource id index used for
//! cascading deletes and group listings.
//!
//! All state sits behind a single lock. Every method takes the lock once and
//! releases it before returning, so no partial write is observable and no
//! caller can hold the lock across a simulated delay.

use crate::error::{Error, Result};
use crate::models::{GenericResource, ResourceGroup};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

#[derive(Debug)]
struct StoredResource {
    group: String,
    resource: GenericResource,
}

#[derive(Debug, Default)]
struct StoreState {
    groups: IndexMap<String, ResourceGroup>,
    resources: IndexMap<String, StoredResource>,
    members: IndexMap<String, IndexSet<String>>,
}

/// In-memory resource store
#[derive(Debug, Default)]
pub struct ResourceStore {
    state: RwLock<StoreState>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Resource groups
    // =========================================================================

    /// Insert or replace a resource group, keeping its resources
    pub fn put_group(&self, group: ResourceGroup) {
        let mut state = self.state.write();
        state.members.entry(group.name.clone()).or_default();
        state.groups.insert(group.name.clone(), group);
    }

    pub fn get_group(&self, name: &str) -> Option<ResourceGroup> {
        self.state.read().groups.get(name).cloned()
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.state.read().groups.contains_key(name)
    }

    /// Remove a group and every resource created in it
    pub fn delete_group(&self, name: &str) -> Option<(ResourceGroup, Vec<GenericResource>)> {
        let mut state = self.state.write();
        let group = state.groups.shift_remove(name)?;
        let member_ids = state.members.shift_remove(name).unwrap_or_default();

        let removed = member_ids
            .iter()
            .filter_map(|id| state.resources.shift_remove(id))
            .map(|stored| stored.resource)
            .collect();

        Some((group, removed))
    }

    /// Snapshot of all groups in insertion order
    pub fn list_groups(&self) -> Vec<ResourceGroup> {
        self.state.read().groups.values().cloned().collect()
    }

    // =========================================================================
    // Resources
    // =========================================================================

    /// Insert or replace a resource belonging to `group`
    pub fn put_resource(&self, group: &str, resource: GenericResource) -> Result<()> {
        let id = resource.id.clone();
        self.upsert_resource(group, &id, move |_| resource).map(|_| ())
    }

    /// Build and store a resource from its previous version, atomically
    ///
    /// Fails with `NotFound` when `group` does not exist.
    pub fn upsert_resource<F>(&self, group: &str, id: &str, build: F) -> Result<GenericResource>
    where
        F: FnOnce(Option<&GenericResource>) -> GenericResource,
    {
        let mut state = self.state.write();
        if !state.groups.contains_key(group) {
            return Err(Error::NotFound(format!(
                "Resource group '{}' not found",
                group
            )));
        }

        let resource = build(state.resources.get(id).map(|s| &s.resource));
        debug_assert_eq!(resource.id, id);

        // A replaced resource may have been filed under another group name
        if let Some(previous) = state.resources.get(id).map(|s| s.group.clone()) {
            if previous != group {
                if let Some(ids) = state.members.get_mut(&previous) {
                    ids.shift_remove(id);
                }
            }
        }
        state
            .members
            .entry(group.to_string())
            .or_default()
            .insert(id.to_string());
        state.resources.insert(
            id.to_string(),
            StoredResource {
                group: group.to_string(),
                resource: resource.clone(),
            },
        );

        Ok(resource)
    }

    pub fn get_resource(&self, id: &str) -> Option<GenericResource> {
        self.state.read().resources.get(id).map(|s| s.resource.clone())
    }

    pub fn contains_resource(&self, id: &str) -> bool {
        self.state.read().resources.contains_key(id)
    }

    /// Mutate a resource in place, returning the closure's output
    pub fn update_resource<R>(&self, id: &str, f: impl FnOnce(&mut GenericResource) -> R) -> Option<R> {
        let mut state = self.state.write();
        state.resources.get_mut(id).map(|s| f(&mut s.resource))
    }

    pub fn delete_resource(&self, id: &str) -> Option<GenericResource> {
        let mut state = self.state.write();
        let stored = state.resources.shift_remove(id)?;
        if let Some(ids) = state.members.get_mut(&stored.group) {
            ids.shift_remove(id);
        }
        Some(stored.resource)
    }

    /// Snapshot of resources matching `predicate`, in insertion order
    pub fn list_resources(&self, predicate: impl Fn(&GenericResource) -> bool) -> Vec<GenericResource> {
        self.state
            .read()
            .resources
            .values()
            .map(|s| &s.resource)
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Snapshot of the resources created in `group`
    pub fn list_group_resources(&self, group: &str) -> Vec<GenericResource> {
        let state = self.state.read();
        let Some(ids) = state.members.get(group) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| state.resources.get(id))
            .map(|s| s.resource.clone())
            .collect()
    }

    pub fn group_count(&self) -> usize {
        self.state.read().groups.len()
    }

    pub fn resource_count(&self) -> usize {
        self.state.read().resources.len()
    }

    /// Drop all state
    pub fn clear(&self) {
        let mut state = self.state.write();
        *state = StoreState::default();
    }
}
