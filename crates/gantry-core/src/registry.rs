//! Name-keyed service registry.

use std::collections::BTreeMap;

use crate::config::DuplicateNamePolicy;
use crate::handle::ServiceHandle;

/// What [`ServiceRegistry::insert`] did with the incoming handle.
#[derive(Debug)]
pub enum InsertOutcome {
    /// The name was free; the handle is registered.
    Inserted,
    /// `ReplaceExisting`: the displaced handle is handed back for
    /// teardown.
    Replaced(ServiceHandle),
    /// `KeepExisting`: the incoming handle is handed back, rejected.
    Rejected(ServiceHandle),
}

/// Registry of live handles, ordered by name.
///
/// Ordering is part of the contract: listings and bulk lifecycle sweeps
/// walk services in name order.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceHandle>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its own name, applying `policy` when the
    /// name is already taken.
    pub fn insert(&mut self, handle: ServiceHandle, policy: DuplicateNamePolicy) -> InsertOutcome {
        let name = handle.name().to_string();
        if !self.services.contains_key(&name) {
            self.services.insert(name, handle);
            return InsertOutcome::Inserted;
        }
        match policy {
            DuplicateNamePolicy::ReplaceExisting => match self.services.insert(name, handle) {
                Some(displaced) => InsertOutcome::Replaced(displaced),
                None => InsertOutcome::Inserted,
            },
            DuplicateNamePolicy::KeepExisting => InsertOutcome::Rejected(handle),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ServiceHandle> {
        self.services.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ServiceHandle> {
        self.services.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ServiceHandle> {
        self.services.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered names, in order.
    pub fn names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Handles in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceHandle> {
        self.services.values()
    }

    /// Mutable handles in name order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ServiceHandle> {
        self.services.values_mut()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Removes every handle, returning them in name order.
    pub fn clear(&mut self) -> Vec<ServiceHandle> {
        let drained = std::mem::take(&mut self.services);
        drained.into_values().collect()
    }
}
