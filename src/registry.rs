//! Identity registry: GUID issuance and node handle lookup.
//!
//! The registry owns a single monotonic counter scoped to one simulation
//! instance, so GUIDs are unique within an instance and parallel sweeps
//! never share counter state. It also keeps the per-class sequence counters
//! used for display labels (`Cell[0]`, `RadioUnit[3]`, ...).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::topology::NodeKey;
use crate::types::{Guid, NodeClass};

/// Identity metadata for one registered node.
#[derive(Clone, Debug, Serialize)]
pub struct NodeHandle {
    /// Unique identifier, immutable after registration
    pub guid: Guid,
    /// Class tag, immutable after registration
    pub class: NodeClass,
    /// Per-class monotonic index, for display and debugging
    pub seq_index: u32,
    /// Display label, e.g. `RemoteRadioHead[1]`
    pub label: String,
}

impl NodeHandle {
    /// Returns the `(class, guid)` key this handle addresses in the topology.
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.class, self.guid)
    }
}

/// Registry of every node registered in one simulation instance.
///
/// Handles are stored in GUID order so registry iteration (and everything
/// exported from it) is deterministic.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    next_guid: Guid,
    handles: BTreeMap<Guid, NodeHandle>,
    class_counters: BTreeMap<NodeClass, u32>,
}

impl IdentityRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node of the given class and returns its handle.
    ///
    /// `current_guid` is the GUID the node already holds, if any; passing
    /// `Some` fails with [`SimError::DuplicateRegistration`] to prevent
    /// double-bookkeeping.
    pub fn register(
        &mut self,
        class: NodeClass,
        current_guid: Option<Guid>,
    ) -> SimResult<NodeHandle> {
        if let Some(guid) = current_guid {
            return Err(SimError::DuplicateRegistration(guid));
        }

        let guid = self.next_guid;
        self.next_guid += 1;

        let seq = self.class_counters.entry(class).or_insert(0);
        let seq_index = *seq;
        *seq += 1;

        let handle = NodeHandle {
            guid,
            class,
            seq_index,
            label: format!("{}[{}]", class.as_str(), seq_index),
        };
        tracing::debug!(guid, label = %handle.label, "registered");
        self.handles.insert(guid, handle.clone());
        Ok(handle)
    }

    /// Resolves a GUID to its handle.
    ///
    /// Fails with [`SimError::UnknownGuid`] if absent — callers must treat
    /// this as fatal, never silently ignore it.
    pub fn resolve(&self, guid: Guid) -> SimResult<&NodeHandle> {
        self.handles.get(&guid).ok_or(SimError::UnknownGuid(guid))
    }

    /// Removes a GUID from the registry, returning its handle.
    ///
    /// Deregistering an absent GUID is a no-op with a warning.
    pub fn deregister(&mut self, guid: Guid) -> Option<NodeHandle> {
        let removed = self.handles.remove(&guid);
        if removed.is_none() {
            tracing::warn!(guid, "deregister: GUID not present in registry");
        }
        removed
    }

    /// Returns true if the GUID is currently registered.
    pub fn contains(&self, guid: Guid) -> bool {
        self.handles.contains_key(&guid)
    }

    /// Number of currently registered nodes.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if no nodes are registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Iterates over handles in GUID order.
    pub fn handles(&self) -> impl Iterator<Item = &NodeHandle> {
        self.handles.values()
    }

    /// Iterates over the handles of one class, in GUID order.
    pub fn handles_of_class(&self, class: NodeClass) -> impl Iterator<Item = &NodeHandle> {
        self.handles.values().filter(move |h| h.class == class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guids_are_unique_and_monotonic() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register(NodeClass::Cell, None).unwrap();
        let b = registry.register(NodeClass::Cell, None).unwrap();
        let c = registry.register(NodeClass::UserEquipment, None).unwrap();

        assert!(a.guid < b.guid && b.guid < c.guid);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_per_class_sequence_counters() {
        let mut registry = IdentityRegistry::new();
        let c0 = registry.register(NodeClass::Cell, None).unwrap();
        let u0 = registry.register(NodeClass::UserEquipment, None).unwrap();
        let c1 = registry.register(NodeClass::Cell, None).unwrap();

        assert_eq!(c0.seq_index, 0);
        assert_eq!(c1.seq_index, 1);
        assert_eq!(u0.seq_index, 0);
        assert_eq!(c1.label, "Cell[1]");
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::RadioUnit, None).unwrap();

        let err = registry
            .register(NodeClass::RadioUnit, Some(handle.guid))
            .unwrap_err();
        assert!(matches!(err, SimError::DuplicateRegistration(g) if g == handle.guid));
    }

    #[test]
    fn test_resolve_unknown_guid() {
        let registry = IdentityRegistry::new();
        assert!(matches!(registry.resolve(99), Err(SimError::UnknownGuid(99))));
    }

    #[test]
    fn test_deregister_removes_handle() {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::Cell, None).unwrap();

        assert!(registry.deregister(handle.guid).is_some());
        assert!(!registry.contains(handle.guid));
        // Second deregister is a no-op with a warning.
        assert!(registry.deregister(handle.guid).is_none());
    }

    #[test]
    fn test_counters_not_reused_after_deregistration() {
        let mut registry = IdentityRegistry::new();
        let a = registry.register(NodeClass::Cell, None).unwrap();
        registry.deregister(a.guid);
        let b = registry.register(NodeClass::Cell, None).unwrap();

        assert!(b.guid > a.guid);
        assert_eq!(b.seq_index, 1);
    }
}
