//! Topology graph: class-partitioned, symmetric adjacency.
//!
//! The graph records "has-a"/"is-linked-to" relations between registered
//! nodes. Adjacency is keyed by `(class, guid)` and every edge is stored in
//! both directions — one direction without the other is a corrupt state.
//! Neighbor lists keep insertion order; the order carries no meaning beyond
//! display but must be stable for reproducible logs.

use std::collections::{BTreeMap, HashMap};

use crate::error::{SimError, SimResult};
use crate::types::{Guid, NodeClass};

/// The `(class, guid)` address of a node in the topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub class: NodeClass,
    pub guid: Guid,
}

impl NodeKey {
    /// Creates a new key.
    pub fn new(class: NodeClass, guid: Guid) -> Self {
        Self { class, guid }
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.class, self.guid)
    }
}

/// Undirected, class-partitioned adjacency structure.
///
/// Mutated only through [`link`](TopologyGraph::link) and
/// [`unlink`](TopologyGraph::unlink); node code never edits adjacency lists
/// directly.
#[derive(Debug, Default)]
pub struct TopologyGraph {
    adjacency: HashMap<NodeClass, BTreeMap<Guid, Vec<Guid>>>,
}

impl TopologyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an empty adjacency entry for a newly registered node.
    ///
    /// Performed as a side effect of registration; linking requires both
    /// endpoints to have been seeded.
    pub fn seed(&mut self, key: NodeKey) {
        self.adjacency
            .entry(key.class)
            .or_default()
            .entry(key.guid)
            .or_default();
    }

    /// Returns true if the key has a seeded adjacency entry.
    pub fn contains(&self, key: NodeKey) -> bool {
        self.adjacency
            .get(&key.class)
            .is_some_and(|m| m.contains_key(&key.guid))
    }

    fn list(&self, key: NodeKey) -> SimResult<&Vec<Guid>> {
        self.adjacency
            .get(&key.class)
            .and_then(|m| m.get(&key.guid))
            .ok_or_else(|| SimError::InvalidOperand(format!("{key} is not in the topology")))
    }

    fn list_mut(&mut self, key: NodeKey) -> SimResult<&mut Vec<Guid>> {
        self.adjacency
            .get_mut(&key.class)
            .and_then(|m| m.get_mut(&key.guid))
            .ok_or_else(|| SimError::InvalidOperand(format!("{key} is not in the topology")))
    }

    /// Links two nodes, recording the edge in both adjacency lists.
    ///
    /// Re-linking an existing edge logs a notice and performs no mutation
    /// (idempotent). Fails with [`SimError::InvalidOperand`] if either
    /// endpoint has no seeded entry.
    pub fn link(&mut self, a: NodeKey, b: NodeKey) -> SimResult<()> {
        // Validate both endpoints before touching either list, so a failed
        // call never leaves a one-directional edge behind.
        self.list(a)?;
        self.list(b)?;

        let a_list = self.list_mut(a)?;
        if a_list.contains(&b.guid) {
            tracing::debug!(%a, %b, "link: edge already present, no-op");
        } else {
            a_list.push(b.guid);
        }

        let b_list = self.list_mut(b)?;
        if b_list.contains(&a.guid) {
            tracing::debug!(%b, %a, "link: edge already present, no-op");
        } else {
            b_list.push(a.guid);
        }
        Ok(())
    }

    /// Removes the edge between two nodes, in both directions.
    ///
    /// Removing a non-existent edge on either side logs a notice and is
    /// otherwise a no-op. Fails with [`SimError::InvalidOperand`] if either
    /// endpoint has no seeded entry.
    pub fn unlink(&mut self, a: NodeKey, b: NodeKey) -> SimResult<()> {
        self.list(a)?;
        self.list(b)?;

        let a_list = self.list_mut(a)?;
        if let Some(pos) = a_list.iter().position(|&g| g == b.guid) {
            a_list.remove(pos);
        } else {
            tracing::debug!(%a, %b, "unlink: edge not present, no-op");
        }

        let b_list = self.list_mut(b)?;
        if let Some(pos) = b_list.iter().position(|&g| g == a.guid) {
            b_list.remove(pos);
        } else {
            tracing::debug!(%b, %a, "unlink: edge not present, no-op");
        }
        Ok(())
    }

    /// Returns the adjacency list of a node, in insertion order.
    pub fn neighbors(&self, key: NodeKey) -> SimResult<&[Guid]> {
        self.list(key).map(|v| v.as_slice())
    }

    /// Removes a node's entry and strips its GUID from every other list.
    ///
    /// Used on deregistration so no stale mirror edges remain.
    pub fn remove_node(&mut self, key: NodeKey) {
        let removed = self
            .adjacency
            .get_mut(&key.class)
            .and_then(|m| m.remove(&key.guid));
        if removed.is_none() {
            tracing::warn!(%key, "remove_node: no adjacency entry");
        }
        for lists in self.adjacency.values_mut() {
            for list in lists.values_mut() {
                list.retain(|&g| g != key.guid);
            }
        }
    }

    /// Number of seeded nodes in one class partition.
    pub fn class_count(&self, class: NodeClass) -> usize {
        self.adjacency.get(&class).map_or(0, |m| m.len())
    }

    /// Total number of seeded nodes.
    pub fn node_count(&self) -> usize {
        self.adjacency.values().map(|m| m.len()).sum()
    }

    /// Total number of undirected edges.
    pub fn edge_count(&self) -> usize {
        let directed: usize = self
            .adjacency
            .values()
            .flat_map(|m| m.values())
            .map(|v| v.len())
            .sum();
        directed / 2
    }

    /// Exports the full adjacency structure for external loggers.
    ///
    /// Classes appear in [`NodeClass::ALL`] order and GUIDs in ascending
    /// order, so the snapshot is reproducible across runs.
    pub fn snapshot(&self) -> serde_json::Value {
        let mut classes = serde_json::Map::new();
        for class in NodeClass::ALL {
            if let Some(entries) = self.adjacency.get(&class) {
                let mut by_guid = serde_json::Map::new();
                for (guid, links) in entries {
                    by_guid.insert(guid.to_string(), serde_json::json!(links));
                }
                classes.insert(class.as_str().to_string(), by_guid.into());
            }
        }
        classes.into()
    }

    /// Checks the symmetry invariant over the whole graph.
    ///
    /// Returns the first asymmetric pair found, or `None` if the graph is
    /// consistent. Intended for tests and debug assertions.
    pub fn find_asymmetry(&self) -> Option<(Guid, Guid)> {
        let mut owner_of: HashMap<Guid, &Vec<Guid>> = HashMap::new();
        for entries in self.adjacency.values() {
            for (guid, links) in entries {
                owner_of.insert(*guid, links);
            }
        }
        for (guid, links) in &owner_of {
            for other in *links {
                match owner_of.get(other) {
                    Some(back) if back.contains(guid) => {}
                    _ => return Some((*guid, *other)),
                }
            }
        }
        None
    }
}
