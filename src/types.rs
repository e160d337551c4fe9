//! Core type definitions for the simulation core.
//!
//! This module defines the fundamental types used throughout the crate.

use serde::{Deserialize, Serialize};

/// Simulated time in seconds.
///
/// All node intervals and wake times share the same representation,
/// giving a unified timeline across every node loop in a simulation.
pub type SimTime = f64;

/// Unique identifier for a registered node.
///
/// Issued monotonically by the [`IdentityRegistry`](crate::registry::IdentityRegistry)
/// and scoped to one simulation instance. The GUID is the sole key into the
/// registry and the topology graph.
pub type Guid = u64;

/// Index of a slot within a fixed-capacity port pool.
pub type SlotIndex = usize;

/// The infrastructure class of a node.
///
/// The topology graph is partitioned by this tag, so adjacency lookups are
/// always `(class, guid)` pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeClass {
    /// A radio cell (coverage area with a site position and radius)
    Cell,
    /// A radio access point placed inside a cell
    RadioAccessPoint,
    /// A radio unit serving a cell through an access point
    RadioUnit,
    /// A remote radio head with RF and fronthaul port pools
    RemoteRadioHead,
    /// A distributed unit (baseband processing close to the radio)
    DistributedUnit,
    /// A centralised unit (baseband processing in the core)
    CentralisedUnit,
    /// An antenna panel attached to a remote radio head RF port
    AntennaPanel,
    /// A user equipment with mutable cell attachment
    UserEquipment,
}

impl NodeClass {
    /// All node classes, in the order used for snapshots and summaries.
    pub const ALL: [NodeClass; 8] = [
        NodeClass::Cell,
        NodeClass::RadioAccessPoint,
        NodeClass::RadioUnit,
        NodeClass::RemoteRadioHead,
        NodeClass::DistributedUnit,
        NodeClass::CentralisedUnit,
        NodeClass::AntennaPanel,
        NodeClass::UserEquipment,
    ];

    /// Returns the stable string tag for this class.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeClass::Cell => "Cell",
            NodeClass::RadioAccessPoint => "RadioAccessPoint",
            NodeClass::RadioUnit => "RadioUnit",
            NodeClass::RemoteRadioHead => "RemoteRadioHead",
            NodeClass::DistributedUnit => "DistributedUnit",
            NodeClass::CentralisedUnit => "CentralisedUnit",
            NodeClass::AntennaPanel => "AntennaPanel",
            NodeClass::UserEquipment => "UserEquipment",
        }
    }
}

impl std::fmt::Display for NodeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A position in 3-space, in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    /// Creates a new position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Xyz) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Returns the same position with the vertical coordinate pinned to
    /// ground level.
    pub fn grounded(self) -> Self {
        Self { z: 0.0, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tags_are_unique() {
        let mut tags: Vec<&str> = NodeClass::ALL.iter().map(|c| c.as_str()).collect();
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), NodeClass::ALL.len());
    }

    #[test]
    fn test_display_matches_tag() {
        assert_eq!(NodeClass::RemoteRadioHead.to_string(), "RemoteRadioHead");
    }

    #[test]
    fn test_xyz_distance() {
        let a = Xyz::new(0.0, 3.0, 0.0);
        let b = Xyz::new(4.0, 0.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_xyz_grounded() {
        let p = Xyz::new(1.0, 2.0, 25.0).grounded();
        assert_eq!(p.z, 0.0);
        assert_eq!(p.x, 1.0);
    }
}
