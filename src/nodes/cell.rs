//! Radio cell: a coverage area with a site position and radius.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::power::PowerModel;
use crate::registry::NodeHandle;
use crate::types::{Guid, NodeClass, SimTime, Xyz};

/// Construction parameters for a cell.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CellParams {
    /// Site position of the cell, in metres.
    pub xyz: Xyz,
    /// Coverage radius, in metres.
    pub radius_m: f64,
    /// Tick period, in seconds.
    pub interval: SimTime,
}

impl Default for CellParams {
    fn default() -> Self {
        Self {
            xyz: Xyz::default(),
            radius_m: 500.0,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// A radio cell.
pub struct Cell {
    core: NodeCore,
    xyz: Xyz,
    radius_m: f64,
}

impl Cell {
    pub(crate) fn new(handle: NodeHandle, params: CellParams) -> Self {
        Self {
            core: NodeCore::new(handle, params.interval),
            xyz: params.xyz,
            radius_m: params.radius_m,
        }
    }

    /// Site position.
    pub fn xyz(&self) -> Xyz {
        self.xyz
    }

    /// Moves the site. Node positions are scenario inputs, not simulated
    /// state, so this carries no topology side effects.
    pub fn set_xyz(&mut self, xyz: Xyz) {
        self.xyz = xyz;
    }

    /// Coverage radius, in metres.
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Installs a power model on this cell.
    pub fn set_power_model(&mut self, model: PowerModel) {
        self.core.set_power_model(model);
    }
}

impl Linkable for Cell {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::Cell
    }
}

impl Schedulable for Cell {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for Cell {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IdentityRegistry;

    #[test]
    fn test_cell_defaults() {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::Cell, None).unwrap();
        let cell = Cell::new(handle, CellParams::default());

        assert_eq!(cell.class(), NodeClass::Cell);
        assert_eq!(cell.radius_m(), 500.0);
        assert_eq!(cell.interval(), DEFAULT_INTERVAL);
        assert_eq!(cell.xyz(), Xyz::default());
    }

    #[test]
    fn test_set_xyz() {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::Cell, None).unwrap();
        let mut cell = Cell::new(handle, CellParams::default());

        cell.set_xyz(Xyz::new(500.0, 500.0, 20.0));
        assert_eq!(cell.xyz(), Xyz::new(500.0, 500.0, 20.0));
    }
}
