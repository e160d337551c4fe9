//! Radio access point: a site placed inside its owning cell.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::registry::NodeHandle;
use crate::types::{Guid, NodeClass, SimTime, Xyz};

/// Construction parameters for a radio access point.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPointParams {
    /// Place the access point at the cell centre instead of a random
    /// position inside the cell radius.
    pub at_cell_centre: bool,
    /// Tick period, in seconds.
    pub interval: SimTime,
}

impl Default for AccessPointParams {
    fn default() -> Self {
        Self {
            at_cell_centre: true,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// A radio access point. Always owned by a cell; the factory computes its
/// placement and pins the vertical coordinate to ground level.
pub struct RadioAccessPoint {
    core: NodeCore,
    cell: Guid,
    xyz: Xyz,
    at_cell_centre: bool,
}

impl RadioAccessPoint {
    pub(crate) fn new(handle: NodeHandle, cell: Guid, xyz: Xyz, params: AccessPointParams) -> Self {
        Self {
            core: NodeCore::new(handle, params.interval),
            cell,
            xyz,
            at_cell_centre: params.at_cell_centre,
        }
    }

    /// GUID of the owning cell.
    pub fn cell(&self) -> Guid {
        self.cell
    }

    /// Ground-level position inside the owning cell.
    pub fn xyz(&self) -> Xyz {
        self.xyz
    }

    /// True if placement was requested at the cell centre.
    pub fn at_cell_centre(&self) -> bool {
        self.at_cell_centre
    }
}

impl Linkable for RadioAccessPoint {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::RadioAccessPoint
    }
}

impl Schedulable for RadioAccessPoint {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for RadioAccessPoint {
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
