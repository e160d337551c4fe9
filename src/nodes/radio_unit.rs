//! Radio unit: serves a cell through an access point, optionally fronted by
//! a distributed unit.

use std::any::Any;

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::power::{PowerModel, TransceiverPower};
use crate::registry::NodeHandle;
use crate::types::{Guid, NodeClass, SimTime};

/// Construction parameters for a radio unit.
#[derive(Debug, Default)]
pub struct RadioUnitParams {
    /// Tick period, in seconds. Zero falls back to the default.
    pub interval: SimTime,
    /// Optional transceiver power budget, frozen into a constant model.
    pub transceiver: Option<TransceiverPower>,
}

impl RadioUnitParams {
    fn interval_or_default(&self) -> SimTime {
        if self.interval > 0.0 {
            self.interval
        } else {
            DEFAULT_INTERVAL
        }
    }
}

/// A radio unit.
pub struct RadioUnit {
    core: NodeCore,
    cell: Guid,
    access_point: Guid,
    du: Option<Guid>,
}

impl RadioUnit {
    pub(crate) fn new(
        handle: NodeHandle,
        cell: Guid,
        access_point: Guid,
        du: Option<Guid>,
        params: RadioUnitParams,
    ) -> Self {
        let mut core = NodeCore::new(handle, params.interval_or_default());
        if let Some(tx) = params.transceiver {
            core.set_power_model(PowerModel::constant(tx.total_watts()));
        }
        Self {
            core,
            cell,
            access_point,
            du,
        }
    }

    /// GUID of the served cell.
    pub fn cell(&self) -> Guid {
        self.cell
    }

    /// GUID of the fronting access point.
    pub fn access_point(&self) -> Guid {
        self.access_point
    }

    /// GUID of the attached distributed unit, if any.
    pub fn du(&self) -> Option<Guid> {
        self.du
    }
}

impl Linkable for RadioUnit {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::RadioUnit
    }
}

impl Schedulable for RadioUnit {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for RadioUnit {
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
