//! Remote radio head: the radio chassis owning RF and fronthaul port pools.
//!
//! RF ports are where antenna panels connect; fronthaul ports are where a
//! distributed unit connects.

use std::any::Any;

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::ports::{FronthaulPorts, PortPool};
use crate::registry::NodeHandle;
use crate::types::{Guid, NodeClass, SimTime};

/// Default number of RF ports when none (or zero) is requested.
pub const DEFAULT_RF_PORTS: usize = 2;

/// Rated maximum RF output per port, in watts. Bookkeeping only.
pub const RF_OUTPUT_MAX_WATTS: f64 = 20.0;

/// Construction parameters for a remote radio head.
#[derive(Debug)]
pub struct RrhParams {
    /// Number of RF ports. Zero falls back to [`DEFAULT_RF_PORTS`] with a
    /// notice.
    pub n_rf_ports: usize,
    /// Fronthaul interface description.
    pub fronthaul: FronthaulPorts,
    /// Tick period, in seconds. Zero falls back to the default.
    pub interval: SimTime,
}

impl Default for RrhParams {
    fn default() -> Self {
        Self {
            n_rf_ports: DEFAULT_RF_PORTS,
            fronthaul: FronthaulPorts::default(),
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// A remote radio head.
pub struct RemoteRadioHead {
    core: NodeCore,
    access_point: Guid,
    cell: Guid,
    ru: Option<Guid>,
    du: Option<Guid>,
    rf_ports: PortPool,
    fronthaul: FronthaulPorts,
}

impl RemoteRadioHead {
    pub(crate) fn new(
        handle: NodeHandle,
        access_point: Guid,
        cell: Guid,
        ru: Option<Guid>,
        du: Option<Guid>,
        params: RrhParams,
    ) -> Self {
        let n_rf_ports = if params.n_rf_ports > 0 {
            params.n_rf_ports
        } else {
            tracing::warn!(
                label = %handle.label,
                "zero RF ports requested, falling back to {DEFAULT_RF_PORTS}"
            );
            DEFAULT_RF_PORTS
        };
        let interval = if params.interval > 0.0 {
            params.interval
        } else {
            DEFAULT_INTERVAL
        };
        Self {
            core: NodeCore::new(handle, interval),
            access_point,
            cell,
            ru,
            du,
            rf_ports: PortPool::new("rf", n_rf_ports),
            fronthaul: params.fronthaul,
        }
    }

    /// GUID of the access point this head is mounted at.
    pub fn access_point(&self) -> Guid {
        self.access_point
    }

    /// GUID of the cell served through the access point.
    pub fn cell(&self) -> Guid {
        self.cell
    }

    /// GUID of the attached radio unit, if any.
    pub fn ru(&self) -> Option<Guid> {
        self.ru
    }

    /// GUID of the attached distributed unit, if any.
    pub fn du(&self) -> Option<Guid> {
        self.du
    }

    pub(crate) fn set_du(&mut self, du: Guid) {
        self.du = Some(du);
    }

    /// The RF (antenna) port pool.
    pub fn rf_ports(&self) -> &PortPool {
        &self.rf_ports
    }

    pub(crate) fn rf_ports_mut(&mut self) -> &mut PortPool {
        &mut self.rf_ports
    }

    /// The fronthaul interface.
    pub fn fronthaul(&self) -> &FronthaulPorts {
        &self.fronthaul
    }

    pub(crate) fn fronthaul_mut(&mut self) -> &mut FronthaulPorts {
        &mut self.fronthaul
    }
}

impl Linkable for RemoteRadioHead {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::RemoteRadioHead
    }
}

impl Schedulable for RemoteRadioHead {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for RemoteRadioHead {
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

    fn rrh(params: RrhParams) -> RemoteRadioHead {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::RemoteRadioHead, None).unwrap();
        RemoteRadioHead::new(handle, 1, 0, None, None, params)
    }

    #[test]
    fn test_zero_rf_ports_falls_back_to_default() {
        let head = rrh(RrhParams {
            n_rf_ports: 0,
            ..Default::default()
        });
        assert_eq!(head.rf_ports().capacity(), DEFAULT_RF_PORTS);
    }

    #[test]
    fn test_pools_are_independent() {
        let mut head = rrh(RrhParams {
            n_rf_ports: 1,
            ..Default::default()
        });
        head.rf_ports_mut().allocate(42).unwrap();

        assert!(head.rf_ports().is_full());
        assert!(head.fronthaul().pool().has_free());
    }
}
