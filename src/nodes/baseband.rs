//! Baseband processing units: distributed (DU) and centralised (CU).
//!
//! The DU's constant wattage composes from its component budget; the
//! fraction of rated supply it draws (`p_load`) feeds the CU's
//! load-dependent model, the two loads being complementary.

use std::any::Any;

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::power::{cu_watts, DuPowerParams, PowerModel};
use crate::registry::NodeHandle;
use crate::types::{Guid, NodeClass, SimTime, SlotIndex};

/// A distributed unit.
pub struct DistributedUnit {
    core: NodeCore,
    params: DuPowerParams,
    p_load: f64,
    rrh: Option<Guid>,
    fronthaul_slot: Option<SlotIndex>,
}

impl DistributedUnit {
    pub(crate) fn new(handle: NodeHandle, params: DuPowerParams, interval: SimTime) -> Self {
        let mut core = NodeCore::new(
            handle,
            if interval > 0.0 { interval } else { DEFAULT_INTERVAL },
        );
        let p_load = params.p_load();
        core.set_power_model(PowerModel::constant(params.total_watts()));
        core.set_load(p_load);
        Self {
            core,
            params,
            p_load,
            rrh: None,
            fronthaul_slot: None,
        }
    }

    /// The component budget this unit was built from.
    pub fn params(&self) -> &DuPowerParams {
        &self.params
    }

    /// Fraction of rated supply drawn; the CU's load input.
    pub fn p_load(&self) -> f64 {
        self.p_load
    }

    /// GUID of the remote radio head this unit fronts, if attached.
    pub fn rrh(&self) -> Option<Guid> {
        self.rrh
    }

    /// The fronthaul port slot occupied on the attached head, if any.
    pub fn fronthaul_slot(&self) -> Option<SlotIndex> {
        self.fronthaul_slot
    }

    pub(crate) fn set_rrh_attachment(&mut self, rrh: Guid, slot: SlotIndex) {
        self.rrh = Some(rrh);
        self.fronthaul_slot = Some(slot);
    }
}

impl Linkable for DistributedUnit {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::DistributedUnit
    }
}

impl Schedulable for DistributedUnit {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for DistributedUnit {
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

/// A centralised unit.
///
/// Its wattage is `(1 − du_load) × P_cu_max`: the more processing the
/// attached DU offloads, the less the CU performs. Without an attached DU
/// the load input is zero and the unit draws its rated maximum.
pub struct CentralisedUnit {
    core: NodeCore,
    du: Option<Guid>,
}

impl CentralisedUnit {
    pub(crate) fn new(handle: NodeHandle, du: Option<(Guid, f64)>, interval: SimTime) -> Self {
        let mut core = NodeCore::new(
            handle,
            if interval > 0.0 { interval } else { DEFAULT_INTERVAL },
        );
        core.set_power_model(PowerModel::from_fn(cu_watts));
        let (du_guid, du_load) = match du {
            Some((guid, load)) => (Some(guid), load),
            None => (None, 0.0),
        };
        core.set_load(du_load);
        Self { core, du: du_guid }
    }

    /// GUID of the attached distributed unit, if any.
    pub fn du(&self) -> Option<Guid> {
        self.du
    }

    /// The DU load currently driving this unit's model.
    pub fn du_load(&self) -> f64 {
        self.core.load()
    }

    pub(crate) fn set_du(&mut self, du: Guid, du_load: f64) {
        self.du = Some(du);
        self.core.set_load(du_load);
    }
}

impl Linkable for CentralisedUnit {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::CentralisedUnit
    }
}

impl Schedulable for CentralisedUnit {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for CentralisedUnit {
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
    use crate::power::P_CU_MAX_WATTS;
    use crate::registry::IdentityRegistry;

    const EPS: f64 = 1e-9;

    fn handles() -> IdentityRegistry {
        IdentityRegistry::new()
    }

    #[test]
    fn test_du_power_composition() {
        let mut registry = handles();
        let handle = registry.register(NodeClass::DistributedUnit, None).unwrap();
        let du = DistributedUnit::new(handle, DuPowerParams::default(), 1.0);

        assert!((du.core().watts().unwrap() - 624.0).abs() < EPS);
        assert!((du.p_load() - 624.0 / 2100.0).abs() < EPS);
    }

    #[test]
    fn test_cu_tracks_du_load() {
        let mut registry = handles();
        let handle = registry.register(NodeClass::CentralisedUnit, None).unwrap();
        let cu = CentralisedUnit::new(handle, Some((0, 0.4)), 1.0);

        assert!((cu.core().watts().unwrap() - 393.75).abs() < EPS);
        assert_eq!(cu.du(), Some(0));
    }

    #[test]
    fn test_cu_without_du_draws_rated_maximum() {
        let mut registry = handles();
        let handle = registry.register(NodeClass::CentralisedUnit, None).unwrap();
        let cu = CentralisedUnit::new(handle, None, 1.0);

        assert!((cu.core().watts().unwrap() - P_CU_MAX_WATTS).abs() < EPS);
        assert!(cu.du().is_none());
    }

    #[test]
    fn test_late_du_attach_updates_load() {
        let mut registry = handles();
        let handle = registry.register(NodeClass::CentralisedUnit, None).unwrap();
        let mut cu = CentralisedUnit::new(handle, None, 1.0);

        cu.set_du(5, 0.5);
        assert!((cu.core().watts().unwrap() - 0.5 * P_CU_MAX_WATTS).abs() < EPS);
        assert_eq!(cu.du_load(), 0.5);
    }
}
