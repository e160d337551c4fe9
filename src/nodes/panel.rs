//! Antenna panel: a passive element occupying one RF port of a remote
//! radio head.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::registry::NodeHandle;
use crate::types::{Guid, NodeClass, SimTime, SlotIndex, Xyz};

/// Construction parameters for an antenna panel.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelParams {
    /// Panel position, in metres.
    pub xyz: Xyz,
    /// Boresight azimuth, in degrees.
    pub azimuth_deg: f64,
    /// Boresight elevation, in degrees.
    pub elevation_deg: f64,
    /// Number of antenna elements.
    pub n_elements: u32,
    /// Whether the panel supports beamforming.
    pub beamforming: bool,
    /// Tick period, in seconds.
    pub interval: SimTime,
}

impl Default for PanelParams {
    fn default() -> Self {
        Self {
            xyz: Xyz::default(),
            azimuth_deg: 0.0,
            elevation_deg: 0.0,
            n_elements: 64,
            beamforming: false,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// An antenna panel. Structurally passive: its tick is a pure no-op wait,
/// preserving the uniform scheduling contract.
pub struct AntennaPanel {
    core: NodeCore,
    rrh: Guid,
    rf_slot: SlotIndex,
    xyz: Xyz,
    azimuth_deg: f64,
    elevation_deg: f64,
    n_elements: u32,
    beamforming: bool,
}

impl AntennaPanel {
    pub(crate) fn new(
        handle: NodeHandle,
        rrh: Guid,
        rf_slot: SlotIndex,
        params: PanelParams,
    ) -> Self {
        Self {
            core: NodeCore::new(handle, params.interval),
            rrh,
            rf_slot,
            xyz: params.xyz,
            azimuth_deg: params.azimuth_deg,
            elevation_deg: params.elevation_deg,
            n_elements: params.n_elements,
            beamforming: params.beamforming,
        }
    }

    /// GUID of the owning remote radio head.
    pub fn rrh(&self) -> Guid {
        self.rrh
    }

    /// Index of the RF port this panel occupies.
    pub fn rf_slot(&self) -> SlotIndex {
        self.rf_slot
    }

    pub fn xyz(&self) -> Xyz {
        self.xyz
    }

    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth_deg
    }

    pub fn elevation_deg(&self) -> f64 {
        self.elevation_deg
    }

    pub fn n_elements(&self) -> u32 {
        self.n_elements
    }

    pub fn beamforming(&self) -> bool {
        self.beamforming
    }
}

impl Linkable for AntennaPanel {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::AntennaPanel
    }
}

impl Schedulable for AntennaPanel {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, _ctx: &mut TickContext<'_>) -> SimResult<()> {
        Ok(())
    }
}

impl SimNode for AntennaPanel {
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
    fn test_panel_defaults() {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::AntennaPanel, None).unwrap();
        let panel = AntennaPanel::new(handle, 7, 1, PanelParams::default());

        assert_eq!(panel.rrh(), 7);
        assert_eq!(panel.rf_slot(), 1);
        assert_eq!(panel.n_elements(), 64);
        assert!(!panel.beamforming());
    }
}
