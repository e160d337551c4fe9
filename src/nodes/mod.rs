//! Infrastructure node variants.
//!
//! One module per variant. Construction always goes through the factories
//! on [`Simulation`](crate::sim::Simulation), which register the node,
//! seed its adjacency entry, link its structural relatives, and enroll its
//! loop in the event queue.

pub mod access_point;
pub mod baseband;
pub mod cell;
pub mod panel;
pub mod radio_unit;
pub mod rrh;
pub mod ue;

pub use access_point::{AccessPointParams, RadioAccessPoint};
pub use baseband::{CentralisedUnit, DistributedUnit};
pub use cell::{Cell, CellParams};
pub use panel::{AntennaPanel, PanelParams};
pub use radio_unit::{RadioUnit, RadioUnitParams};
pub use rrh::{RemoteRadioHead, RrhParams};
pub use ue::{TrafficProfile, UserEquipment, UeParams};
