//! Node capability contracts and shared per-node state.
//!
//! Every infrastructure variant composes two orthogonal contracts instead of
//! inheriting from a concrete base: [`Linkable`] (an identity the topology
//! graph can address) and [`Schedulable`] (a tick handler driven by the
//! event queue). [`SimNode`] ties both together for storage in the
//! simulation's node arena.

use std::any::Any;

use rand::rngs::StdRng;

use crate::error::SimResult;
use crate::eventlog::EventLog;
use crate::power::{EnergyAccumulator, PowerModel};
use crate::registry::NodeHandle;
use crate::topology::{NodeKey, TopologyGraph};
use crate::types::{Guid, NodeClass, SimTime};

/// Default tick period, in seconds, for variants that do not fix their own.
pub const DEFAULT_INTERVAL: SimTime = 1.0;

/// Everything a tick handler may touch.
///
/// Within one simulation instance execution is single-threaded cooperative:
/// only one node runs at a time, so all topology and port mutations made
/// through this context are atomic with respect to other nodes.
pub struct TickContext<'a> {
    /// Current simulated time.
    pub now: SimTime,
    /// The simulation's topology graph.
    pub topology: &'a mut TopologyGraph,
    /// The structured event log.
    pub log: &'a mut EventLog,
    /// The simulation's private random stream.
    pub rng: &'a mut StdRng,
}

/// A node the topology graph can address: it has a GUID and a class tag.
pub trait Linkable {
    fn guid(&self) -> Guid;
    fn class(&self) -> NodeClass;

    /// The `(class, guid)` topology key.
    fn key(&self) -> NodeKey {
        NodeKey::new(self.class(), self.guid())
    }
}

/// A node the event queue can drive.
///
/// The contract is a perpetual loop: `do_tick(); suspend for interval` until
/// the simulation horizon. Nodes with no behavior of their own use a pure
/// no-op tick, preserving the uniform scheduling contract.
pub trait Schedulable {
    /// Tick period, in seconds. Must be positive.
    fn interval(&self) -> SimTime;

    /// Node-specific update, invoked once per tick.
    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()>;
}

/// An arena-storable simulation node.
pub trait SimNode: Linkable + Schedulable + Send {
    fn core(&self) -> &NodeCore;
    fn core_mut(&mut self) -> &mut NodeCore;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// State shared by every node variant.
#[derive(Debug)]
pub struct NodeCore {
    guid: Guid,
    class: NodeClass,
    seq_index: u32,
    label: String,
    interval: SimTime,
    load: f64,
    power_model: Option<PowerModel>,
    energy: EnergyAccumulator,
}

impl NodeCore {
    /// Builds the shared state from a registry handle.
    ///
    /// A non-positive interval falls back to [`DEFAULT_INTERVAL`] with a
    /// warning; a zero interval would pin the event queue to one instant.
    pub fn new(handle: NodeHandle, interval: SimTime) -> Self {
        let interval = if interval > 0.0 {
            interval
        } else {
            tracing::warn!(
                label = %handle.label,
                interval,
                "non-positive interval, falling back to {DEFAULT_INTERVAL}"
            );
            DEFAULT_INTERVAL
        };
        Self {
            guid: handle.guid,
            class: handle.class,
            seq_index: handle.seq_index,
            label: handle.label,
            interval,
            load: 0.0,
            power_model: None,
            energy: EnergyAccumulator::default(),
        }
    }

    pub fn guid(&self) -> Guid {
        self.guid
    }

    pub fn class(&self) -> NodeClass {
        self.class
    }

    /// Per-class monotonic index, for display and debugging.
    pub fn seq_index(&self) -> u32 {
        self.seq_index
    }

    /// Display label, e.g. `UserEquipment[4]`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.class, self.guid)
    }

    pub fn interval(&self) -> SimTime {
        self.interval
    }

    /// The node's internal load, fed to load-dependent power models.
    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn set_load(&mut self, load: f64) {
        self.load = load;
    }

    /// Returns the configured power model.
    ///
    /// A node with none configured returns `None` and logs a notice —
    /// callers must treat this distinctly from a genuine zero-watt model.
    pub fn power_model(&self) -> Option<&PowerModel> {
        if self.power_model.is_none() {
            tracing::debug!(label = %self.label, "no power model configured");
        }
        self.power_model.as_ref()
    }

    pub fn set_power_model(&mut self, model: PowerModel) {
        tracing::debug!(label = %self.label, model = ?model, "power model set");
        self.power_model = Some(model);
    }

    /// Instantaneous wattage at the current load, if a model is configured.
    pub fn watts(&self) -> Option<f64> {
        self.power_model.as_ref().map(|m| m.evaluate(self.load))
    }

    /// Energy accrued so far.
    pub fn energy(&self) -> &EnergyAccumulator {
        &self.energy
    }

    /// Adds one tick's worth of energy at the current load.
    ///
    /// Quiet when no model is configured; the missing-model notice belongs
    /// to the public [`power_model`](Self::power_model) accessor, not to the
    /// per-tick path.
    pub fn accrue_energy(&mut self) {
        if let Some(model) = &self.power_model {
            self.energy.accrue(model.evaluate(self.load), self.interval);
        }
    }
}
