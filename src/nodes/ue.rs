//! User equipment: the one node class whose topology links mutate over
//! simulated time.
//!
//! Which cell serves a UE is decided outside this core (nearest cell,
//! strongest signal — the policy is irrelevant here); the UE only consumes
//! the resulting cell reference. Each tick it reconciles its attachment
//! state and the topology graph with that decision.

use std::any::Any;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::power::PowerModel;
use crate::registry::NodeHandle;
use crate::topology::{NodeKey, TopologyGraph};
use crate::types::{Guid, NodeClass, SimTime, Xyz};

/// External serving-cell decision: given the current time and a read-only
/// view of the topology, returns the cell this UE should attach to, or
/// `None` to leave the attachment unchanged.
pub type ServingCellDecision = Box<dyn FnMut(SimTime, &TopologyGraph) -> Option<Guid> + Send>;

/// Optional per-tick callback, invoked before the attachment update.
pub type TickCallback = Box<dyn FnMut(&mut UserEquipment) + Send>;

/// Traffic profile of a user, one per 5G service class. Demand is sampled
/// uniformly from the profile's `[min, max]` range, in bits per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficProfile {
    Embb,
    Video,
    VirtualReality,
    Urllc,
    Industrial,
    Automotive,
    Mmtc,
    Sensor,
}

impl TrafficProfile {
    /// `(min, max)` demand in bits per second.
    pub fn demand_range_bps(self) -> (f64, f64) {
        match self {
            TrafficProfile::Embb => (100e3, 1e9),
            TrafficProfile::Video => (100e3, 10e6),
            TrafficProfile::VirtualReality => (10e6, 1e9),
            TrafficProfile::Urllc => (100.0, 100e3),
            TrafficProfile::Industrial => (100.0, 10e3),
            TrafficProfile::Automotive => (10e3, 100e3),
            TrafficProfile::Mmtc => (10.0, 100.0),
            TrafficProfile::Sensor => (10.0, 100.0),
        }
    }

    /// Typical demand in bits per second.
    pub fn average_bps(self) -> f64 {
        match self {
            TrafficProfile::Embb => 500e3,
            TrafficProfile::Video => 500e3,
            TrafficProfile::VirtualReality => 500e6,
            TrafficProfile::Urllc => 50e3,
            TrafficProfile::Industrial => 500.0,
            TrafficProfile::Automotive => 50e3,
            TrafficProfile::Mmtc => 50.0,
            TrafficProfile::Sensor => 50.0,
        }
    }

    /// Samples one demand value from this profile's range.
    pub fn sample_bps(self, rng: &mut StdRng) -> f64 {
        let (min, max) = self.demand_range_bps();
        rng.gen_range(min..=max)
    }
}

/// Attachment state of a user equipment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    Unattached,
    Attached(Guid),
}

/// Construction parameters for a user equipment.
#[derive(Debug)]
pub struct UeParams {
    /// Position, in metres.
    pub xyz: Xyz,
    /// Reporting interval (the tick period), in seconds.
    pub interval: SimTime,
    /// Traffic profile driving per-tick demand sampling, if any.
    pub traffic: Option<TrafficProfile>,
    /// Optional device power model.
    pub power_model: Option<PowerModel>,
}

impl Default for UeParams {
    fn default() -> Self {
        Self {
            xyz: Xyz::default(),
            interval: DEFAULT_INTERVAL,
            traffic: None,
            power_model: None,
        }
    }
}

/// A user equipment.
pub struct UserEquipment {
    core: NodeCore,
    xyz: Xyz,
    /// The cell the external decision wants this UE on.
    serving_cell: Option<Guid>,
    current_cell: Option<Guid>,
    last_cell: Option<Guid>,
    decision: Option<ServingCellDecision>,
    callback: Option<TickCallback>,
    traffic: Option<TrafficProfile>,
    demand_bps: f64,
}

impl std::fmt::Debug for UserEquipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserEquipment")
            .field("core", &self.core)
            .field("xyz", &self.xyz)
            .field("serving_cell", &self.serving_cell)
            .field("current_cell", &self.current_cell)
            .field("last_cell", &self.last_cell)
            .field("decision", &self.decision.as_ref().map(|_| "<fn>"))
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .field("traffic", &self.traffic)
            .field("demand_bps", &self.demand_bps)
            .finish()
    }
}

impl UserEquipment {
    pub(crate) fn new(handle: NodeHandle, params: UeParams) -> Self {
        let mut core = NodeCore::new(handle, params.interval);
        if let Some(model) = params.power_model {
            core.set_power_model(model);
        }
        Self {
            core,
            xyz: params.xyz,
            serving_cell: None,
            current_cell: None,
            last_cell: None,
            decision: None,
            callback: None,
            traffic: params.traffic,
            demand_bps: 0.0,
        }
    }

    pub fn xyz(&self) -> Xyz {
        self.xyz
    }

    pub fn set_xyz(&mut self, xyz: Xyz) {
        self.xyz = xyz;
    }

    /// Cell GUID the UE is currently attached to in the topology.
    pub fn current_cell(&self) -> Option<Guid> {
        self.current_cell
    }

    /// Cell GUID the UE was attached to before the last re-attachment.
    pub fn last_cell(&self) -> Option<Guid> {
        self.last_cell
    }

    /// Derived attachment state.
    pub fn attachment(&self) -> Attachment {
        match self.current_cell {
            Some(guid) => Attachment::Attached(guid),
            None => Attachment::Unattached,
        }
    }

    /// Latest sampled traffic demand, in bits per second.
    pub fn demand_bps(&self) -> f64 {
        self.demand_bps
    }

    /// The configured traffic profile, if any.
    pub fn traffic(&self) -> Option<TrafficProfile> {
        self.traffic
    }

    /// Requests attachment to a cell. The topology is reconciled on the
    /// next tick, not immediately.
    pub fn set_serving_cell(&mut self, cell: Guid) {
        self.serving_cell = Some(cell);
    }

    /// Installs the external serving-cell decision.
    pub fn set_decision(&mut self, decision: ServingCellDecision) {
        self.decision = Some(decision);
    }

    /// Installs the optional per-tick callback.
    pub fn set_callback(&mut self, callback: TickCallback) {
        self.callback = Some(callback);
    }

    /// Shifts the attachment GUIDs if the serving decision changed.
    /// Returns true when a re-attachment happened.
    fn update_cell_guid(&mut self) -> bool {
        if self.serving_cell == self.current_cell {
            return false;
        }
        self.last_cell = self.current_cell;
        self.current_cell = self.serving_cell;
        true
    }

    /// Reconciles the topology with the attachment state: the UE↔cell
    /// adjacency always reflects `current_cell`, never `last_cell`.
    fn update_topology(&self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        let ue_key = self.key();
        if let Some(last) = self.last_cell {
            ctx.topology
                .unlink(ue_key, NodeKey::new(NodeClass::Cell, last))?;
        }
        if let Some(current) = self.current_cell {
            ctx.topology
                .link(ue_key, NodeKey::new(NodeClass::Cell, current))?;
        }
        ctx.log.record(
            self.guid(),
            ctx.now,
            crate::eventlog::EventKind::Reattached,
            serde_json::json!({
                "from": self.last_cell,
                "to": self.current_cell,
            }),
        );
        Ok(())
    }
}

impl Linkable for UserEquipment {
    fn guid(&self) -> Guid {
        self.core.guid()
    }

    fn class(&self) -> NodeClass {
        NodeClass::UserEquipment
    }
}

impl Schedulable for UserEquipment {
    fn interval(&self) -> SimTime {
        self.core.interval()
    }

    fn on_tick(&mut self, ctx: &mut TickContext<'_>) -> SimResult<()> {
        // External callback first; it may request a new serving cell.
        if let Some(mut callback) = self.callback.take() {
            callback(self);
            self.callback = Some(callback);
        }

        // Serving-cell decision from the external pathloss collaborator.
        if let Some(mut decide) = self.decision.take() {
            if let Some(cell) = decide(ctx.now, ctx.topology) {
                self.serving_cell = Some(cell);
            }
            self.decision = Some(decide);
        }

        if self.update_cell_guid() {
            self.update_topology(ctx)?;
        }

        if let Some(profile) = self.traffic {
            self.demand_bps = profile.sample_bps(ctx.rng);
        }

        self.core.accrue_energy();
        Ok(())
    }
}

impl SimNode for UserEquipment {
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
    use crate::eventlog::EventLog;
    use crate::registry::IdentityRegistry;
    use rand::SeedableRng;

    fn ue_with_topology() -> (UserEquipment, TopologyGraph, NodeKey, NodeKey) {
        let mut registry = IdentityRegistry::new();
        let cell_x = registry.register(NodeClass::Cell, None).unwrap();
        let cell_y = registry.register(NodeClass::Cell, None).unwrap();
        let ue_handle = registry.register(NodeClass::UserEquipment, None).unwrap();

        let mut topology = TopologyGraph::new();
        let x_key = cell_x.key();
        let y_key = cell_y.key();
        topology.seed(x_key);
        topology.seed(y_key);
        topology.seed(ue_handle.key());

        (
            UserEquipment::new(ue_handle, UeParams::default()),
            topology,
            x_key,
            y_key,
        )
    }

    fn tick(
        ue: &mut UserEquipment,
        topology: &mut TopologyGraph,
        log: &mut EventLog,
        rng: &mut StdRng,
        now: SimTime,
    ) {
        let mut ctx = TickContext {
            now,
            topology,
            log,
            rng,
        };
        ue.on_tick(&mut ctx).unwrap();
    }

    #[test]
    fn test_reattachment_updates_topology_exactly_once() {
        let (mut ue, mut topology, x, y) = ue_with_topology();
        let mut log = EventLog::new();
        let mut rng = StdRng::seed_from_u64(0);
        let ue_key = ue.key();

        ue.set_serving_cell(x.guid);
        tick(&mut ue, &mut topology, &mut log, &mut rng, 0.0);
        assert!(topology.neighbors(x).unwrap().contains(&ue_key.guid));

        ue.set_serving_cell(y.guid);
        tick(&mut ue, &mut topology, &mut log, &mut rng, 1.0);

        assert!(!topology.neighbors(x).unwrap().contains(&ue_key.guid));
        assert!(topology.neighbors(y).unwrap().contains(&ue_key.guid));
        assert_eq!(ue.last_cell(), Some(x.guid));
        assert_eq!(ue.current_cell(), Some(y.guid));
        assert!(topology.find_asymmetry().is_none());
    }

    #[test]
    fn test_stable_attachment_does_not_touch_topology() {
        let (mut ue, mut topology, x, _y) = ue_with_topology();
        let mut log = EventLog::new();
        let mut rng = StdRng::seed_from_u64(0);

        ue.set_serving_cell(x.guid);
        tick(&mut ue, &mut topology, &mut log, &mut rng, 0.0);
        let reattachments = log.of_kind(crate::eventlog::EventKind::Reattached).count();

        // Same serving cell: no further re-attachment is recorded.
        tick(&mut ue, &mut topology, &mut log, &mut rng, 1.0);
        assert_eq!(
            log.of_kind(crate::eventlog::EventKind::Reattached).count(),
            reattachments
        );
        assert_eq!(ue.attachment(), Attachment::Attached(x.guid));
    }

    #[test]
    fn test_decision_drives_attachment() {
        let (mut ue, mut topology, x, _y) = ue_with_topology();
        let mut log = EventLog::new();
        let mut rng = StdRng::seed_from_u64(0);
        let target = x.guid;

        ue.set_decision(Box::new(move |_, _| Some(target)));
        tick(&mut ue, &mut topology, &mut log, &mut rng, 0.0);
        assert_eq!(ue.current_cell(), Some(target));
    }

    #[test]
    fn test_callback_runs_before_attachment_update() {
        let (mut ue, mut topology, x, _y) = ue_with_topology();
        let mut log = EventLog::new();
        let mut rng = StdRng::seed_from_u64(0);
        let target = x.guid;

        ue.set_callback(Box::new(move |ue| ue.set_serving_cell(target)));
        tick(&mut ue, &mut topology, &mut log, &mut rng, 0.0);
        assert_eq!(ue.current_cell(), Some(target));
    }

    #[test]
    fn test_demand_sampling_stays_in_range() {
        let mut registry = IdentityRegistry::new();
        let handle = registry.register(NodeClass::UserEquipment, None).unwrap();
        let mut ue = UserEquipment::new(
            handle,
            UeParams {
                traffic: Some(TrafficProfile::Video),
                ..Default::default()
            },
        );
        let mut topology = TopologyGraph::new();
        topology.seed(ue.key());
        let mut log = EventLog::new();
        let mut rng = StdRng::seed_from_u64(7);

        let (min, max) = TrafficProfile::Video.demand_range_bps();
        for t in 0..50 {
            tick(&mut ue, &mut topology, &mut log, &mut rng, t as f64);
            assert!(ue.demand_bps() >= min && ue.demand_bps() <= max);
        }
    }

    #[test]
    fn test_profile_ranges_bracket_their_average() {
        for profile in [
            TrafficProfile::Embb,
            TrafficProfile::Video,
            TrafficProfile::VirtualReality,
            TrafficProfile::Urllc,
            TrafficProfile::Industrial,
            TrafficProfile::Automotive,
            TrafficProfile::Mmtc,
            TrafficProfile::Sensor,
        ] {
            let (min, max) = profile.demand_range_bps();
            let avg = profile.average_bps();
            assert!(min <= avg && avg <= max, "{profile:?}");
        }
    }
}
