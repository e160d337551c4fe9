//! The simulation container.
//!
//! A [`Simulation`] owns the identity registry, the topology graph, the node
//! arena, the event queue and clock, the structured event log, and a private
//! random stream. Factory calls construct nodes, register them, link their
//! structural relatives, and enroll their loops; `run` drives every loop to
//! the horizon.
//!
//! Within one instance execution is single-threaded cooperative: node loops
//! only yield at their own suspension point, so all topology and port
//! mutations are atomic with respect to each other. Independent instances
//! share no mutable state and may run in parallel (see
//! [`sweep`](crate::sweep)).

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{SimError, SimResult};
use crate::eventlog::{EventKind, EventLog};
use crate::node::{Linkable, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
use crate::nodes::{
    AccessPointParams, AntennaPanel, Cell, CellParams, CentralisedUnit, DistributedUnit,
    PanelParams, RadioAccessPoint, RadioUnit, RadioUnitParams, RemoteRadioHead, RrhParams,
    UeParams, UserEquipment,
};
use crate::power::DuPowerParams;
use crate::registry::{IdentityRegistry, NodeHandle};
use crate::scheduler::{Clock, EventQueue};
use crate::topology::TopologyGraph;
use crate::types::{Guid, NodeClass, SimTime, SlotIndex, Xyz};

/// Horizon used when none is specified.
pub const DEFAULT_HORIZON: SimTime = 100.0;

/// Counters collected while a simulation runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimStats {
    /// Total node ticks executed
    pub ticks_executed: u64,
}

/// One simulation instance.
pub struct Simulation {
    registry: IdentityRegistry,
    topology: TopologyGraph,
    nodes: HashMap<Guid, Box<dyn SimNode>>,
    queue: EventQueue,
    clock: Clock,
    until: SimTime,
    seed: u64,
    rng: StdRng,
    log: EventLog,
    stats: SimStats,
}

impl Simulation {
    /// Creates a simulation with the given horizon and random seed.
    pub fn new(until: SimTime, seed: u64) -> Self {
        Self {
            registry: IdentityRegistry::new(),
            topology: TopologyGraph::new(),
            nodes: HashMap::new(),
            queue: EventQueue::new(),
            clock: Clock::default(),
            until,
            seed,
            rng: StdRng::seed_from_u64(seed),
            log: EventLog::new(),
            stats: SimStats::default(),
        }
    }

    /// Creates a simulation with no explicit horizon; warns and falls back
    /// to [`DEFAULT_HORIZON`].
    pub fn with_default_horizon(seed: u64) -> Self {
        tracing::warn!("no horizon specified, defaulting to {DEFAULT_HORIZON}");
        Self::new(DEFAULT_HORIZON, seed)
    }

    /// Current simulated time.
    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// The simulated-time horizon.
    pub fn until(&self) -> SimTime {
        self.until
    }

    /// The seed of this instance's random stream.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run counters.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// The structured event log.
    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    /// Read-only access to the topology graph.
    pub fn topology(&self) -> &TopologyGraph {
        &self.topology
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.registry.len()
    }

    // ------------------------------------------------------------------
    // Resolution and typed access
    // ------------------------------------------------------------------

    /// Resolves a GUID to its registry handle.
    pub fn handle(&self, guid: Guid) -> SimResult<&NodeHandle> {
        self.registry.resolve(guid)
    }

    /// Resolves a GUID to its node.
    pub fn node_dyn(&self, guid: Guid) -> SimResult<&dyn SimNode> {
        self.nodes
            .get(&guid)
            .map(|n| n.as_ref())
            .ok_or(SimError::UnknownGuid(guid))
    }

    /// Resolves a GUID to a concrete variant.
    pub fn node<T: SimNode + 'static>(&self, guid: Guid) -> SimResult<&T> {
        let node = self.nodes.get(&guid).ok_or(SimError::UnknownGuid(guid))?;
        node.as_any().downcast_ref::<T>().ok_or_else(|| {
            SimError::InvalidOperand(format!(
                "node {guid} is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Mutable variant of [`node`](Self::node).
    pub fn node_mut<T: SimNode + 'static>(&mut self, guid: Guid) -> SimResult<&mut T> {
        let node = self.nodes.get_mut(&guid).ok_or(SimError::UnknownGuid(guid))?;
        node.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
            SimError::InvalidOperand(format!(
                "node {guid} is not a {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Adjacency list of a node, in insertion order.
    pub fn neighbors(&self, guid: Guid) -> SimResult<Vec<Guid>> {
        let key = self.registry.resolve(guid)?.key();
        self.topology.neighbors(key).map(|n| n.to_vec())
    }

    /// Accumulated energy of a node, in joules.
    pub fn energy_of(&self, guid: Guid) -> SimResult<f64> {
        Ok(self.node_dyn(guid)?.core().energy().joules())
    }

    /// Instantaneous wattage of a node at its current load. `None` means no
    /// power model is configured — distinct from a genuine zero-watt model.
    pub fn power_of(&self, guid: Guid) -> SimResult<Option<f64>> {
        let core = self.node_dyn(guid)?.core();
        Ok(core.power_model().map(|m| m.evaluate(core.load())))
    }

    // ------------------------------------------------------------------
    // Registration plumbing
    // ------------------------------------------------------------------

    /// Inserts a constructed node into the arena and enrolls its loop.
    fn enroll(&mut self, node: Box<dyn SimNode>) -> Guid {
        let guid = node.guid();
        let now = self.clock.now();
        self.queue.enroll(guid, now);
        self.log.record(
            guid,
            now,
            EventKind::Registered,
            serde_json::json!({
                "class": node.class().as_str(),
                "label": node.core().label(),
            }),
        );
        self.nodes.insert(guid, node);
        guid
    }

    /// Links two registered nodes in the topology graph.
    pub fn link(&mut self, a: Guid, b: Guid) -> SimResult<()> {
        let ka = self.registry.resolve(a)?.key();
        let kb = self.registry.resolve(b)?.key();
        self.topology.link(ka, kb)?;
        self.log.record(
            a,
            self.clock.now(),
            EventKind::Linked,
            serde_json::json!({ "peer": b }),
        );
        Ok(())
    }

    /// Removes the edge between two registered nodes.
    pub fn unlink(&mut self, a: Guid, b: Guid) -> SimResult<()> {
        let ka = self.registry.resolve(a)?.key();
        let kb = self.registry.resolve(b)?.key();
        self.topology.unlink(ka, kb)?;
        self.log.record(
            a,
            self.clock.now(),
            EventKind::Unlinked,
            serde_json::json!({ "peer": b }),
        );
        Ok(())
    }

    /// Deregisters a node: removes its handle, its adjacency entry and all
    /// mirror edges, its queue entry, and frees any port slot it occupied.
    ///
    /// Deregistering an absent GUID is a no-op with a warning.
    pub fn deregister(&mut self, guid: Guid) {
        let Some(handle) = self.registry.deregister(guid) else {
            return;
        };
        let now = self.clock.now();
        let mut released: Option<(&'static str, Guid, SlotIndex)> = None;

        if let Some(node) = self.nodes.remove(&guid) {
            match handle.class {
                NodeClass::AntennaPanel => {
                    if let Some(panel) = node.as_any().downcast_ref::<AntennaPanel>() {
                        let (rrh, slot) = (panel.rrh(), panel.rf_slot());
                        if let Ok(head) = self.node_mut::<RemoteRadioHead>(rrh) {
                            head.rf_ports_mut().release(slot);
                            released = Some(("rf", rrh, slot));
                        }
                    }
                }
                NodeClass::DistributedUnit => {
                    if let Some(du) = node.as_any().downcast_ref::<DistributedUnit>() {
                        if let (Some(rrh), Some(slot)) = (du.rrh(), du.fronthaul_slot()) {
                            if let Ok(head) = self.node_mut::<RemoteRadioHead>(rrh) {
                                head.fronthaul_mut().pool_mut().release(slot);
                                released = Some(("fronthaul", rrh, slot));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some((pool, owner, slot)) = released {
            self.log.record(
                owner,
                now,
                EventKind::PortReleased,
                serde_json::json!({ "pool": pool, "slot": slot, "occupant": guid }),
            );
        }
        self.queue.remove(guid);
        self.topology.remove_node(handle.key());
        self.log.record(
            guid,
            now,
            EventKind::Deregistered,
            serde_json::json!({ "label": handle.label }),
        );
    }

    // ------------------------------------------------------------------
    // Factories
    // ------------------------------------------------------------------

    /// Makes a new cell and adds it to the simulation.
    pub fn make_cell(&mut self, params: CellParams) -> SimResult<Guid> {
        let handle = self.registry.register(NodeClass::Cell, None)?;
        self.topology.seed(handle.key());
        Ok(self.enroll(Box::new(Cell::new(handle, params))))
    }

    /// Makes a new radio access point inside the given cell.
    ///
    /// Unless placement at the cell centre is requested, the position is
    /// drawn inside the cell radius; the vertical coordinate is pinned to
    /// ground level either way.
    pub fn make_access_point(
        &mut self,
        cell: Guid,
        params: AccessPointParams,
    ) -> SimResult<Guid> {
        let (centre, radius) = {
            let cell = self.node::<Cell>(cell)?;
            (cell.xyz(), cell.radius_m())
        };
        let xyz = if params.at_cell_centre {
            centre.grounded()
        } else {
            Xyz::new(
                centre.x + radius * self.rng.gen_range(-1.0..=1.0),
                centre.y + radius * self.rng.gen_range(-1.0..=1.0),
                centre.z + radius * self.rng.gen_range(-1.0..=1.0),
            )
            .grounded()
        };

        let handle = self.registry.register(NodeClass::RadioAccessPoint, None)?;
        self.topology.seed(handle.key());
        let guid = self.enroll(Box::new(RadioAccessPoint::new(handle, cell, xyz, params)));
        self.link(guid, cell)?;
        Ok(guid)
    }

    /// Makes a new radio unit serving `cell` through `access_point`,
    /// optionally fronted by a distributed unit.
    pub fn make_radio_unit(
        &mut self,
        cell: Guid,
        access_point: Guid,
        du: Option<Guid>,
        params: RadioUnitParams,
    ) -> SimResult<Guid> {
        self.node::<Cell>(cell)?;
        self.node::<RadioAccessPoint>(access_point)?;
        if let Some(du) = du {
            self.node::<DistributedUnit>(du)?;
        }

        let handle = self.registry.register(NodeClass::RadioUnit, None)?;
        self.topology.seed(handle.key());
        let guid = self.enroll(Box::new(RadioUnit::new(
            handle,
            cell,
            access_point,
            du,
            params,
        )));
        self.link(guid, cell)?;
        self.link(guid, access_point)?;
        if let Some(du) = du {
            self.link(guid, du)?;
        }
        Ok(guid)
    }

    /// Makes a new remote radio head mounted at `access_point`. The served
    /// cell is derived from the access point's owner.
    pub fn make_rrh(
        &mut self,
        access_point: Guid,
        ru: Option<Guid>,
        du: Option<Guid>,
        params: RrhParams,
    ) -> SimResult<Guid> {
        let cell = self.node::<RadioAccessPoint>(access_point)?.cell();
        if let Some(ru) = ru {
            self.node::<RadioUnit>(ru)?;
        }
        if let Some(du) = du {
            self.node::<DistributedUnit>(du)?;
        }

        let handle = self.registry.register(NodeClass::RemoteRadioHead, None)?;
        self.topology.seed(handle.key());
        let guid = self.enroll(Box::new(RemoteRadioHead::new(
            handle,
            access_point,
            cell,
            ru,
            du,
            params,
        )));
        self.link(guid, access_point)?;
        self.link(guid, cell)?;
        if let Some(ru) = ru {
            self.link(guid, ru)?;
        }
        if let Some(du) = du {
            self.link(guid, du)?;
        }
        Ok(guid)
    }

    /// Makes a new distributed unit from its component power budget.
    pub fn make_distributed_unit(&mut self, params: DuPowerParams) -> SimResult<Guid> {
        let handle = self.registry.register(NodeClass::DistributedUnit, None)?;
        self.topology.seed(handle.key());
        Ok(self.enroll(Box::new(DistributedUnit::new(
            handle,
            params,
            DEFAULT_INTERVAL,
        ))))
    }

    /// Makes a new centralised unit, optionally coupled to a distributed
    /// unit whose `p_load` becomes this unit's load input.
    pub fn make_centralised_unit(&mut self, du: Option<Guid>) -> SimResult<Guid> {
        let du_info = match du {
            Some(du) => Some((du, self.node::<DistributedUnit>(du)?.p_load())),
            None => None,
        };
        let handle = self.registry.register(NodeClass::CentralisedUnit, None)?;
        self.topology.seed(handle.key());
        let guid = self.enroll(Box::new(CentralisedUnit::new(
            handle,
            du_info,
            DEFAULT_INTERVAL,
        )));
        if let Some((du, _)) = du_info {
            self.link(guid, du)?;
        }
        Ok(guid)
    }

    /// Makes a new antenna panel on the given remote radio head.
    ///
    /// The attach is all-or-nothing: if no RF port is free the call fails
    /// with [`SimError::PoolExhausted`] and the panel is not registered.
    pub fn make_antenna_panel(&mut self, rrh: Guid, params: PanelParams) -> SimResult<Guid> {
        {
            let head = self.node::<RemoteRadioHead>(rrh)?;
            if head.rf_ports().is_full() {
                return Err(head.rf_ports().exhausted());
            }
        }

        let handle = self.registry.register(NodeClass::AntennaPanel, None)?;
        self.topology.seed(handle.key());
        let slot = self
            .node_mut::<RemoteRadioHead>(rrh)?
            .rf_ports_mut()
            .allocate(handle.guid)?;
        let guid = self.enroll(Box::new(AntennaPanel::new(handle, rrh, slot, params)));
        self.link(guid, rrh)?;
        self.log.record(
            rrh,
            self.clock.now(),
            EventKind::PortAllocated,
            serde_json::json!({ "pool": "rf", "slot": slot, "occupant": guid }),
        );
        Ok(guid)
    }

    /// Makes a new user equipment.
    pub fn make_ue(&mut self, params: UeParams) -> SimResult<Guid> {
        let handle = self.registry.register(NodeClass::UserEquipment, None)?;
        self.topology.seed(handle.key());
        Ok(self.enroll(Box::new(UserEquipment::new(handle, params))))
    }

    // ------------------------------------------------------------------
    // Attachment operations
    // ------------------------------------------------------------------

    /// Requests attachment of a UE to a cell. The UE's loop reconciles the
    /// topology on its next tick.
    pub fn attach_ue(&mut self, ue: Guid, cell: Guid) -> SimResult<()> {
        self.node::<Cell>(cell)?;
        self.node_mut::<UserEquipment>(ue)?.set_serving_cell(cell);
        Ok(())
    }

    /// Attaches a distributed unit to a remote radio head, allocating one
    /// fronthaul port. All-or-nothing: exhaustion fails the call before any
    /// link is recorded.
    pub fn attach_du_to_rrh(&mut self, du: Guid, rrh: Guid) -> SimResult<SlotIndex> {
        self.node::<DistributedUnit>(du)?;
        let slot = self
            .node_mut::<RemoteRadioHead>(rrh)?
            .fronthaul_mut()
            .pool_mut()
            .allocate(du)?;
        self.node_mut::<RemoteRadioHead>(rrh)?.set_du(du);
        self.node_mut::<DistributedUnit>(du)?
            .set_rrh_attachment(rrh, slot);
        self.link(du, rrh)?;
        self.log.record(
            rrh,
            self.clock.now(),
            EventKind::PortAllocated,
            serde_json::json!({ "pool": "fronthaul", "slot": slot, "occupant": du }),
        );
        Ok(slot)
    }

    /// Couples a centralised unit to a distributed unit, adopting the DU's
    /// `p_load` as the CU's load input.
    pub fn attach_cu_to_du(&mut self, cu: Guid, du: Guid) -> SimResult<()> {
        let p_load = self.node::<DistributedUnit>(du)?.p_load();
        self.node_mut::<CentralisedUnit>(cu)?.set_du(du, p_load);
        self.link(cu, du)
    }

    // ------------------------------------------------------------------
    // The dispatch loop
    // ------------------------------------------------------------------

    /// Runs every node loop up to the configured horizon.
    pub fn run(&mut self) -> SimResult<()> {
        let horizon = self.until;
        self.run_until(horizon)
    }

    /// Runs every node loop up to `horizon`. Ticks fire strictly before the
    /// horizon; coinciding wakes resume in registration order.
    pub fn run_until(&mut self, horizon: SimTime) -> SimResult<()> {
        while self.step_before(horizon)? {}
        self.clock.advance_to(horizon);
        Ok(())
    }

    /// Executes the single next tick before `horizon`, if one is pending.
    /// Returns false once no tick remains.
    pub fn step_before(&mut self, horizon: SimTime) -> SimResult<bool> {
        let Some((wake, guid)) = self.queue.next_before(horizon) else {
            return Ok(false);
        };
        self.clock.advance_to(wake);

        // The node is taken out of the arena for the duration of its tick,
        // so the handler can mutate the topology it is itself part of.
        let Some(mut node) = self.nodes.remove(&guid) else {
            return Ok(true);
        };
        let result = {
            let mut ctx = TickContext {
                now: wake,
                topology: &mut self.topology,
                log: &mut self.log,
                rng: &mut self.rng,
            };
            node.on_tick(&mut ctx)
        };
        let interval = node.interval();
        self.nodes.insert(guid, node);
        self.stats.ticks_executed += 1;
        result?;
        self.queue.schedule(guid, wake + interval);
        Ok(true)
    }

    /// Stops all node loops immediately. Energy accrued up to the last
    /// completed tick is retained.
    pub fn cancel(&mut self) {
        self.queue.clear();
    }

    // ------------------------------------------------------------------
    // Read-outs
    // ------------------------------------------------------------------

    /// Total accumulated energy across all nodes, in joules.
    ///
    /// Summed in GUID order so the floating-point result is reproducible.
    pub fn total_joules(&self) -> f64 {
        self.registry
            .handles()
            .filter_map(|h| self.nodes.get(&h.guid))
            .map(|n| n.core().energy().joules())
            .sum()
    }

    /// Accumulated energy per node class, in joules.
    pub fn joules_by_class(&self, class: NodeClass) -> f64 {
        self.registry
            .handles_of_class(class)
            .filter_map(|h| self.nodes.get(&h.guid))
            .map(|n| n.core().energy().joules())
            .sum()
    }

    /// Exports the topology for external loggers.
    pub fn topology_snapshot(&self) -> serde_json::Value {
        self.topology.snapshot()
    }

    /// Exports run statistics and per-class energy totals.
    pub fn export_stats(&self) -> serde_json::Value {
        let mut classes = serde_json::Map::new();
        for class in NodeClass::ALL {
            let count = self.registry.handles_of_class(class).count();
            if count == 0 {
                continue;
            }
            classes.insert(
                class.as_str().to_string(),
                serde_json::json!({
                    "count": count,
                    "joules": self.joules_by_class(class),
                }),
            );
        }

        serde_json::json!({
            "simulation": {
                "now": self.clock.now(),
                "until": self.until,
                "seed": self.seed,
                "nodes": self.registry.len(),
                "edges": self.topology.edge_count(),
                "ticks_executed": self.stats.ticks_executed,
                "events_logged": self.log.len(),
            },
            "classes": classes,
        })
    }
}
