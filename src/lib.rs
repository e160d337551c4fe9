//! # oransim
//!
//! A graph-driven simulation core for radio-access-network infrastructure:
//! cells, access points, radio units, remote radio heads, baseband units,
//! antenna panels, and user equipment, modeled as a live mutable graph and
//! driven by a cooperative interval-based event loop that tracks attachment
//! state and accrues energy.
//!
//! ## Design Principles
//!
//! - **Graph as source of truth**: every node registers into a
//!   class-partitioned topology graph whose link symmetry is an invariant,
//!   not a convention.
//! - **One identity space**: a single monotonic counter per simulation
//!   instance issues GUIDs; registry, topology, and port pools all key on
//!   them.
//! - **Cooperative loops**: node loops are entries in a wake-time priority
//!   queue, tie-broken by registration order, so runs are deterministic and
//!   reproducible given the same seed.
//! - **Composable power**: a node's wattage is a constant or a pure
//!   function of its load; energy integrates per tick into a monotone
//!   accumulator.
//!
//! ## Features
//!
//! - `parallel` - Run parameter sweeps across instances using rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use oransim::{CellParams, Simulation, UeParams};
//!
//! // 10-second horizon, seeded random stream.
//! let mut sim = Simulation::new(10.0, 42);
//!
//! let cell = sim.make_cell(CellParams::default()).unwrap();
//! let ue = sim.make_ue(UeParams::default()).unwrap();
//! sim.attach_ue(ue, cell).unwrap();
//!
//! sim.run().unwrap();
//!
//! // The UE's loop reconciled the topology with its attachment.
//! assert!(sim.neighbors(cell).unwrap().contains(&ue));
//! let stats = sim.export_stats();
//! assert_eq!(stats["simulation"]["now"], 10.0);
//! ```
//!
//! ## Scenario-Driven Setup
//!
//! ```rust,ignore
//! use oransim::ScenarioConfig;
//!
//! let config = ScenarioConfig::from_json_file("scenario.json")?;
//! let mut sim = config.build()?;
//! sim.run()?;
//! ```
//!
//! ## Units
//!
//! Power in watts, energy in joules, time in seconds, distance in metres
//! (1 W·s = 1 J).

pub mod config;
pub mod error;
pub mod eventlog;
pub mod node;
pub mod nodes;
pub mod ports;
pub mod power;
pub mod registry;
pub mod scheduler;
pub mod sim;
pub mod sweep;
pub mod topology;
pub mod types;

// Re-export commonly used types
pub use config::{CellSite, ConfigError, ConfigResult, RrhSite, ScenarioConfig};
pub use error::{SimError, SimResult};
pub use eventlog::{EventKind, EventLog, EventRecord};
pub use node::{Linkable, NodeCore, Schedulable, SimNode, TickContext, DEFAULT_INTERVAL};
pub use nodes::{
    AccessPointParams, AntennaPanel, Cell, CellParams, CentralisedUnit, DistributedUnit,
    PanelParams, RadioAccessPoint, RadioUnit, RadioUnitParams, RemoteRadioHead, RrhParams,
    TrafficProfile, UeParams, UserEquipment,
};
pub use ports::{FronthaulPorts, PortPool};
pub use power::{
    cu_watts, DuPowerParams, EnergyAccumulator, PowerModel, TransceiverPower, P_CU_MAX_WATTS,
};
pub use registry::{IdentityRegistry, NodeHandle};
pub use scheduler::{Clock, EventQueue};
pub use sim::{SimStats, Simulation, DEFAULT_HORIZON};
pub use sweep::{summarize, RunSummary, SweepRunner};
pub use topology::{NodeKey, TopologyGraph};
pub use types::{Guid, NodeClass, SimTime, SlotIndex, Xyz};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// oransim::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
