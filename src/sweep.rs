//! Parameter sweeps over independent simulation instances.
//!
//! Each instance owns a private registry, topology, and random stream, so
//! parallelism is safe at the instance granularity only. With the
//! `parallel` feature the sweep fans out over rayon; without it the seeds
//! run sequentially with identical results.

use std::collections::BTreeMap;

use parking_lot::Mutex;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::error::SimResult;
use crate::sim::Simulation;
use crate::types::{NodeClass, SimTime};

/// Read-out of one completed simulation run.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub name: String,
    pub seed: u64,
    pub final_time: SimTime,
    pub nodes: usize,
    pub ticks_executed: u64,
    pub total_joules: f64,
    /// Accumulated joules keyed by class tag, in tag order.
    pub joules_by_class: BTreeMap<String, f64>,
}

/// Summarizes a finished simulation.
pub fn summarize(name: &str, seed: u64, sim: &Simulation) -> RunSummary {
    let mut joules_by_class = BTreeMap::new();
    for class in NodeClass::ALL {
        let joules = sim.joules_by_class(class);
        if joules > 0.0 {
            joules_by_class.insert(class.as_str().to_string(), joules);
        }
    }
    RunSummary {
        name: name.to_string(),
        seed,
        final_time: sim.now(),
        nodes: sim.node_count(),
        ticks_executed: sim.stats().ticks_executed,
        total_joules: sim.total_joules(),
        joules_by_class,
    }
}

/// Expands one scenario over a set of seeds and runs every instance to its
/// horizon.
pub struct SweepRunner {
    base: ScenarioConfig,
    seeds: Vec<u64>,
}

impl SweepRunner {
    /// Creates a runner for the scenario's own seed only.
    pub fn new(base: ScenarioConfig) -> Self {
        let seeds = vec![base.seed];
        Self { base, seeds }
    }

    /// Replaces the seed set.
    pub fn with_seeds(mut self, seeds: impl IntoIterator<Item = u64>) -> Self {
        self.seeds = seeds.into_iter().collect();
        self
    }

    /// Uses seeds `0..n`.
    pub fn with_seed_count(mut self, n: u64) -> Self {
        self.seeds = (0..n).collect();
        self
    }

    /// The seeds this runner will expand over.
    pub fn seeds(&self) -> &[u64] {
        &self.seeds
    }

    fn run_one(base: &ScenarioConfig, seed: u64) -> SimResult<RunSummary> {
        let mut config = base.clone();
        config.seed = seed;
        let mut sim = config.build()?;
        sim.run()?;
        Ok(summarize(&config.name, seed, &sim))
    }

    /// Runs every instance and returns the summaries in seed order.
    pub fn run(&self) -> SimResult<Vec<RunSummary>> {
        let collected = Mutex::new(Vec::with_capacity(self.seeds.len()));

        #[cfg(feature = "parallel")]
        self.seeds.par_iter().try_for_each(|&seed| -> SimResult<()> {
            let summary = Self::run_one(&self.base, seed)?;
            collected.lock().push(summary);
            Ok(())
        })?;

        #[cfg(not(feature = "parallel"))]
        for &seed in &self.seeds {
            let summary = Self::run_one(&self.base, seed)?;
            collected.lock().push(summary);
        }

        let mut summaries = collected.into_inner();
        summaries.sort_by_key(|s| s.seed);
        Ok(summaries)
    }
}
