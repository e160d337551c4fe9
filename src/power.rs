//! Power models and energy accounting.
//!
//! A power model is either a constant wattage or a pure function of the
//! owning node's load. Composite baseband nodes derive their constants from
//! fixed formulas over sub-component counts and per-unit wattages; energy
//! accrues per tick as `watts × interval` (rectangle rule — intervals are a
//! node's own fixed cadence and do not vary intra-run).
//!
//! Units follow the radio-network convention: power in watts, energy in
//! joules, time in seconds (1 W·s = 1 J).

use serde::{Deserialize, Serialize};

use crate::types::SimTime;

/// Rated maximum power draw of a centralised unit, in watts.
pub const P_CU_MAX_WATTS: f64 = 656.25;

/// A load-dependent wattage function.
pub type LoadFn = Box<dyn Fn(f64) -> f64 + Send>;

/// Instantaneous wattage, evaluated on demand.
pub enum PowerModel {
    /// A fixed wattage, independent of load.
    Constant(f64),
    /// A pure function of the node's internal load producing wattage.
    LoadDependent(LoadFn),
}

impl PowerModel {
    /// Creates a constant-wattage model.
    pub fn constant(watts: f64) -> Self {
        PowerModel::Constant(watts)
    }

    /// Creates a load-dependent model from a wattage function.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + 'static,
    {
        PowerModel::LoadDependent(Box::new(f))
    }

    /// Evaluates the model at the given load.
    pub fn evaluate(&self, load: f64) -> f64 {
        match self {
            PowerModel::Constant(watts) => *watts,
            PowerModel::LoadDependent(f) => f(load),
        }
    }
}

impl std::fmt::Debug for PowerModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowerModel::Constant(w) => write!(f, "Constant({w} W)"),
            PowerModel::LoadDependent(_) => write!(f, "LoadDependent(<fn>)"),
        }
    }
}

/// Per-node energy integral.
///
/// Monotonically non-decreasing (power is non-negative in this domain);
/// reset only when a simulation is constructed.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct EnergyAccumulator {
    accumulated_joules: f64,
}

impl EnergyAccumulator {
    /// Adds one tick's worth of energy.
    pub fn accrue(&mut self, watts: f64, interval: SimTime) {
        debug_assert!(watts >= 0.0, "negative wattage");
        debug_assert!(interval >= 0.0, "negative interval");
        self.accumulated_joules += watts * interval;
    }

    /// Total energy accrued so far, in joules.
    pub fn joules(&self) -> f64 {
        self.accumulated_joules
    }
}

/// Component counts and per-unit wattages for a distributed unit.
///
/// `total_watts` is the fixed composition
/// `n_cpu·P_cpu + ram_GB·P_ram_per_GB + n_gpu·P_gpu + n_accelerator·P_accelerator
/// + n_asic·P_asic + n_nic·P_nic`; `p_load` is the fraction of the rated
/// supply this represents, used as the centralised unit's load input.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DuPowerParams {
    pub p_supply_max_watts: f64,
    pub n_cpu: u32,
    pub p_cpu_watts: f64,
    pub ram_gb: f64,
    pub p_ram_watts_per_gb: f64,
    pub n_gpu: u32,
    pub p_gpu_watts: f64,
    pub n_accelerator: u32,
    pub p_accelerator_watts: f64,
    pub n_asic: u32,
    pub p_asic_watts: f64,
    pub n_nic: u32,
    pub p_nic_watts: f64,
}

impl Default for DuPowerParams {
    fn default() -> Self {
        Self {
            p_supply_max_watts: 2100.0,
            n_cpu: 2,
            p_cpu_watts: 90.0,
            ram_gb: 384.0,
            p_ram_watts_per_gb: 0.375,
            n_gpu: 0,
            p_gpu_watts: 0.0,
            n_accelerator: 1,
            p_accelerator_watts: 52.0,
            n_asic: 1,
            p_asic_watts: 23.0,
            n_nic: 3,
            p_nic_watts: 75.0,
        }
    }
}

impl DuPowerParams {
    /// Total power draw, in watts.
    pub fn total_watts(&self) -> f64 {
        f64::from(self.n_cpu) * self.p_cpu_watts
            + self.ram_gb * self.p_ram_watts_per_gb
            + f64::from(self.n_gpu) * self.p_gpu_watts
            + f64::from(self.n_accelerator) * self.p_accelerator_watts
            + f64::from(self.n_asic) * self.p_asic_watts
            + f64::from(self.n_nic) * self.p_nic_watts
    }

    /// Fraction of the rated supply drawn at `total_watts`.
    pub fn p_load(&self) -> f64 {
        self.total_watts() / self.p_supply_max_watts
    }
}

/// Centralised-unit wattage for a given distributed-unit load.
///
/// CU and DU load are modeled as complementary: the more processing the DU
/// offloads, the less the CU performs.
pub fn cu_watts(du_load: f64) -> f64 {
    (1.0 - du_load) * P_CU_MAX_WATTS
}

/// Additive power budget for a radio transceiver chain.
///
/// Each stage adds its contribution to the running total and returns it, so
/// the budget can be assembled piecewise and then frozen into a constant
/// power model for a radio unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransceiverPower {
    watts: f64,
}

impl TransceiverPower {
    /// Creates an empty budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Power amplifier: signal power over drain efficiency.
    pub fn power_amplifier(&mut self, signal_power_watts: f64, efficiency: f64) -> f64 {
        let watts = signal_power_watts / efficiency;
        self.watts += watts;
        watts
    }

    /// Analog-to-digital converter; rate × resolution in microwatts.
    pub fn adc(&mut self, sampling_rate_hz: f64, resolution_bits: f64) -> f64 {
        let watts = sampling_rate_hz * resolution_bits * 1e-6;
        self.watts += watts;
        watts
    }

    /// Digital-to-analog converter; rate × resolution in microwatts.
    pub fn dac(&mut self, sampling_rate_hz: f64, resolution_bits: f64) -> f64 {
        let watts = sampling_rate_hz * resolution_bits * 1e-6;
        self.watts += watts;
        watts
    }

    /// IQ mixer, driven at the local-oscillator power.
    pub fn iq_mixer(&mut self, lo_power_watts: f64) -> f64 {
        self.watts += lo_power_watts;
        lo_power_watts
    }

    /// Filter stage: signal power × insertion loss.
    pub fn filter(&mut self, signal_power_watts: f64, insertion_loss: f64) -> f64 {
        let watts = signal_power_watts * insertion_loss;
        self.watts += watts;
        watts
    }

    /// OFDM modulator; one microwatt per subcarrier.
    pub fn ofdm_modulator(&mut self, subcarrier_count: f64) -> f64 {
        let watts = subcarrier_count * 1e-6;
        self.watts += watts;
        watts
    }

    /// OFDM demodulator; one microwatt per subcarrier.
    pub fn ofdm_demodulator(&mut self, subcarrier_count: f64) -> f64 {
        let watts = subcarrier_count * 1e-6;
        self.watts += watts;
        watts
    }

    /// Local oscillator; draw scales linearly with carrier frequency.
    pub fn local_oscillator(&mut self, frequency_hz: f64) -> f64 {
        let watts = frequency_hz * 0.001 * 1e-6;
        self.watts += watts;
        watts
    }

    /// Total budget so far, in watts.
    pub fn total_watts(&self) -> f64 {
        self.watts
    }
}
