//! Scenario configuration.
//!
//! A scenario is described by a JSON document: cell sites with their
//! access-point/radio-unit/radio-head fan-out, the baseband split, and the
//! UE fleet. Loading from a file enforces a byte-size cap (default 1×10⁸
//! bytes) before the document is read.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimResult;
use crate::nodes::{
    AccessPointParams, CellParams, RadioUnitParams, RrhParams, TrafficProfile, UeParams,
};
use crate::ports::FronthaulPorts;
use crate::power::DuPowerParams;
use crate::sim::Simulation;
use crate::types::{SimTime, Xyz};

/// Maximum configuration file size accepted by default, in bytes.
pub const DEFAULT_MAX_CONFIG_BYTES: u64 = 100_000_000;

/// Errors that can occur while loading a scenario configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("file size ({size} bytes) exceeds maximum size ({limit} bytes)")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One cell site and its radio fan-out.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CellSite {
    /// Site position, in metres.
    pub xyz: Xyz,
    /// Coverage radius, in metres.
    pub radius_m: f64,
    /// Number of radio access points in this cell.
    pub access_points: usize,
    /// Place access points at the cell centre instead of randomly.
    pub at_cell_centre: bool,
    /// Build one radio unit per access point.
    pub radio_unit: bool,
    /// Remote radio head description, one per access point if present.
    pub rrh: Option<RrhSite>,
}

impl Default for CellSite {
    fn default() -> Self {
        Self {
            xyz: Xyz::default(),
            radius_m: 500.0,
            access_points: 1,
            at_cell_centre: true,
            radio_unit: true,
            rrh: None,
        }
    }
}

/// Remote radio head description within a cell site.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RrhSite {
    pub n_rf_ports: usize,
    pub n_antenna_panels: usize,
    pub fronthaul_ports: usize,
    pub fronthaul_protocol: String,
    pub data_rate_gbps_max: f64,
}

impl Default for RrhSite {
    fn default() -> Self {
        Self {
            n_rf_ports: 2,
            n_antenna_panels: 2,
            fronthaul_ports: 2,
            fronthaul_protocol: "CPRI".to_string(),
            data_rate_gbps_max: 10.0,
        }
    }
}

/// The UE fleet of a scenario.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UeFleet {
    /// Number of UEs.
    pub count: usize,
    /// Reporting interval, in seconds.
    pub interval: SimTime,
    /// Traffic profiles, cycled over the fleet. Empty means no demand
    /// sampling.
    pub traffic: Vec<TrafficProfile>,
}

impl Default for UeFleet {
    fn default() -> Self {
        Self {
            count: 0,
            interval: 1.0,
            traffic: Vec::new(),
        }
    }
}

/// The baseband split of a scenario.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasebandConfig {
    /// Build a distributed unit from this budget.
    pub distributed_unit: Option<DuPowerParams>,
    /// Build a centralised unit, coupled to the DU if one exists.
    pub centralised_unit: bool,
}

/// A complete scenario configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub seed: u64,
    /// Simulated-time horizon, in seconds.
    pub until: SimTime,
    pub cells: Vec<CellSite>,
    pub baseband: BasebandConfig,
    pub ues: UeFleet,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "scenario".to_string(),
            seed: 0,
            until: 100.0,
            cells: Vec::new(),
            baseband: BasebandConfig::default(),
            ues: UeFleet::default(),
        }
    }
}

impl ScenarioConfig {
    /// Loads a scenario from a JSON file, enforcing the default size cap.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        Self::from_json_file_with_limit(path, DEFAULT_MAX_CONFIG_BYTES)
    }

    /// Loads a scenario from a JSON file with an explicit size cap.
    pub fn from_json_file_with_limit<P: AsRef<Path>>(
        path: P,
        max_bytes: u64,
    ) -> ConfigResult<Self> {
        let size = std::fs::metadata(path.as_ref())?.len();
        if size > max_bytes {
            return Err(ConfigError::FileTooLarge {
                size,
                limit: max_bytes,
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parses a scenario from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: ScenarioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the scenario to pretty JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validates the scenario.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.until <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "horizon must be positive, got {}",
                self.until
            )));
        }
        if self.ues.count > 0 && self.ues.interval <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "UE interval must be positive, got {}",
                self.ues.interval
            )));
        }
        for (i, site) in self.cells.iter().enumerate() {
            if site.radius_m <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "cell {i}: radius must be positive, got {}",
                    site.radius_m
                )));
            }
            if let Some(rrh) = &site.rrh {
                let effective_ports = if rrh.n_rf_ports > 0 { rrh.n_rf_ports } else { 2 };
                if rrh.n_antenna_panels > effective_ports {
                    return Err(ConfigError::Validation(format!(
                        "cell {i}: {} antenna panels cannot fit {} RF ports",
                        rrh.n_antenna_panels, effective_ports
                    )));
                }
            }
        }
        Ok(())
    }

    /// Instantiates the whole scenario through the simulation factories.
    ///
    /// UEs are attached round-robin over the cells as a neutral stand-in
    /// for the external serving-cell policy.
    pub fn build(&self) -> SimResult<Simulation> {
        let mut sim = Simulation::new(self.until, self.seed);

        let du = match &self.baseband.distributed_unit {
            Some(params) => Some(sim.make_distributed_unit(*params)?),
            None => None,
        };
        if self.baseband.centralised_unit {
            sim.make_centralised_unit(du)?;
        }

        let mut cells = Vec::with_capacity(self.cells.len());
        for site in &self.cells {
            let cell = sim.make_cell(CellParams {
                xyz: site.xyz,
                radius_m: site.radius_m,
                ..Default::default()
            })?;
            cells.push(cell);

            for _ in 0..site.access_points {
                let ap = sim.make_access_point(
                    cell,
                    AccessPointParams {
                        at_cell_centre: site.at_cell_centre,
                        ..Default::default()
                    },
                )?;
                let ru = if site.radio_unit {
                    Some(sim.make_radio_unit(cell, ap, du, RadioUnitParams::default())?)
                } else {
                    None
                };
                if let Some(rrh_site) = &site.rrh {
                    let rrh = sim.make_rrh(
                        ap,
                        ru,
                        du,
                        RrhParams {
                            n_rf_ports: rrh_site.n_rf_ports,
                            fronthaul: FronthaulPorts::new(
                                rrh_site.fronthaul_ports,
                                rrh_site.fronthaul_protocol.clone(),
                                rrh_site.data_rate_gbps_max,
                            ),
                            ..Default::default()
                        },
                    )?;
                    for _ in 0..rrh_site.n_antenna_panels {
                        sim.make_antenna_panel(rrh, Default::default())?;
                    }
                }
            }
        }

        for i in 0..self.ues.count {
            let traffic = if self.ues.traffic.is_empty() {
                None
            } else {
                Some(self.ues.traffic[i % self.ues.traffic.len()])
            };
            let ue = sim.make_ue(UeParams {
                interval: self.ues.interval,
                traffic,
                ..Default::default()
            })?;
            if !cells.is_empty() {
                sim.attach_ue(ue, cells[i % cells.len()])?;
            }
        }

        Ok(sim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = ScenarioConfig::from_json("{}").unwrap();
        assert_eq!(config.name, "scenario");
        assert_eq!(config.until, 100.0);
        assert!(config.cells.is_empty());
    }

    #[test]
    fn test_round_trip() {
        let mut config = ScenarioConfig::default();
        config.cells.push(CellSite {
            rrh: Some(RrhSite::default()),
            ..Default::default()
        });
        config.ues.count = 4;

        let json = config.to_json().unwrap();
        let parsed = ScenarioConfig::from_json(&json).unwrap();
        assert_eq!(parsed.cells.len(), 1);
        assert_eq!(parsed.ues.count, 4);
    }

    #[test]
    fn test_validation_rejects_bad_horizon() {
        let err = ScenarioConfig::from_json(r#"{"until": 0.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validation_rejects_panel_overflow() {
        let json = r#"{
            "cells": [{"rrh": {"n_rf_ports": 1, "n_antenna_panels": 3}}]
        }"#;
        let err = ScenarioConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_size_cap_rejects_oversized_file() {
        let path = std::env::temp_dir().join("oransim_config_size_cap.json");
        std::fs::write(&path, "{\"name\": \"padded out beyond the cap\"}").unwrap();

        let err = ScenarioConfig::from_json_file_with_limit(&path, 4).unwrap_err();
        assert!(matches!(err, ConfigError::FileTooLarge { limit: 4, .. }));

        let ok = ScenarioConfig::from_json_file(&path).unwrap();
        assert_eq!(ok.name, "padded out beyond the cap");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_build_produces_expected_counts() {
        let mut config = ScenarioConfig::default();
        config.until = 1.0;
        config.cells = vec![
            CellSite {
                access_points: 2,
                rrh: Some(RrhSite::default()),
                ..Default::default()
            };
            2
        ];
        config.baseband.distributed_unit = Some(DuPowerParams::default());
        config.baseband.centralised_unit = true;
        config.ues.count = 5;

        let sim = config.build().unwrap();
        // 2 cells + 4 APs + 4 RUs + 4 RRHs + 8 panels + DU + CU + 5 UEs.
        assert_eq!(sim.node_count(), 29);
        assert!(sim.topology().find_asymmetry().is_none());
    }
}
