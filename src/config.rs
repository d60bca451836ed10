use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::law::PersistenceLaw;
use crate::spectrum::MIN_PSD_SAMPLES;
use crate::SoftRudderError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub dt: f64,
    pub n_steps: usize,
    pub n_ensembles: usize,
    pub seed: u64,
    /// Evaluate coherence values concurrently. Results do not depend on it.
    pub parallel: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            dt: 1.0,
            n_steps: 16_384,
            n_ensembles: 64,
            seed: 12_345,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParameters {
    pub wcoh_values: Vec<f64>,
    pub label: String,
}

impl Default for ScanParameters {
    fn default() -> Self {
        Self {
            wcoh_values: vec![5.0, 10.0, 20.0, 40.0, 80.0, 160.0],
            label: "soft_rudder_wcoh_scan".to_string(),
        }
    }
}

/// Slip law selection: a law name plus its numeric parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipConfig {
    pub law: String,
    pub params: BTreeMap<String, f64>,
}

impl Default for SlipConfig {
    fn default() -> Self {
        Self {
            law: "exp".to_string(),
            params: BTreeMap::new(),
        }
    }
}

impl SlipConfig {
    pub fn resolve(&self) -> PersistenceLaw {
        PersistenceLaw::resolve(&self.law, &self.params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub base_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("outputs_soft_rudder"),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    #[serde_as(as = "DefaultOnNull")]
    pub simulation: SimulationParameters,
    #[serde_as(as = "DefaultOnNull")]
    pub scan: ScanParameters,
    #[serde_as(as = "DefaultOnNull")]
    pub slip: SlipConfig,
    #[serde_as(as = "DefaultOnNull")]
    pub output: OutputConfig,
}

impl RunConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, SoftRudderError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, SoftRudderError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), SoftRudderError> {
        let sim = &self.simulation;

        if !sim.dt.is_finite() || sim.dt <= 0.0 {
            return Err(SoftRudderError::InvalidConfig(
                "simulation.dt must be finite and greater than zero".to_string(),
            ));
        }

        if sim.n_steps < MIN_PSD_SAMPLES {
            return Err(SoftRudderError::InvalidConfig(format!(
                "simulation.n_steps must be at least {MIN_PSD_SAMPLES}, got {}",
                sim.n_steps
            )));
        }

        if sim.n_ensembles == 0 {
            return Err(SoftRudderError::InvalidConfig(
                "simulation.n_ensembles must be greater than zero".to_string(),
            ));
        }

        if self.scan.wcoh_values.is_empty() {
            return Err(SoftRudderError::InvalidConfig(
                "scan.wcoh_values must contain at least one value".to_string(),
            ));
        }

        if self.scan.wcoh_values.iter().any(|w| !w.is_finite()) {
            return Err(SoftRudderError::InvalidConfig(
                "scan.wcoh_values must be finite".to_string(),
            ));
        }

        let law = self.slip.resolve();
        if !law.parameters_are_finite() {
            return Err(SoftRudderError::InvalidConfig(format!(
                "slip.params for law {:?} must be finite",
                self.slip.law
            )));
        }

        if law.divides_by_coherence() && self.scan.wcoh_values.iter().any(|&w| w == 0.0) {
            return Err(SoftRudderError::InvalidConfig(
                "scan.wcoh_values must not contain 0 when slip.law is inv".to_string(),
            ));
        }

        Ok(())
    }
}
