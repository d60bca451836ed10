//! BCQM soft-rudder kernel
//!
//! A single-thread binary hop process whose velocity persists with a
//! coherence-dependent stay probability. Scans over the coherence value
//! `W_coh` reduce ensembles of trajectories to the power spectral density
//! of their discrete acceleration, then to an amplitude and a spectral
//! centroid per coherence value.

pub mod acceleration;
pub mod config;
pub mod ensemble;
pub mod fit;
pub mod law;
pub mod output;
pub mod scan;
pub mod spectrum;
pub mod summary;
pub mod trajectory;

use thiserror::Error;

pub use acceleration::second_difference;
pub use config::{OutputConfig, RunConfig, ScanParameters, SimulationParameters, SlipConfig};
pub use ensemble::{average_spectra, run_ensemble, trial_spectrum};
pub use fit::{fit_beta, fit_beta_from_csv, BetaFit};
pub use law::{PersistenceLaw, FALLBACK_P_STAY};
pub use output::{write_scan_outputs, ScanOutputs};
pub use scan::{draw_value_seeds, run_scan, CoherencePoint, ScanResult};
pub use spectrum::{estimate_psd, PsdEstimator, Spectrum, MIN_PSD_SAMPLES};
pub use summary::{amplitude_and_centroid, SpectrumSummary};
pub use trajectory::{simulate_trajectory, Trajectory};

#[derive(Debug, Error)]
pub enum SoftRudderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("time series too short for PSD estimation: {len} samples, need at least {min}")]
    SignalTooShort { len: usize, min: usize },
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("need at least 2 data points with A > 0 to fit beta; got {got}")]
    InsufficientFitPoints { got: usize },
}
