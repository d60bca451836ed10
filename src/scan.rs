//! Coherence scans.
//!
//! A master ChaCha8 stream seeded from the configured seed hands out one
//! seed per coherence value, in scan order, before any value is evaluated.
//! Each value then runs its whole ensemble sequentially on its own stream,
//! so sequential and parallel scans produce bit-identical results.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::ensemble::run_ensemble;
use crate::law::{PersistenceLaw, FALLBACK_P_STAY};
use crate::spectrum::{PsdEstimator, Spectrum};
use crate::summary::amplitude_and_centroid;
use crate::SoftRudderError;

/// Exclusive upper bound for per-value seeds drawn from the master stream.
pub const VALUE_SEED_BOUND: u64 = (1 << 63) - 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoherencePoint {
    pub wcoh: f64,
    pub p_stay: f64,
    pub seed: u64,
    pub amplitude: f64,
    pub omega_c: f64,
    /// Ensemble-averaged acceleration spectrum.
    #[serde(skip)]
    pub spectrum: Spectrum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub label: String,
    pub law: PersistenceLaw,
    pub points: Vec<CoherencePoint>,
}

impl ScanResult {
    pub fn wcoh_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.wcoh).collect()
    }

    pub fn amplitudes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.amplitude).collect()
    }

    pub fn omega_c_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.omega_c).collect()
    }
}

/// Per-value seeds, drawn from the master stream in scan order.
pub fn draw_value_seeds(master_seed: u64, count: usize) -> Vec<u64> {
    let mut master = ChaCha8Rng::seed_from_u64(master_seed);
    (0..count)
        .map(|_| master.gen_range(0..VALUE_SEED_BOUND))
        .collect()
}

pub fn run_scan(config: &RunConfig) -> Result<ScanResult, SoftRudderError> {
    config.validate()?;

    let sim = &config.simulation;
    let law = config.slip.resolve();
    if !law.is_recognized() {
        warn!(
            law = %config.slip.law,
            p_stay = FALLBACK_P_STAY,
            "unrecognized slip law, using constant stay probability"
        );
    }

    let estimator = PsdEstimator::new(sim.n_steps, sim.dt)?;
    let values = &config.scan.wcoh_values;
    let seeds = draw_value_seeds(sim.seed, values.len());
    let jobs: Vec<(f64, u64)> = values.iter().copied().zip(seeds).collect();

    info!(
        label = %config.scan.label,
        law = law.name(),
        n_steps = sim.n_steps,
        n_ensembles = sim.n_ensembles,
        seed = sim.seed,
        "scanning W_coh values {:?}",
        values
    );

    let evaluate = |&(wcoh, seed): &(f64, u64)| {
        evaluate_value(&estimator, &law, wcoh, seed, sim.n_ensembles)
    };

    let points = if sim.parallel {
        jobs.par_iter().map(evaluate).collect::<Result<Vec<_>, _>>()?
    } else {
        jobs.iter().map(evaluate).collect::<Result<Vec<_>, _>>()?
    };

    Ok(ScanResult {
        label: config.scan.label.clone(),
        law,
        points,
    })
}

fn evaluate_value(
    estimator: &PsdEstimator,
    law: &PersistenceLaw,
    wcoh: f64,
    seed: u64,
    n_ensembles: usize,
) -> Result<CoherencePoint, SoftRudderError> {
    let p_stay = law.p_stay(wcoh);
    debug!(wcoh, p_stay, seed, n_ensembles, "running ensemble");

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let spectrum = run_ensemble(estimator, p_stay, n_ensembles, &mut rng)?;
    let summary = amplitude_and_centroid(&spectrum.omega, &spectrum.s)?;

    info!(
        wcoh,
        p_stay,
        amplitude = summary.amplitude,
        omega_c = summary.omega_c,
        "W_coh = {wcoh}: A = {:.7}, omega_c = {:.6}",
        summary.amplitude,
        summary.omega_c
    );

    Ok(CoherencePoint {
        wcoh,
        p_stay,
        seed,
        amplitude: summary.amplitude,
        omega_c: summary.omega_c,
        spectrum,
    })
}

#[cfg(test)]
mod tests {
    use super::{draw_value_seeds, run_scan, VALUE_SEED_BOUND};
    use crate::config::RunConfig;
    use crate::law::FALLBACK_P_STAY;
    use crate::SoftRudderError;

    fn small_config(values: Vec<f64>) -> RunConfig {
        let mut config = RunConfig::default();
        config.simulation.n_steps = 256;
        config.simulation.n_ensembles = 4;
        config.simulation.seed = 7;
        config.scan.wcoh_values = values;
        config
    }

    #[test]
    fn value_seeds_are_a_prefix_stable_sequence() {
        let short = draw_value_seeds(7, 2);
        let long = draw_value_seeds(7, 5);
        assert_eq!(short[..], long[..2]);
        assert!(long.iter().all(|&s| s < VALUE_SEED_BOUND));
        assert_ne!(long[0], long[1]);
    }

    #[test]
    fn parallel_and_sequential_scans_agree_bitwise() {
        let mut config = small_config(vec![5.0, 10.0, 40.0, 80.0]);
        config.simulation.parallel = true;
        let parallel = run_scan(&config).unwrap();
        config.simulation.parallel = false;
        let sequential = run_scan(&config).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn value_result_does_not_depend_on_later_values() {
        let both = run_scan(&small_config(vec![5.0, 40.0])).unwrap();
        let first_only = run_scan(&small_config(vec![5.0])).unwrap();
        assert_eq!(both.points[0], first_only.points[0]);
    }

    #[test]
    fn spectrum_grid_matches_series_length() {
        let result = run_scan(&small_config(vec![20.0])).unwrap();
        let point = &result.points[0];
        assert_eq!(point.spectrum.omega.len(), 129);
        assert_eq!(point.spectrum.s.len(), 129);
        assert!(point.amplitude >= 0.0);
        assert!(point.omega_c >= 0.0);
    }

    #[test]
    fn unknown_law_scans_with_fallback_probability() {
        let mut config = small_config(vec![1.0, 100.0]);
        config.slip.law = "unknown_law".to_string();
        let result = run_scan(&config).unwrap();
        assert!(result.points.iter().all(|p| p.p_stay == FALLBACK_P_STAY));
    }

    #[test]
    fn invalid_configuration_aborts_the_scan() {
        let mut config = small_config(vec![5.0]);
        config.simulation.n_steps = 3;
        assert!(matches!(
            run_scan(&config),
            Err(SoftRudderError::InvalidConfig(_))
        ));
    }
}
