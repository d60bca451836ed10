//! Ensemble reduction for a single coherence value.
//!
//! Each trial maps to one acceleration spectrum; the ensemble spectrum is the
//! element-wise arithmetic mean of the trial densities, taken before any
//! amplitude is computed so that trial variances add.

use rand::Rng;

use crate::acceleration::second_difference;
use crate::spectrum::{PsdEstimator, Spectrum};
use crate::trajectory::simulate_trajectory;
use crate::SoftRudderError;

/// Spectrum of a single trial: trajectory, then acceleration, then PSD.
pub fn trial_spectrum<R: Rng + ?Sized>(
    estimator: &PsdEstimator,
    p_stay: f64,
    rng: &mut R,
) -> Result<Spectrum, SoftRudderError> {
    let trajectory = simulate_trajectory(p_stay, estimator.n(), rng);
    estimator.estimate(&second_difference(&trajectory.position))
}

/// Run `n_ensembles` trials drawing sequentially from `rng` and average them.
pub fn run_ensemble<R: Rng + ?Sized>(
    estimator: &PsdEstimator,
    p_stay: f64,
    n_ensembles: usize,
    rng: &mut R,
) -> Result<Spectrum, SoftRudderError> {
    let trials = (0..n_ensembles)
        .map(|_| trial_spectrum(estimator, p_stay, &mut *rng))
        .collect::<Result<Vec<_>, _>>()?;
    average_spectra(&trials)
}

/// Element-wise mean of spectra sharing one frequency grid.
pub fn average_spectra(spectra: &[Spectrum]) -> Result<Spectrum, SoftRudderError> {
    let Some(first) = spectra.first() else {
        return Err(SoftRudderError::InvalidConfig(
            "cannot average an empty ensemble".to_string(),
        ));
    };

    let bins = first.omega.len();
    let sum = spectra.iter().try_fold(vec![0.0; bins], |mut acc, spectrum| {
        if spectrum.s.len() != bins {
            return Err(SoftRudderError::LengthMismatch {
                context: "ensemble spectrum",
                expected: bins,
                got: spectrum.s.len(),
            });
        }
        acc.iter_mut().zip(&spectrum.s).for_each(|(a, s)| *a += s);
        Ok(acc)
    })?;

    let count = spectra.len() as f64;
    Ok(Spectrum {
        omega: first.omega.clone(),
        s: sum.into_iter().map(|total| total / count).collect(),
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{average_spectra, run_ensemble, trial_spectrum};
    use crate::spectrum::{PsdEstimator, Spectrum};
    use crate::SoftRudderError;

    fn spectrum(s: Vec<f64>) -> Spectrum {
        Spectrum {
            omega: (0..s.len()).map(|k| k as f64).collect(),
            s,
        }
    }

    #[test]
    fn mean_is_element_wise() {
        let avg = average_spectra(&[spectrum(vec![1.0, 2.0, 3.0]), spectrum(vec![3.0, 0.0, 6.0])])
            .unwrap();
        assert_eq!(avg.s, vec![2.0, 1.0, 4.5]);
        assert_eq!(avg.omega, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn empty_and_ragged_ensembles_are_rejected() {
        assert!(matches!(
            average_spectra(&[]),
            Err(SoftRudderError::InvalidConfig(_))
        ));
        assert!(matches!(
            average_spectra(&[spectrum(vec![1.0, 2.0]), spectrum(vec![1.0])]),
            Err(SoftRudderError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn single_trial_ensemble_equals_trial() {
        let estimator = PsdEstimator::new(128, 1.0).unwrap();
        let ensemble = run_ensemble(&estimator, 0.8, 1, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        let trial = trial_spectrum(&estimator, 0.8, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        assert_eq!(ensemble, trial);
    }

    #[test]
    fn trials_draw_sequentially_from_one_source() {
        let estimator = PsdEstimator::new(64, 1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let first = trial_spectrum(&estimator, 0.6, &mut rng).unwrap();
        let second = trial_spectrum(&estimator, 0.6, &mut rng).unwrap();
        let expected = average_spectra(&[first, second]).unwrap();

        let ensemble = run_ensemble(&estimator, 0.6, 2, &mut ChaCha8Rng::seed_from_u64(21)).unwrap();
        assert_eq!(ensemble, expected);
    }
}
