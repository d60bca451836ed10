//! Power-law fit `A ~ C * W^(-beta)` on the amplitude table.

use std::path::Path;

use serde::Serialize;

use crate::output::read_amplitude_table;
use crate::SoftRudderError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BetaFit {
    pub beta: f64,
    /// Intercept of `ln A` against `ln W`, i.e. `ln C`.
    pub intercept: f64,
    pub n_points: usize,
}

/// Least-squares line through `(ln W, ln A)` for the points with `A > 0`.
pub fn fit_beta(wcoh: &[f64], amplitude: &[f64]) -> Result<BetaFit, SoftRudderError> {
    if wcoh.len() != amplitude.len() {
        return Err(SoftRudderError::LengthMismatch {
            context: "beta fit",
            expected: wcoh.len(),
            got: amplitude.len(),
        });
    }

    let (log_w, log_a): (Vec<f64>, Vec<f64>) = wcoh
        .iter()
        .zip(amplitude)
        .filter(|(_, a)| **a > 0.0)
        .map(|(&w, &a)| (w.ln(), a.ln()))
        .unzip();

    let n = log_w.len();
    if n < 2 {
        return Err(SoftRudderError::InsufficientFitPoints { got: n });
    }

    let mean_w = log_w.iter().sum::<f64>() / n as f64;
    let mean_a = log_a.iter().sum::<f64>() / n as f64;
    let (sxy, sxx) = log_w
        .iter()
        .zip(&log_a)
        .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - mean_w;
            (sxy + dx * (y - mean_a), sxx + dx * dx)
        });

    let slope = sxy / sxx;
    Ok(BetaFit {
        beta: -slope,
        intercept: mean_a - slope * mean_w,
        n_points: n,
    })
}

pub fn fit_beta_from_csv(path: &Path) -> Result<BetaFit, SoftRudderError> {
    let rows = read_amplitude_table(path)?;
    let wcoh: Vec<f64> = rows.iter().map(|row| row.wcoh).collect();
    let amplitude: Vec<f64> = rows.iter().map(|row| row.amplitude).collect();
    fit_beta(&wcoh, &amplitude)
}
