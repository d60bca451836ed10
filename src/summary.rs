use serde::Serialize;

use crate::SoftRudderError;

/// Amplitude `A = sqrt(int S domega)` and centroid `omega_c = int omega S domega / A^2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpectrumSummary {
    pub amplitude: f64,
    pub omega_c: f64,
}

/// Trapezoidal rule for samples `y` on the (not necessarily uniform) grid `x`.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

pub fn amplitude_and_centroid(omega: &[f64], s: &[f64]) -> Result<SpectrumSummary, SoftRudderError> {
    if omega.len() != s.len() {
        return Err(SoftRudderError::LengthMismatch {
            context: "spectrum summary",
            expected: omega.len(),
            got: s.len(),
        });
    }

    if omega.len() < 2 {
        return Ok(SpectrumSummary::default());
    }

    let total_power = trapezoid(s, omega);
    let amplitude = total_power.max(0.0).sqrt();

    let omega_c = if total_power > 0.0 {
        let weighted: Vec<f64> = omega.iter().zip(s).map(|(w, s)| w * s).collect();
        trapezoid(&weighted, omega) / total_power
    } else {
        0.0
    };

    Ok(SpectrumSummary { amplitude, omega_c })
}
