//! One-sided power spectral density over angular frequency.
//!
//! The estimator applies a symmetric Hann window and a forward FFT, keeps the
//! `n/2 + 1` non-negative bins, and scales
//! `S[k] = 2 * dt^2 / (sum(w^2) * n) * |X[k]|^2` on the grid
//! `omega[k] = 2 pi k / (n dt)`, so that integrating over `omega` tracks the
//! variance of the windowed signal.

use std::f64::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::Serialize;

use crate::SoftRudderError;

/// Shortest series accepted by the estimator.
pub const MIN_PSD_SAMPLES: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Spectrum {
    pub omega: Vec<f64>,
    #[serde(rename = "S")]
    pub s: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }
}

/// Symmetric Hann window, `w[k] = 0.5 - 0.5 cos(2 pi k / (n - 1))`.
pub fn hann_window(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n)
                .map(|k| 0.5 - 0.5 * (2.0 * PI * k as f64 / denom).cos())
                .collect()
        }
    }
}

/// Angular frequencies of the `n/2 + 1` one-sided FFT bins.
pub fn angular_frequencies(n: usize, dt: f64) -> Vec<f64> {
    let span = n as f64 * dt;
    (0..=n / 2).map(|k| 2.0 * PI * k as f64 / span).collect()
}

/// PSD estimator for a fixed series length and sample interval.
///
/// Window, frequency grid and FFT plan are built once and shared by every
/// series of the run; the estimator is `Send + Sync`.
#[derive(Clone)]
pub struct PsdEstimator {
    n: usize,
    dt: f64,
    window: Vec<f64>,
    scale: f64,
    omega: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl PsdEstimator {
    pub fn new(n: usize, dt: f64) -> Result<Self, SoftRudderError> {
        if n < MIN_PSD_SAMPLES {
            return Err(SoftRudderError::SignalTooShort {
                len: n,
                min: MIN_PSD_SAMPLES,
            });
        }

        let window = hann_window(n);
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let scale = dt * dt / (window_power * n as f64);
        let fft = FftPlanner::<f64>::new().plan_fft_forward(n);

        Ok(Self {
            n,
            dt,
            window,
            scale,
            omega: angular_frequencies(n, dt),
            fft,
        })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn omega(&self) -> &[f64] {
        &self.omega
    }

    pub fn estimate(&self, signal: &[f64]) -> Result<Spectrum, SoftRudderError> {
        if signal.len() != self.n {
            return Err(SoftRudderError::LengthMismatch {
                context: "psd signal",
                expected: self.n,
                got: signal.len(),
            });
        }

        let mut buffer: Vec<Complex<f64>> = signal
            .iter()
            .zip(&self.window)
            .map(|(&x, &w)| Complex::new(x * w, 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let s = buffer[..self.omega.len()]
            .iter()
            .map(|bin| 2.0 * self.scale * bin.norm_sqr())
            .collect();

        Ok(Spectrum {
            omega: self.omega.clone(),
            s,
        })
    }
}

/// Estimate the one-sided PSD of `signal` sampled every `dt`.
pub fn estimate_psd(signal: &[f64], dt: f64) -> Result<Spectrum, SoftRudderError> {
    PsdEstimator::new(signal.len(), dt)?.estimate(signal)
}
