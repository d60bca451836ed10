//! Slip laws mapping a coherence value to a velocity stay probability.
//!
//! A law is resolved once from its configured name and parameter map into a
//! [`PersistenceLaw`]; missing parameters take the per-law defaults. Names
//! that match none of the known laws resolve to [`PersistenceLaw::Unrecognized`],
//! which evaluates to the constant [`FALLBACK_P_STAY`] instead of failing.

use std::collections::BTreeMap;

use serde::Serialize;

/// Stay probability returned for unrecognized law names.
pub const FALLBACK_P_STAY: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum PersistenceLaw {
    /// `p = p_max - (p_max - p_min) * exp(-W / w_ref)`
    Exponential { p_min: f64, p_max: f64, w_ref: f64 },
    /// `p = p_min + (p_max - p_min) * W^alpha / (W^alpha + w0^alpha)`
    Rational {
        p_min: f64,
        p_max: f64,
        w0: f64,
        alpha: f64,
    },
    /// `p = p_mid + delta * tanh((W - w0) / w_scale)`
    Tanh {
        p_mid: f64,
        delta: f64,
        w0: f64,
        w_scale: f64,
    },
    /// `p = 1 - k / W`, i.e. roughly one flip per `W / k` steps.
    Inverse { k: f64 },
    Unrecognized { requested: String },
}

impl PersistenceLaw {
    pub fn resolve(name: &str, params: &BTreeMap<String, f64>) -> Self {
        let param = |key: &str, default: f64| params.get(key).copied().unwrap_or(default);

        match name.trim().to_ascii_lowercase().as_str() {
            "exp" | "exponential" => Self::Exponential {
                p_min: param("p_min", 0.5),
                p_max: param("p_max", 0.999),
                w_ref: param("w_ref", 10.0),
            },
            "rational" => Self::Rational {
                p_min: param("p_min", 0.5),
                p_max: param("p_max", 0.999),
                w0: param("w0", 10.0),
                alpha: param("alpha", 1.0),
            },
            "tanh" | "hyperbolic-tangent" | "hyperbolic_tangent" => Self::Tanh {
                p_mid: param("p_mid", 0.75),
                delta: param("delta", 0.24),
                w0: param("w0", 20.0),
                w_scale: param("w_scale", 10.0),
            },
            "inv" | "inverse" => Self::Inverse {
                k: param("k", 2.0),
            },
            _ => Self::Unrecognized {
                requested: name.to_string(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exponential { .. } => "exp",
            Self::Rational { .. } => "rational",
            Self::Tanh { .. } => "tanh",
            Self::Inverse { .. } => "inv",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }

    /// True for laws that divide by the coherence value and are therefore
    /// undefined at `W = 0`.
    pub fn divides_by_coherence(&self) -> bool {
        matches!(self, Self::Inverse { .. })
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }

    /// Finite-ness of every numeric parameter of the resolved law.
    pub fn parameters_are_finite(&self) -> bool {
        match *self {
            Self::Exponential { p_min, p_max, w_ref } => {
                [p_min, p_max, w_ref].iter().all(|v| v.is_finite())
            }
            Self::Rational {
                p_min,
                p_max,
                w0,
                alpha,
            } => [p_min, p_max, w0, alpha].iter().all(|v| v.is_finite()),
            Self::Tanh {
                p_mid,
                delta,
                w0,
                w_scale,
            } => [p_mid, delta, w0, w_scale].iter().all(|v| v.is_finite()),
            Self::Inverse { k } => k.is_finite(),
            Self::Unrecognized { .. } => true,
        }
    }

    /// Stay probability at coherence `wcoh`, clamped to `[0, 1]`.
    ///
    /// The inverse law is not guarded against `wcoh == 0`; configurations
    /// selecting it are rejected at validation time instead.
    pub fn p_stay(&self, wcoh: f64) -> f64 {
        let p = match *self {
            Self::Exponential { p_min, p_max, w_ref } => {
                p_max - (p_max - p_min) * (-wcoh / w_ref).exp()
            }
            Self::Rational {
                p_min,
                p_max,
                w0,
                alpha,
            } => {
                let num = wcoh.powf(alpha);
                let den = num + w0.powf(alpha);
                let frac = if den > 0.0 { num / den } else { 0.0 };
                p_min + (p_max - p_min) * frac
            }
            Self::Tanh {
                p_mid,
                delta,
                w0,
                w_scale,
            } => p_mid + delta * ((wcoh - w0) / w_scale).tanh(),
            Self::Inverse { k } => 1.0 - k / wcoh,
            Self::Unrecognized { .. } => FALLBACK_P_STAY,
        };

        p.clamp(0.0, 1.0)
    }
}
