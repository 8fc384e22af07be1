//! Speed-dependent emission-factor curves and validity windows.

use serde::{Deserialize, Serialize};

/// Emission factor as a function of mean speed (km/h).
///
/// Serialised with a `form` tag:
///
/// ```toml
/// hot = { form = "rational", a = 2.6, b = 0.03, c = 0.0, d = 0.0, e = 0.0003 }
/// hot = { form = "polynomial", coefficients = [3.0, -0.02, 0.0004] }
/// hot = { form = "power", a = 15.0, b = -0.55 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum SpeedCurve {
    /// `(a + c·v + e·v²) / (1 + b·v + d·v²)`
    Rational { a: f64, b: f64, c: f64, d: f64, e: f64 },
    /// `Σ coefficients[i]·vⁱ`
    Polynomial { coefficients: Vec<f64> },
    /// `a·vᵇ`
    Power { a: f64, b: f64 },
}

impl SpeedCurve {
    pub fn constant(value: f64) -> Self {
        Self::Polynomial { coefficients: vec![value] }
    }

    pub fn eval(&self, v: f64) -> f64 {
        match self {
            Self::Rational { a, b, c, d, e } => (a + c * v + e * v * v) / (1.0 + b * v + d * v * v),
            // Horner, highest power first.
            Self::Polynomial { coefficients } => coefficients.iter().rev().fold(0.0, |acc, k| acc * v + k),
            Self::Power { a, b } => a * v.powf(*b),
        }
    }
}

/// Open speed interval `(min, max)` in km/h.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedWindow {
    pub min: f64,
    pub max: f64,
}

impl SpeedWindow {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Strictly inside; both bounds excluded.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v > self.min && v < self.max
    }
}
