//! Broad vehicle categories and the per-location mix between them.

use std::fmt;

/// The five categories the emissions model distinguishes.
///
/// The discriminant is the position in a [`VehicleMix`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VehicleCategory {
    TwoWheeled      = 0,
    PassengerCar    = 1,
    BusCoach        = 2,
    LightCommercial = 3,
    HeavyGoods      = 4,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 5] = [
        Self::TwoWheeled,
        Self::PassengerCar,
        Self::BusCoach,
        Self::LightCommercial,
        Self::HeavyGoods,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TwoWheeled      => "two-wheeled",
            Self::PassengerCar    => "passenger car",
            Self::BusCoach        => "bus/coach",
            Self::LightCommercial => "light commercial",
            Self::HeavyGoods      => "heavy goods",
        };
        f.write_str(s)
    }
}

/// Share of traffic in each [`VehicleCategory`].
///
/// Either sums to 1 (within rounding) or is all zeros, meaning "no mix known".
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleMix(pub [f64; 5]);

impl VehicleMix {
    pub const ZERO: VehicleMix = VehicleMix([0.0; 5]);

    /// Derive proportions from four class counts and a total.
    ///
    /// The fifth share is the residual `total - sum(counts)`.  A zero total
    /// yields [`VehicleMix::ZERO`].
    pub fn from_counts(counts: [u64; 4], total: u64) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let t = total as f64;
        let residual = total as f64 - counts.iter().sum::<u64>() as f64;
        Self([
            counts[0] as f64 / t,
            counts[1] as f64 / t,
            counts[2] as f64 / t,
            counts[3] as f64 / t,
            residual / t,
        ])
    }

    #[inline]
    pub fn get(&self, category: VehicleCategory) -> f64 {
        self.0[category.index()]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&p| p == 0.0)
    }

    /// Elementwise product with `modifiers`, without renormalising.
    pub fn scaled(&self, modifiers: &[f64; 5]) -> Self {
        Self(std::array::from_fn(|i| self.0[i] * modifiers[i]))
    }

    /// Elementwise product with `modifiers`, renormalised to sum to 1.
    ///
    /// Returns `None` when the product sums to zero.
    pub fn rescaled(&self, modifiers: &[f64; 5]) -> Option<Self> {
        let scaled = self.scaled(modifiers);
        let total = scaled.sum();
        if total == 0.0 {
            return None;
        }
        Some(Self(scaled.0.map(|p| p / total)))
    }
}
