//! Fleet classification keys used by the parameter tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Light-duty emission standard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EuroStandard {
    PreEce,
    Euro1,
    Euro2,
    Euro3,
    Euro4,
    Euro5,
    Euro6,
}

impl EuroStandard {
    pub const ALL: [EuroStandard; 7] = [
        Self::PreEce,
        Self::Euro1,
        Self::Euro2,
        Self::Euro3,
        Self::Euro4,
        Self::Euro5,
        Self::Euro6,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EuroStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreEce => f.write_str("PRE-ECE"),
            other => write!(f, "Euro {}", other.index()),
        }
    }
}

/// Heavy-duty (bus and goods vehicle) emission standard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeavyDutyStandard {
    EuroIii,
    EuroIv,
    EuroVEgr,
    EuroVi,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    Petrol,
    Diesel,
}

impl EngineType {
    pub const ALL: [EngineType; 2] = [Self::Petrol, Self::Diesel];

    /// This engine's share of the fleet given the petrol share.
    #[inline]
    pub fn share(self, petrol_share: f64) -> f64 {
        match self {
            Self::Petrol => petrol_share,
            Self::Diesel => 1.0 - petrol_share,
        }
    }
}

/// Passenger-car displacement band.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineCapacity {
    /// 0.8 to 1.4 litres.
    Small,
    /// 1.4 to 2.0 litres.
    Medium,
}

impl EngineCapacity {
    pub const ALL: [EngineCapacity; 2] = [Self::Small, Self::Medium];
}
