//! Road classification and posted speed limits.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Miles → kilometres.
const KM_PER_MILE: f64 = 1.609_344;

// ── RoadClass ─────────────────────────────────────────────────────────────────

/// OSM `highway=*` classification.
///
/// Values outside the named set are kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadClass {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    #[default]
    Unclassified,
    Residential,
    Other(String),
}

impl RoadClass {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "motorway"     => Self::Motorway,
            "trunk"        => Self::Trunk,
            "primary"      => Self::Primary,
            "secondary"    => Self::Secondary,
            "tertiary"     => Self::Tertiary,
            "unclassified" => Self::Unclassified,
            "residential"  => Self::Residential,
            other          => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Motorway     => "motorway",
            Self::Trunk        => "trunk",
            Self::Primary      => "primary",
            Self::Secondary    => "secondary",
            Self::Tertiary     => "tertiary",
            Self::Unclassified => "unclassified",
            Self::Residential  => "residential",
            Self::Other(s)     => s,
        }
    }

    /// Lane count assumed when the source does not give one.
    pub fn default_lanes(&self) -> u8 {
        match self {
            Self::Motorway                               => 6,
            Self::Trunk | Self::Primary | Self::Secondary => 4,
            _                                            => 2,
        }
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── SpeedLimit ────────────────────────────────────────────────────────────────

/// Posted speed limit, normalised to km/h.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedLimit {
    Kmh(f64),
    #[default]
    Unknown,
}

impl SpeedLimit {
    pub fn kmh(value: f64) -> Self {
        Self::Kmh(value)
    }

    pub fn mph(value: f64) -> Self {
        Self::Kmh(value * KM_PER_MILE)
    }

    /// Parse an OSM `maxspeed` value, falling back to `Unknown` on anything
    /// that is not a number with an optional `mph`/`km/h` unit.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or(Self::Unknown)
    }

    pub fn as_kmh(self) -> Option<f64> {
        match self {
            Self::Kmh(v) => Some(v),
            Self::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Self::Kmh(_))
    }
}

impl FromStr for SpeedLimit {
    type Err = CoreError;

    /// `"30 mph"` → 48.28 km/h; `"50"`, `"50 km/h"`, `"50 kmh"` → 50 km/h.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split_whitespace();
        let number = parts
            .next()
            .ok_or_else(|| CoreError::Parse("empty speed limit".into()))?;
        let value: f64 = number
            .parse()
            .map_err(|_| CoreError::Parse(format!("invalid speed limit {s:?}")))?;
        match parts.next() {
            None | Some("km/h") | Some("kmh") | Some("kph") => Ok(Self::Kmh(value)),
            Some("mph") => Ok(Self::mph(value)),
            Some(unit) => Err(CoreError::Parse(format!("unknown speed unit {unit:?}"))),
        }
    }
}

impl fmt::Display for SpeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kmh(v) => write!(f, "{v:.0} km/h"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
