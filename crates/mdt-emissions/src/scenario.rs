//! Per-run what-if knobs.

use serde::{Deserialize, Serialize};

use crate::{EmissionsError, EmissionsResult};

pub const DEFAULT_PETROL_SHARE: f64 = 0.635;
pub const DEFAULT_TEMPERATURE_C: f64 = 9.0;
pub const DEFAULT_CAPACITY_SHARE: f64 = 0.5;

/// Inputs that vary between runs over the same parameter table.
///
/// Every field has a default, so an empty TOML table is a valid scenario:
///
/// ```toml
/// modifiers     = [1.0, 0.5, 1.0, 1.0, 2.0]
/// temperature_c = -2.0
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Per-category multipliers applied to each segment's vehicle mix before
    /// computing.  The rescaled mix is written back onto the segment.
    pub modifiers:      Option<[f64; 5]>,
    /// Share of petrol engines in car and van fleets; diesel is the rest.
    pub petrol_share:   f64,
    /// Ambient temperature, °C.
    pub temperature_c:  f64,
    /// Share of small (under 1.4 l) passenger cars; medium is the rest.
    pub capacity_share: f64,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            modifiers:      None,
            petrol_share:   DEFAULT_PETROL_SHARE,
            temperature_c:  DEFAULT_TEMPERATURE_C,
            capacity_share: DEFAULT_CAPACITY_SHARE,
        }
    }
}

impl Scenario {
    pub fn with_modifiers(mut self, modifiers: [f64; 5]) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    pub fn with_temperature(mut self, temperature_c: f64) -> Self {
        self.temperature_c = temperature_c;
        self
    }

    pub fn with_petrol_share(mut self, petrol_share: f64) -> Self {
        self.petrol_share = petrol_share;
        self
    }

    pub fn from_toml_str(s: &str) -> EmissionsResult<Self> {
        let scenario: Self = toml::from_str(s)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// # Errors
    ///
    /// [`EmissionsError::Scenario`] for a share outside [0, 1], a negative or
    /// non-finite modifier, or a non-finite temperature.
    pub fn validate(&self) -> EmissionsResult<()> {
        for (name, share) in [("petrol_share", self.petrol_share), ("capacity_share", self.capacity_share)] {
            if !(0.0..=1.0).contains(&share) {
                return Err(EmissionsError::Scenario(format!("{name} {share} outside [0, 1]")));
            }
        }
        if !self.temperature_c.is_finite() {
            return Err(EmissionsError::Scenario("temperature_c is not finite".into()));
        }
        if let Some(m) = self.modifiers {
            if m.iter().any(|&k| !k.is_finite() || k < 0.0) {
                return Err(EmissionsError::Scenario(format!("modifiers {m:?} must be finite and >= 0")));
            }
        }
        Ok(())
    }
}
