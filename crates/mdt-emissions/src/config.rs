//! The immutable emission-parameter table.
//!
//! One [`EmissionsConfig`] is built per run (built-in tables via
//! [`Default`], or an override file via [`EmissionsConfig::load`]) and passed
//! by reference into the engine.  Nothing here is global.
//!
//! # Built-in tables
//!
//! The built-in curves are smooth stand-ins with the shape of COPERT carbon
//! monoxide factors (falling with speed, ordered by emission standard).  They
//! are good enough for relative comparisons between scenarios.  Load a
//! calibrated file for absolute figures.
//!
//! A combination missing from a table has no formula: the engine skips it and
//! leaves the remaining shares as they are.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    EmissionsError, EmissionsResult, EngineCapacity, EngineType, EuroStandard,
    HeavyDutyStandard, SpeedCurve, SpeedWindow,
};

/// Tolerance on share-table sums.
const SHARE_EPSILON: f64 = 1e-6;

// ── Cold start ────────────────────────────────────────────────────────────────

/// Cold-start excess quotient `q = max(0, a·v + b·T + c)` for one engine type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColdStartQuotient {
    pub engine: EngineType,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    /// Cold-to-hot ratio above 1 applied over the cold mileage fraction of
    /// passenger-car trips.
    pub overshoot: f64,
}

impl ColdStartQuotient {
    #[inline]
    pub fn quotient(&self, speed: f64, temperature: f64) -> f64 {
        (self.a * speed + self.b * temperature + self.c).max(0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColdStartParams {
    /// Speeds at which the correction applies.
    pub window: SpeedWindow,
    /// The correction applies only above this temperature, °C.
    pub min_temperature: f64,
    pub quotients: Vec<ColdStartQuotient>,
}

impl ColdStartParams {
    /// Correction quotient at `speed`/`temperature`, or `None` outside the
    /// conditions or when `engine` has no entry.
    pub fn quotient(&self, engine: EngineType, speed: f64, temperature: f64) -> Option<f64> {
        if !self.window.contains(speed) || temperature <= self.min_temperature {
            return None;
        }
        self.entry(engine).map(|q| q.quotient(speed, temperature))
    }

    pub fn entry(&self, engine: EngineType) -> Option<&ColdStartQuotient> {
        self.quotients.iter().find(|q| q.engine == engine)
    }
}

/// Fraction of trip mileage driven with a cold engine.
///
/// `β = 0.6474 − 0.02545·l − (0.00974 − 0.000385·l)·T`, clamped to [0, 1],
/// with `l` the trip length in km and `T` the ambient temperature in °C.
pub fn cold_mileage_fraction(length_km: f64, temperature: f64) -> f64 {
    let beta = 0.6474 - 0.02545 * length_km - (0.00974 - 0.000385 * length_km) * temperature;
    beta.clamp(0.0, 1.0)
}

// ── Per-category tables ───────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwoWheeledParams {
    /// Representative sub-classes; the factor is the sum of all curves.
    pub curves: Vec<SpeedCurve>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassengerCarFactor {
    pub engine:   EngineType,
    pub standard: EuroStandard,
    pub capacity: EngineCapacity,
    pub hot:      SpeedCurve,
}

/// Share of one standard within one engine type's fleet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardShare {
    pub engine:   EngineType,
    pub standard: EuroStandard,
    pub share:    f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PassengerCarParams {
    pub window:  SpeedWindow,
    pub factors: Vec<PassengerCarFactor>,
    pub shares:  Vec<StandardShare>,
}

impl PassengerCarParams {
    pub fn factor(
        &self,
        engine: EngineType,
        standard: EuroStandard,
        capacity: EngineCapacity,
    ) -> Option<&SpeedCurve> {
        self.factors
            .iter()
            .find(|f| f.engine == engine && f.standard == standard && f.capacity == capacity)
            .map(|f| &f.hot)
    }

    /// Zero when the pair is absent.
    pub fn share(&self, engine: EngineType, standard: EuroStandard) -> f64 {
        self.shares
            .iter()
            .find(|s| s.engine == engine && s.standard == standard)
            .map_or(0.0, |s| s.share)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightCommercialFactor {
    pub engine:   EngineType,
    pub standard: EuroStandard,
    pub hot:      SpeedCurve,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightCommercialShare {
    pub standard: EuroStandard,
    pub share:    f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightCommercialParams {
    pub window:   SpeedWindow,
    pub factors:  Vec<LightCommercialFactor>,
    /// One share per standard, the same for both engine types.  Looked up by
    /// standard, not by table position.
    pub shares:   Vec<LightCommercialShare>,
    /// Standards with no formula regardless of the factor table.
    #[serde(default)]
    pub excluded: Vec<EuroStandard>,
}

impl LightCommercialParams {
    pub fn share(&self, standard: EuroStandard) -> f64 {
        self.shares.iter().find(|s| s.standard == standard).map_or(0.0, |s| s.share)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeavyDutyFactor {
    pub standard: HeavyDutyStandard,
    pub share:    f64,
    pub hot:      SpeedCurve,
}

/// Buses/coaches and heavy goods vehicles share this layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeavyDutyParams {
    pub window:  SpeedWindow,
    pub factors: Vec<HeavyDutyFactor>,
}

// ── EmissionsConfig ───────────────────────────────────────────────────────────

/// Every curve, share table and validity window the engine reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionsConfig {
    pub cold_start:       ColdStartParams,
    pub two_wheeled:      TwoWheeledParams,
    pub passenger_car:    PassengerCarParams,
    pub bus_coach:        HeavyDutyParams,
    pub light_commercial: LightCommercialParams,
    pub heavy_goods:      HeavyDutyParams,
}

impl EmissionsConfig {
    /// Parse and validate a TOML parameter file body.
    pub fn from_toml_str(s: &str) -> EmissionsResult<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML parameter file.
    pub fn load(path: impl AsRef<Path>) -> EmissionsResult<Self> {
        let path = path.as_ref();
        let config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        info!("emission parameters loaded from {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> EmissionsResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// # Errors
    ///
    /// [`EmissionsError::Config`] for a share outside [0, 1], a share table
    /// summing above 1, an inverted speed window or an empty curve table.
    pub fn validate(&self) -> EmissionsResult<()> {
        let windows = [
            ("cold_start", &self.cold_start.window),
            ("passenger_car", &self.passenger_car.window),
            ("bus_coach", &self.bus_coach.window),
            ("light_commercial", &self.light_commercial.window),
            ("heavy_goods", &self.heavy_goods.window),
        ];
        for (name, w) in windows {
            if w.min >= w.max {
                return Err(config_error(format!("{name}: speed window ({}, {}) is empty", w.min, w.max)));
            }
        }

        let empty_table = [
            ("two_wheeled.curves", self.two_wheeled.curves.is_empty()),
            ("passenger_car.factors", self.passenger_car.factors.is_empty()),
            ("bus_coach.factors", self.bus_coach.factors.is_empty()),
            ("light_commercial.factors", self.light_commercial.factors.is_empty()),
            ("heavy_goods.factors", self.heavy_goods.factors.is_empty()),
        ];
        if let Some((name, _)) = empty_table.iter().find(|(_, empty)| *empty) {
            return Err(config_error(format!("{name} is empty")));
        }

        for engine in EngineType::ALL {
            let shares = self.passenger_car.shares.iter().filter(|s| s.engine == engine).map(|s| s.share);
            check_shares(&format!("passenger_car.shares[{engine:?}]"), shares)?;
        }
        check_shares("light_commercial.shares", self.light_commercial.shares.iter().map(|s| s.share))?;
        check_shares("bus_coach.factors", self.bus_coach.factors.iter().map(|f| f.share))?;
        check_shares("heavy_goods.factors", self.heavy_goods.factors.iter().map(|f| f.share))?;
        Ok(())
    }
}

fn config_error(msg: String) -> EmissionsError {
    EmissionsError::Config(msg)
}

fn check_shares(name: &str, shares: impl Iterator<Item = f64>) -> EmissionsResult<()> {
    let mut total = 0.0;
    for share in shares {
        if !(0.0..=1.0).contains(&share) {
            return Err(config_error(format!("{name}: share {share} outside [0, 1]")));
        }
        total += share;
    }
    if total > 1.0 + SHARE_EPSILON {
        return Err(config_error(format!("{name}: shares sum to {total}")));
    }
    Ok(())
}

// ── Built-in tables ───────────────────────────────────────────────────────────

/// Hot-factor level at low speed, by standard (PRE-ECE first).
const PC_PETROL_LEVEL: [f64; 7] = [25.0, 4.5, 2.6, 1.4, 0.9, 0.7, 0.6];
const PC_DIESEL_LEVEL: [f64; 7] = [1.2, 0.7, 0.5, 0.25, 0.12, 0.06, 0.05];

/// Fleet share of each standard within the petrol / diesel car fleet.
const PC_PETROL_SHARE: [f64; 7] = [0.013, 0.008, 0.049, 0.209, 0.201, 0.150, 0.021];
const PC_DIESEL_SHARE: [f64; 7] = [0.0, 0.002, 0.007, 0.075, 0.134, 0.120, 0.011];
const PC_PETROL_FLEET: f64 = 0.651;
const PC_DIESEL_FLEET: f64 = 0.349;

const LCV_STANDARDS: [EuroStandard; 5] = [
    EuroStandard::Euro2,
    EuroStandard::Euro3,
    EuroStandard::Euro4,
    EuroStandard::Euro5,
    EuroStandard::Euro6,
];
const LCV_PETROL_LEVEL: [f64; 5] = [3.0, 1.8, 1.0, 0.8, 0.7];
const LCV_DIESEL_LEVEL: [f64; 5] = [0.6, 0.45, 0.3, 0.1, 0.08];
const LCV_SHARE: [f64; 5] = [0.002, 0.019, 0.150, 0.313, 0.516];

/// Falling rational curve with low-speed level `level`.
fn falling_curve(level: f64) -> SpeedCurve {
    SpeedCurve::Rational { a: level, b: 0.03, c: 0.0, d: 0.0, e: level * 0.00012 }
}

fn capacity_multiplier(capacity: EngineCapacity) -> f64 {
    match capacity {
        EngineCapacity::Small  => 1.0,
        EngineCapacity::Medium => 1.15,
    }
}

/// Diesel cars under 1.4 l have no Euro 1 to Euro 3 formula.
fn has_passenger_car_formula(engine: EngineType, standard: EuroStandard, capacity: EngineCapacity) -> bool {
    !(engine == EngineType::Diesel
        && capacity == EngineCapacity::Small
        && matches!(standard, EuroStandard::Euro1 | EuroStandard::Euro2 | EuroStandard::Euro3))
}

fn default_passenger_cars() -> PassengerCarParams {
    let mut factors = Vec::new();
    let mut shares = Vec::new();
    for engine in EngineType::ALL {
        let (levels, fleet_shares, fleet) = match engine {
            EngineType::Petrol => (PC_PETROL_LEVEL, PC_PETROL_SHARE, PC_PETROL_FLEET),
            EngineType::Diesel => (PC_DIESEL_LEVEL, PC_DIESEL_SHARE, PC_DIESEL_FLEET),
        };
        for standard in EuroStandard::ALL {
            shares.push(StandardShare { engine, standard, share: fleet_shares[standard.index()] / fleet });
            for capacity in EngineCapacity::ALL {
                if has_passenger_car_formula(engine, standard, capacity) {
                    let level = levels[standard.index()] * capacity_multiplier(capacity);
                    factors.push(PassengerCarFactor { engine, standard, capacity, hot: falling_curve(level) });
                }
            }
        }
    }
    PassengerCarParams { window: SpeedWindow::new(10.0, 130.0), factors, shares }
}

fn default_light_commercial() -> LightCommercialParams {
    let mut factors = Vec::new();
    for (i, standard) in LCV_STANDARDS.into_iter().enumerate() {
        for engine in EngineType::ALL {
            let level = match engine {
                EngineType::Petrol => LCV_PETROL_LEVEL[i],
                EngineType::Diesel => LCV_DIESEL_LEVEL[i],
            };
            factors.push(LightCommercialFactor { engine, standard, hot: falling_curve(level) });
        }
    }
    let shares = LCV_STANDARDS
        .into_iter()
        .zip(LCV_SHARE)
        .map(|(standard, share)| LightCommercialShare { standard, share })
        .collect();
    LightCommercialParams {
        window: SpeedWindow::new(10.0, 120.0),
        factors,
        shares,
        excluded: vec![EuroStandard::Euro1],
    }
}

fn heavy_duty(window: SpeedWindow, rows: &[(HeavyDutyStandard, f64, f64, f64)]) -> HeavyDutyParams {
    let factors = rows
        .iter()
        .map(|&(standard, share, a, b)| HeavyDutyFactor { standard, share, hot: SpeedCurve::Power { a, b } })
        .collect();
    HeavyDutyParams { window, factors }
}

impl Default for EmissionsConfig {
    fn default() -> Self {
        use HeavyDutyStandard::*;

        let cold_start = ColdStartParams {
            window: SpeedWindow::new(5.0, 45.0),
            min_temperature: -20.0,
            quotients: vec![
                ColdStartQuotient { engine: EngineType::Petrol, a: -0.0061, b: -0.0101, c: 0.45, overshoot: 2.5 },
                ColdStartQuotient { engine: EngineType::Diesel, a: -0.0028, b: -0.0035, c: 0.18, overshoot: 0.8 },
            ],
        };
        // Moped and motorcycle.
        let two_wheeled = TwoWheeledParams {
            curves: vec![
                SpeedCurve::constant(5.6),
                SpeedCurve::Polynomial { coefficients: vec![3.0, -0.02, 0.0004] },
            ],
        };
        // Urban bus fleet; the shares cover the three standards in service
        // and sum to 759/791.
        let bus_coach = heavy_duty(SpeedWindow::new(11.0, 86.0), &[
            (EuroIii, 448.0 / 791.0, 15.0, -0.55),
            (EuroIv, 138.0 / 791.0, 4.0, -0.5),
            (EuroVi, 173.0 / 791.0, 1.5, -0.6),
        ]);
        let heavy_goods = heavy_duty(SpeedWindow::new(12.0, 86.0), &[
            (EuroIii, 0.008, 12.0, -0.55),
            (EuroIv, 0.027, 3.5, -0.5),
            (EuroVEgr, 0.203, 3.0, -0.5),
            (EuroVi, 0.761, 0.8, -0.55),
        ]);

        Self {
            cold_start,
            two_wheeled,
            passenger_car: default_passenger_cars(),
            bus_coach,
            light_commercial: default_light_commercial(),
            heavy_goods,
        }
    }
}
