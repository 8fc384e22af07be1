//! `mdt-emissions` — hourly pollutant mass per road segment.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`standard`]  | `EuroStandard`, `HeavyDutyStandard`, `EngineType`, `EngineCapacity` |
//! | [`curve`]     | `SpeedCurve` (rational, polynomial, power), `SpeedWindow`       |
//! | [`config`]    | `EmissionsConfig`, the immutable parameter table                |
//! | [`scenario`]  | `Scenario`: modifiers, petrol share, temperature, capacity share |
//! | [`engine`]    | `EmissionsEngine`, network and single-segment passes            |
//! | [`observer`]  | `EmissionsObserver`, `NoopObserver`                             |
//! | [`error`]     | `EmissionsError`, `EmissionsResult<T>`                          |
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = EmissionsConfig::default();
//! let engine = EmissionsEngine::new(&config, Scenario::default().with_temperature(4.0));
//! let report = engine.compute_network(&mut network, &mut NoopObserver);
//! ```

pub mod config;
pub mod curve;
pub mod engine;
pub mod error;
pub mod observer;
pub mod scenario;
pub mod standard;


pub use config::{
    ColdStartParams, ColdStartQuotient, EmissionsConfig, HeavyDutyFactor, HeavyDutyParams,
    LightCommercialFactor, LightCommercialParams, LightCommercialShare, PassengerCarFactor,
    PassengerCarParams, StandardShare, TwoWheeledParams, cold_mileage_fraction,
};
pub use curve::{SpeedCurve, SpeedWindow};
pub use engine::{EmissionsEngine, EmissionsReport};
pub use error::{EmissionsError, EmissionsResult};
pub use observer::{EmissionsObserver, NoopObserver};
pub use scenario::Scenario;
pub use standard::{EngineCapacity, EngineType, EuroStandard, HeavyDutyStandard};
