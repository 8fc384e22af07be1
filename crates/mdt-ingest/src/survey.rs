//! Vehicle-mix survey points (traffic count CSV).
//!
//! # CSV format
//!
//! Columns are read by header name; any other columns are ignored.
//!
//! ```csv
//! latitude,longitude,two_wheeled_motor_vehicles,cars_and_taxis,buses_and_coaches,lgvs,all_motor_vehicles
//! 53.4794,-2.2453,12,3010,85,540,3880
//! ```
//!
//! The fifth (heavy goods) share is the residual
//! `all_motor_vehicles - (sum of the four named classes)`.

use std::io::Read;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use mdt_core::{GeoPoint, VehicleMix};

use crate::IngestResult;

#[derive(Deserialize)]
struct SurveyRecord {
    latitude:                   f64,
    longitude:                  f64,
    two_wheeled_motor_vehicles: u64,
    cars_and_taxis:             u64,
    buses_and_coaches:          u64,
    lgvs:                       u64,
    all_motor_vehicles:         u64,
}

/// One surveyed location and the traffic mix observed there.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SurveyPoint {
    pub pos: GeoPoint,
    pub mix: VehicleMix,
}

/// Load survey points from `path`.
///
/// A missing file is not an error: it is logged and `Ok(None)` is returned,
/// leaving vehicle-mix matching unavailable.
pub fn load_survey_csv(path: &Path) -> IngestResult<Option<Vec<SurveyPoint>>> {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("survey file {} does not exist; vehicle mixes unavailable", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    load_survey_reader(file).map(Some)
}

/// Like [`load_survey_csv`] but accepts any `Read` source.
pub fn load_survey_reader<R: Read>(reader: R) -> IngestResult<Vec<SurveyPoint>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut points = Vec::new();

    for result in csv_reader.deserialize::<SurveyRecord>() {
        let row = result?;
        let counts = [row.two_wheeled_motor_vehicles, row.cars_and_taxis, row.buses_and_coaches, row.lgvs];
        if counts.iter().sum::<u64>() > row.all_motor_vehicles {
            warn!(
                "survey point ({}, {}): class counts exceed total {}",
                row.latitude, row.longitude, row.all_motor_vehicles
            );
        }
        points.push(SurveyPoint {
            pos: GeoPoint::new(row.latitude, row.longitude),
            mix: VehicleMix::from_counts(counts, row.all_motor_vehicles),
        });
    }

    info!("loaded {} survey points", points.len());
    Ok(points)
}
