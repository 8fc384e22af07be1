//! Per-segment, per-hour emissions.
//!
//! For each hourly slot with at least one observed vehicle the slot's value
//! is the sum of five category contributions, each multiplied by the
//! category's share of the segment's [`VehicleMix`].  A category whose share
//! is zero is not evaluated at all.
//!
//! | Category          | Factor                                                        |
//! |-------------------|---------------------------------------------------------------|
//! | two-wheeled       | sum of the two-wheeled curves at `v`                          |
//! | passenger car     | Σ engine × standard × capacity, length and temperature aware  |
//! | bus/coach         | Σ standard share × curve(`v`), only for `v` in its window     |
//! | light commercial  | Σ standard × engine, with cold-start correction               |
//! | heavy goods       | Σ standard share × curve(`v`), only for `v` in its window     |
//!
//! Every factor is multiplied by the slot's vehicle count.  A combination with
//! no entry in the [`EmissionsConfig`] contributes nothing and the remaining
//! shares are not renormalised.

use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use mdt_core::{HOURS, HourlyFlow, HourlySeries, SegmentId, VehicleCategory, VehicleMix};
use mdt_network::{Network, Segment};

use crate::{
    EmissionsConfig, EmissionsObserver, EngineCapacity, EngineType, EuroStandard,
    HeavyDutyParams, Scenario, cold_mileage_fraction,
};

/// Counts from one [`EmissionsEngine::compute_network`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EmissionsReport {
    /// Segments whose series was written.
    pub computed: usize,
    /// Closed segments left untouched.
    pub closed:   usize,
    /// Segments whose vehicle mix was rescaled by the scenario modifiers.
    pub rescaled: usize,
}

/// Evaluates the category sub-models over one parameter table and scenario.
pub struct EmissionsEngine<'c> {
    config:   &'c EmissionsConfig,
    scenario: Scenario,
}

impl<'c> EmissionsEngine<'c> {
    pub fn new(config: &'c EmissionsConfig, scenario: Scenario) -> Self {
        Self { config, scenario }
    }

    pub fn config(&self) -> &EmissionsConfig {
        self.config
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Compute and store the hourly series of every open segment.
    ///
    /// Closed segments keep whatever series they already had.
    pub fn compute_network<O: EmissionsObserver>(
        &self,
        network:  &mut Network,
        observer: &mut O,
    ) -> EmissionsReport {
        let mut report = EmissionsReport::default();
        for (id, segment) in network.segments_mut() {
            if segment.closed {
                observer.on_skip_closed(id);
                report.closed += 1;
                continue;
            }
            if self.apply_modifiers(segment) {
                report.rescaled += 1;
            }
            let mix = self.effective_mix(&segment.attrs.vehicle_mix);
            self.write_series(id, segment, &mix, observer);
            report.computed += 1;
        }
        info!(
            "emissions computed for {} segments ({} closed, {} rescaled)",
            report.computed, report.closed, report.rescaled
        );
        report
    }

    /// Compute and store the hourly series of one segment, open or closed.
    ///
    /// Scenario modifiers are applied to the segment's mix first and the
    /// rescaled mix is written back.
    pub fn segment_emissions<O: EmissionsObserver>(
        &self,
        id:       SegmentId,
        segment:  &mut Segment,
        observer: &mut O,
    ) -> HourlySeries {
        self.apply_modifiers(segment);
        let mix = self.effective_mix(&segment.attrs.vehicle_mix);
        self.write_series(id, segment, &mix, observer)
    }

    /// Hourly series for `segment` under `mix`, without touching the segment.
    pub fn hourly_emissions<O: EmissionsObserver>(
        &self,
        segment:  &Segment,
        mix:      &VehicleMix,
        observer: &mut O,
    ) -> HourlySeries {
        let length = segment.length_km();
        let slots = segment.attrs.flow.slots();
        let mut series = [0.0; HOURS];
        for (value, slot) in series.iter_mut().zip(slots) {
            *value = self.slot_emissions(slot, length, mix, observer);
        }
        series
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    /// Multiply the stored mix by the scenario modifiers and persist the
    /// renormalised result.  Returns whether the mix was rewritten.
    fn apply_modifiers(&self, segment: &mut Segment) -> bool {
        let Some(modifiers) = self.scenario.modifiers else {
            return false;
        };
        match segment.attrs.vehicle_mix.rescaled(&modifiers) {
            Some(mix) => {
                segment.attrs.vehicle_mix = mix;
                true
            }
            None => false,
        }
    }

    /// The mix to compute with.  When the modified mix sums to zero it is
    /// used as-is but never stored.
    fn effective_mix(&self, stored: &VehicleMix) -> VehicleMix {
        match self.scenario.modifiers {
            Some(m) if stored.rescaled(&m).is_none() => stored.scaled(&m),
            _ => *stored,
        }
    }

    fn write_series<O: EmissionsObserver>(
        &self,
        id:       SegmentId,
        segment:  &mut Segment,
        mix:      &VehicleMix,
        observer: &mut O,
    ) -> HourlySeries {
        let series = self.hourly_emissions(segment, mix, observer);
        segment.attrs.emissions = series;
        observer.on_segment(id, &series);
        debug!("{id}: {:.3} g/day", series.iter().sum::<f64>());
        series
    }

    fn slot_emissions<O: EmissionsObserver>(
        &self,
        slot:     &HourlyFlow,
        length:   f64,
        mix:      &VehicleMix,
        observer: &mut O,
    ) -> f64 {
        if slot.sample_count == 0 {
            return 0.0;
        }
        let v = slot.mean_speed;
        let count = slot.sample_count as f64;

        let mut total = 0.0;
        for category in VehicleCategory::ALL {
            let proportion = mix.get(category);
            if proportion == 0.0 {
                continue;
            }
            observer.on_submodel(category, slot.hour);
            let factor = match category {
                VehicleCategory::TwoWheeled      => self.two_wheeled(v),
                VehicleCategory::PassengerCar    => self.passenger_car(v, length),
                VehicleCategory::BusCoach        => heavy_duty(&self.config.bus_coach, v),
                VehicleCategory::LightCommercial => self.light_commercial(v),
                VehicleCategory::HeavyGoods      => heavy_duty(&self.config.heavy_goods, v),
            };
            total += factor * count * proportion;
        }
        total
    }

    fn two_wheeled(&self, v: f64) -> f64 {
        self.config.two_wheeled.curves.iter().map(|c| c.eval(v)).sum()
    }

    fn capacity_share(&self, capacity: EngineCapacity) -> f64 {
        match capacity {
            EngineCapacity::Small  => self.scenario.capacity_share,
            EngineCapacity::Medium => 1.0 - self.scenario.capacity_share,
        }
    }

    /// Per-vehicle passenger-car factor over a segment of `length` km.
    fn passenger_car(&self, v: f64, length: f64) -> f64 {
        let params = &self.config.passenger_car;
        if !params.window.contains(v) {
            return 0.0;
        }
        let t = self.scenario.temperature_c;
        let beta = cold_mileage_fraction(length, t);

        let mut total = 0.0;
        for engine in EngineType::ALL {
            let engine_share = engine.share(self.scenario.petrol_share);
            let overshoot = self.config.cold_start.entry(engine).map_or(0.0, |q| q.overshoot);
            let cold = self.config.cold_start.quotient(engine, v, t);

            for standard in EuroStandard::ALL {
                let standard_share = params.share(engine, standard);
                for capacity in EngineCapacity::ALL {
                    let Some(curve) = params.factor(engine, standard, capacity) else {
                        continue;
                    };
                    let mut e = curve.eval(v) * length * (1.0 + beta * overshoot);
                    if let Some(q) = cold {
                        e += q * e;
                    }
                    total += e * engine_share * self.capacity_share(capacity) * standard_share;
                }
            }
        }
        total
    }

    fn light_commercial(&self, v: f64) -> f64 {
        let params = &self.config.light_commercial;
        if !params.window.contains(v) {
            return 0.0;
        }
        let t = self.scenario.temperature_c;
        params
            .factors
            .iter()
            .filter(|f| !params.excluded.contains(&f.standard))
            .map(|f| {
                let mut e = f.hot.eval(v);
                if let Some(q) = self.config.cold_start.quotient(f.engine, v, t) {
                    e += q * e;
                }
                e * f.engine.share(self.scenario.petrol_share) * params.share(f.standard)
            })
            .sum()
    }
}

fn heavy_duty(params: &HeavyDutyParams, v: f64) -> f64 {
    if !params.window.contains(v) {
        return 0.0;
    }
    params.factors.iter().map(|f| f.hot.eval(v) * f.share).sum()
}
