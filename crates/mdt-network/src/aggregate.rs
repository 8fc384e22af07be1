//! Network-wide aggregates.
//!
//! [`NetworkSummary::compute`] makes one pass over the live segments in arena
//! order.  Hourly means divide by the total segment count, closed and
//! unobserved segments included.  An empty network yields all-zero series and
//! no worst segments.

use mdt_core::{HOURS, HourlySeries, SegmentId, round2, series_mean};

use crate::Network;

/// Minimum mean hourly flow for a segment to be considered for congestion.
pub const CONGESTION_MIN_FLOW: f64 = 100.0;

/// Network-level results handed to presentation and export collaborators.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkSummary {
    pub segment_count:  usize,
    /// Per-hour network mean of segment mean speeds, km/h, 2 dp.
    pub mean_speed:     HourlySeries,
    /// Per-hour network mean of segment emissions, grams, 2 dp.
    pub mean_emissions: HourlySeries,
    /// Per-hour network mean of segment flow, vehicles per hour, 2 dp.
    pub mean_flow:      HourlySeries,
    /// Segment with the highest nonzero daily mean emissions, and that mean.
    pub worst_emitter:  Option<(SegmentId, f64)>,
    /// Segment with the lowest speed performance index, and that index.
    pub most_congested: Option<(SegmentId, f64)>,
    /// Highest daily mean speed of any segment, km/h.
    pub max_mean_speed: f64,
}

impl NetworkSummary {
    pub fn compute(network: &Network) -> Self {
        let mut speed = [0.0; HOURS];
        let mut emissions = [0.0; HOURS];
        let mut flow = [0.0; HOURS];

        let mut worst_emitter: Option<(SegmentId, f64)> = None;
        let mut most_congested: Option<(SegmentId, f64)> = None;
        let mut max_mean_speed = 0.0_f64;

        for (id, seg) in network.segments() {
            let attrs = &seg.attrs;
            let speeds = attrs.flow.mean_speeds();
            let flows = attrs.flow.flows();
            for h in 0..HOURS {
                speed[h] += speeds[h];
                emissions[h] += attrs.emissions[h];
                flow[h] += flows[h];
            }

            // Strict comparison keeps the first of equal emitters.
            let daily = series_mean(&attrs.emissions);
            if daily != 0.0 && worst_emitter.is_none_or(|(_, best)| daily > best) {
                worst_emitter = Some((id, daily));
            }

            let mean_speed = series_mean(&speeds);
            let limit = attrs.speed_limit.as_kmh().filter(|l| *l > 0.0);
            if let Some(limit) = limit.filter(|_| series_mean(&flows) >= CONGESTION_MIN_FLOW) {
                let spi = mean_speed / limit * 100.0;
                if most_congested.is_none_or(|(_, worst)| spi < worst) {
                    most_congested = Some((id, spi));
                }
            }

            max_mean_speed = max_mean_speed.max(mean_speed);
        }

        let n = network.segment_count();
        let mean = |sums: HourlySeries| -> HourlySeries {
            if n == 0 {
                return [0.0; HOURS];
            }
            sums.map(|s| round2(s / n as f64))
        };

        Self {
            segment_count: n,
            mean_speed: mean(speed),
            mean_emissions: mean(emissions),
            mean_flow: mean(flow),
            worst_emitter,
            most_congested,
            max_mean_speed,
        }
    }

    pub fn daily(&self) -> DailySummary {
        DailySummary {
            speed:     DailyMetric::from_hourly(&self.mean_speed),
            emissions: DailyMetric::from_hourly(&self.mean_emissions),
            flow:      DailyMetric::from_hourly(&self.mean_flow),
        }
    }
}

/// Daily mean of one hourly network series and each hour's deviation from it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailyMetric {
    pub mean:          f64,
    /// Percent above (positive) or below the daily mean, 2 dp.  All zeros
    /// when the daily mean is zero.
    pub deviation_pct: HourlySeries,
}

impl DailyMetric {
    pub fn from_hourly(series: &HourlySeries) -> Self {
        let mean = series_mean(series);
        let deviation_pct = if mean == 0.0 {
            [0.0; HOURS]
        } else {
            series.map(|v| round2((v - mean) * 100.0 / mean))
        };
        Self { mean: round2(mean), deviation_pct }
    }
}

/// Daily view of a [`NetworkSummary`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DailySummary {
    pub speed:     DailyMetric,
    pub emissions: DailyMetric,
    pub flow:      DailyMetric,
}
