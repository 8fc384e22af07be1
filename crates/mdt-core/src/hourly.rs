//! Hourly flow records.
//!
//! The survey window is twelve one-hour slots, 06:00 to 17:00.  Every segment
//! carries one [`HourlyFlow`] per slot (observed speeds and vehicle count) and
//! one emissions value per slot ([`HourlySeries`]).

/// Number of hourly slots per segment.
pub const HOURS: usize = 12;

/// Wall-clock hour of slot 0.
pub const FIRST_HOUR: u8 = 6;

/// One value per hourly slot.
pub type HourlySeries = [f64; HOURS];

/// Observed traffic in one hourly slot.
///
/// Speeds are km/h.  `sample_count` is the number of vehicles observed in the
/// hour and doubles as the flow rate (vehicles per hour).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HourlyFlow {
    pub hour:         u8,
    pub mean_speed:   f64,
    pub median_speed: f64,
    pub sample_count: u32,
}

impl HourlyFlow {
    /// An unobserved slot for `hour`.
    pub fn empty(hour: u8) -> Self {
        Self { hour, ..Self::default() }
    }

    #[inline]
    pub fn is_observed(&self) -> bool {
        self.sample_count > 0
    }
}

/// The twelve hourly flow slots of one segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowProfile(pub [HourlyFlow; HOURS]);

impl FlowProfile {
    /// All slots unobserved, labelled 06..17.
    pub fn empty() -> Self {
        Self(std::array::from_fn(|i| HourlyFlow::empty(FIRST_HOUR + i as u8)))
    }

    #[inline]
    pub fn slots(&self) -> &[HourlyFlow; HOURS] {
        &self.0
    }

    #[inline]
    pub fn slots_mut(&mut self) -> &mut [HourlyFlow; HOURS] {
        &mut self.0
    }

    pub fn mean_speeds(&self) -> HourlySeries {
        std::array::from_fn(|i| self.0[i].mean_speed)
    }

    /// Sample counts as floats, i.e. hourly flow rates.
    pub fn flows(&self) -> HourlySeries {
        std::array::from_fn(|i| self.0[i].sample_count as f64)
    }

    /// Sum of sample counts across all hours.
    pub fn total_samples(&self) -> u64 {
        self.0.iter().map(|s| s.sample_count as u64).sum()
    }

    /// True when every slot has a nonzero sample count.
    pub fn all_hours_observed(&self) -> bool {
        self.0.iter().all(HourlyFlow::is_observed)
    }

    /// Mean of the hourly mean speeds.
    pub fn mean_speed(&self) -> f64 {
        series_mean(&self.mean_speeds())
    }

    /// Mean hourly flow rate.
    pub fn mean_flow(&self) -> f64 {
        series_mean(&self.flows())
    }
}

impl Default for FlowProfile {
    fn default() -> Self {
        Self::empty()
    }
}

/// Arithmetic mean of a full hourly series.
#[inline]
pub fn series_mean(series: &HourlySeries) -> f64 {
    series.iter().sum::<f64>() / HOURS as f64
}

/// Round to two decimal places, the precision flow values are kept at.
#[inline]
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
