//! Instrumentation hooks for the emissions engine.

use mdt_core::{HourlySeries, SegmentId, VehicleCategory};

/// Callbacks invoked by [`EmissionsEngine`][crate::EmissionsEngine].
///
/// All methods default to no-ops.  A category whose proportion is zero never
/// reaches [`on_submodel`][Self::on_submodel], which makes the gating
/// observable from outside.
pub trait EmissionsObserver {
    /// A category sub-model is about to run for one hourly slot.
    fn on_submodel(&mut self, _category: VehicleCategory, _hour: u8) {}

    /// A segment's series has been written.
    fn on_segment(&mut self, _id: SegmentId, _emissions: &HourlySeries) {}

    /// A closed segment was passed over.
    fn on_skip_closed(&mut self, _id: SegmentId) {}
}

/// An [`EmissionsObserver`] that does nothing.
pub struct NoopObserver;

impl EmissionsObserver for NoopObserver {}
