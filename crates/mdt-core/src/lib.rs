//! `mdt-core` — foundational types for the `mdt` road-emissions workspace.
//!
//! This crate is a dependency of every other `mdt-*` crate.  It has no
//! `mdt-*` dependencies; it uses `geo` for distances, `thiserror` for errors
//! and optionally `serde`.
//!
//! # What lives here
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `NodeId`, `SegmentId`                                   |
//! | [`geo`]       | `GeoPoint`, WGS-84 geodesic and haversine distance      |
//! | [`hourly`]    | `HourlyFlow`, `FlowProfile`, `HourlySeries`, `HOURS`    |
//! | [`road`]      | `RoadClass`, `SpeedLimit`                               |
//! | [`vehicle`]   | `VehicleCategory`, `VehicleMix`                         |
//! | [`error`]     | `CoreError`, `CoreResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod hourly;
pub mod ids;
pub mod road;
pub mod vehicle;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use self::geo::GeoPoint;
pub use hourly::{FIRST_HOUR, FlowProfile, HOURS, HourlyFlow, HourlySeries, round2, series_mean};
pub use ids::{NodeId, SegmentId};
pub use road::{RoadClass, SpeedLimit};
pub use vehicle::{VehicleCategory, VehicleMix};
