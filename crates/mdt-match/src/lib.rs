//! `mdt-match` — fuses a structural network with a flow network and survey
//! points by nearest-neighbour queries.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`index`]   | `FlowIndex`, `SurveyIndex` (rstar R-trees over `[lat, lon]`) |
//! | [`matcher`] | `Matcher`, candidate ranking, representative point          |
//! | [`error`]   | `MatchError`, `MatchResult<T>`                               |
//!
//! Candidate ranking and tie-breaking are deterministic: emissions scale
//! linearly with the matched mix, so a reordered tie changes results.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `FlowMatch`, `MatchReport`. |

pub mod error;
pub mod index;
pub mod matcher;

#[cfg(test)]
mod tests;

pub use error::{MatchError, MatchResult};
pub use index::{FlowIndex, SurveyIndex};
pub use matcher::{
    FlowMatch, MatchReport, Matcher, NEAREST_NODES, rank_candidates, representative_point,
};
