//! `mdt-network` — the road graph every pipeline stage reads and mutates.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                    |
//! |---------------|-------------------------------------------------------------|
//! | [`node`]      | `Node` (position + attached segment ids)                    |
//! | [`segment`]   | `Segment`, `SegmentAttributes`, `join`                      |
//! | [`network`]   | `Network` arena with atomic `replace_segments`              |
//! | [`simplify`]  | degree-2 elimination, `MergePolicy`, `FlowMergePolicy`      |
//! | [`aggregate`] | `NetworkSummary` (hourly means, worst segments)             |
//! | [`error`]     | `NetworkError`, `NetworkResult<T>`                          |
//!
//! # Invariants
//!
//! - A segment's node list and coordinate list have equal length ≥ 2.
//! - A node's attached list contains a segment id iff that segment's node list
//!   contains the node.  Only [`Network::add_segment`] and
//!   [`Network::replace_segments`] touch attached lists.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod aggregate;
pub mod error;
pub mod network;
pub mod node;
pub mod segment;
pub mod simplify;


pub use aggregate::{CONGESTION_MIN_FLOW, DailyMetric, DailySummary, NetworkSummary};
pub use error::{NetworkError, NetworkResult};
pub use network::Network;
pub use node::Node;
pub use segment::{Segment, SegmentAttributes};
pub use simplify::{
    FlowMergePolicy, MergePolicy, derived_segment_id, merge_hourly, simplify, simplify_until_stable,
};
