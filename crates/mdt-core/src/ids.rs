//! Strongly typed identifier wrappers.
//!
//! Identifiers come from outside the workspace (OSM node/way ids, flow-dataset
//! segment ids) or are derived from coordinates, so they are sparse `u64`
//! keys rather than dense indices.  All IDs are `Copy + Ord + Hash` so they can
//! be used as map keys without ceremony.

use std::fmt;

/// Generate a typed ID wrapper around a `u64`.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub u64);

        impl $name {
            /// The raw key.
            #[inline(always)]
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            #[inline(always)]
            fn from(raw: u64) -> $name {
                $name(raw)
            }
        }

        impl From<$name> for u64 {
            #[inline(always)]
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

typed_id! {
    /// Key of a graph node: an OSM node id, or a key derived from a
    /// coordinate pair for sources without node identity.
    pub struct NodeId;
}

typed_id! {
    /// Key of a road segment: an OSM way id, the absolute flow-dataset id, or
    /// a coordinate-derived key for segments produced by simplification.
    pub struct SegmentId;
}
