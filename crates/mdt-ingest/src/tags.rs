//! Tag defaults for topology ways.
//!
//! | Tag        | Attribute     | When absent                                |
//! |------------|---------------|--------------------------------------------|
//! | `name`     | `street_name` | `"unnamed"`                                |
//! | `highway`  | `road_class`  | `unclassified`                             |
//! | `lanes`    | `lanes`       | from road class: motorway 6, trunk/primary/secondary 4, else 2 |
//! | `maxspeed` | `speed_limit` | unknown                                    |
//! | `oneway`   | `oneway`      | unknown (`None`)                           |
//! | `width`    | `width`       | unknown (`None`)                           |
//!
//! An unparseable `lanes` value is treated as absent; an unparseable
//! `maxspeed` becomes unknown.

use std::collections::HashMap;

use mdt_core::{RoadClass, SpeedLimit};
use mdt_network::SegmentAttributes;
use mdt_network::segment::UNNAMED;

pub fn attributes_from_tags(tags: &HashMap<String, String>) -> SegmentAttributes {
    let get = |k: &str| tags.get(k).map(String::as_str);

    let road_class = get("highway").map(RoadClass::from_tag).unwrap_or_default();
    let lanes = get("lanes")
        .and_then(|v| v.trim().parse::<u8>().ok())
        .unwrap_or_else(|| road_class.default_lanes());

    SegmentAttributes {
        street_name: get("name").unwrap_or(UNNAMED).to_owned(),
        lanes,
        road_class,
        speed_limit: get("maxspeed").map(SpeedLimit::from_tag).unwrap_or(SpeedLimit::Unknown),
        oneway: get("oneway").map(str::to_owned),
        width: get("width").map(str::to_owned),
        ..SegmentAttributes::default()
    }
}
