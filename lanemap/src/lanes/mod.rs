//! Lane model.
//!
//! Derives the ordered cross-section of a road from its tags. Widths are in
//! lane-width units (one nominal driving lane = 1.0) and run left to right
//! relative to the way's drawing direction.
//!
//! Insertion order is significant: parking lanes are placed before cycle
//! lanes, and every left-side insertion goes to index 0, pushing earlier
//! left-side lanes towards the centre.

use crate::osm;
use crate::tile::{Tags, Way};

/// Width of a painted cycle lane in lane-width units.
pub const CYCLE_LANE_WIDTH: f64 = 0.333;

/// Largest `lanes` value accepted; anything above is treated as malformed.
pub const MAX_DRIVING_LANES: u32 = 16;

/// What a lane is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneKind {
    Driving,
    Parking,
    Cycle,
}

/// One strip of a road's cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lane {
    pub kind: LaneKind,
    /// Width in lane-width units.
    pub width: f64,
}

impl Lane {
    pub fn driving() -> Self {
        Self {
            kind: LaneKind::Driving,
            width: 1.0,
        }
    }

    pub fn parking(width: f64) -> Self {
        Self {
            kind: LaneKind::Parking,
            width,
        }
    }

    pub fn cycle() -> Self {
        Self {
            kind: LaneKind::Cycle,
            width: CYCLE_LANE_WIDTH,
        }
    }
}

/// Which sides of a road carry a sidewalk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sidewalks {
    pub left: bool,
    pub right: bool,
}

impl Sidewalks {
    pub fn any(&self) -> bool {
        self.left || self.right
    }
}

/// Number of driving lanes for a road.
///
/// Uses the `lanes` tag when it parses to at most [`MAX_DRIVING_LANES`],
/// otherwise 2 (1 for `oneway=yes`).
/// Anything outside the rendered road classes has no driving lanes.
pub fn driving_lane_count(tags: &Tags) -> u32 {
    if !osm::is_road(tags) {
        return 0;
    }
    match tags
        .parse::<u32>("lanes")
        .filter(|lanes| *lanes <= MAX_DRIVING_LANES)
    {
        Some(lanes) => lanes,
        None if tags.is("oneway", "yes") => 1,
        None => 2,
    }
}

/// Width of a parking lane for a `parking:lane:*` value, in lane-width units.
pub fn parking_width(value: Option<&str>) -> f64 {
    match value {
        Some("parallel") => 1.0,
        Some("diagonal") => 1.5,
        Some("perpendicular") => 2.0,
        _ => 0.0,
    }
}

/// Computes the ordered lane cross-section of a way.
pub fn compute_lanes(way: &Way) -> Vec<Lane> {
    lanes_for_tags(way.tags())
}

/// Computes the ordered lane cross-section from raw tags.
pub fn lanes_for_tags(tags: &Tags) -> Vec<Lane> {
    let driving = driving_lane_count(tags);
    if driving == 0 {
        return Vec::new();
    }

    let mut lanes: Vec<Lane> = (0..driving).map(|_| Lane::driving()).collect();

    let left = parking_width(tags.get("parking:lane:left"));
    if left > 0.0 {
        lanes.insert(0, Lane::parking(left));
    }
    let right = parking_width(tags.get("parking:lane:right"));
    if right > 0.0 {
        lanes.push(Lane::parking(right));
    }
    let both = parking_width(tags.get("parking:lane:both"));
    if both > 0.0 {
        lanes.insert(0, Lane::parking(both));
        lanes.push(Lane::parking(both));
    }

    match tags.get("cycleway") {
        Some("lane") => {
            lanes.insert(0, Lane::cycle());
            lanes.push(Lane::cycle());
        }
        Some("opposite") => lanes.push(Lane::cycle()),
        _ => {
            if tags.is("cycleway:left", "lane") {
                lanes.insert(0, Lane::cycle());
            }
            if tags.is("cycleway:right", "lane") {
                lanes.push(Lane::cycle());
            }
        }
    }

    lanes
}

/// Sum of lane widths in lane-width units.
pub fn total_width(lanes: &[Lane]) -> f64 {
    lanes.iter().map(|lane| lane.width).sum()
}

/// Reads sidewalk presence from `sidewalk`, `sidewalk:both`, `sidewalk:left`
/// and `sidewalk:right`.
pub fn sidewalks(tags: &Tags) -> Sidewalks {
    let mut sides = match tags.get("sidewalk") {
        Some("both") | Some("yes") => Sidewalks {
            left: true,
            right: true,
        },
        Some("left") => Sidewalks {
            left: true,
            right: false,
        },
        Some("right") => Sidewalks {
            left: false,
            right: true,
        },
        _ => Sidewalks::default(),
    };

    if tags.is("sidewalk:both", "yes") {
        sides.left = true;
        sides.right = true;
    }
    if tags.is("sidewalk:left", "yes") {
        sides.left = true;
    }
    if tags.is("sidewalk:right", "yes") {
        sides.right = true;
    }

    sides
}
