//! Road graph value types.
//!
//! A [`RoadGraph`] is produced once per base-zoom tile by the classifier and
//! is never mutated afterwards. Junctions refer back to ways by index into
//! the graph's way list, so the graph can be shared freely behind an `Arc`.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::coord::Point;

/// OSM tag set with explicit default-value access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tag value, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the tag value or `default` when the tag is absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Returns true if the tag is present with exactly `value`.
    pub fn is(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Parses the tag value, falling back to `None` on absence or parse failure.
    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A classified road: its tags and alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    id: u64,
    tags: Tags,
    node_ids: Vec<u64>,
    points: Vec<Point>,
}

impl Way {
    /// Creates a way from its source node ids and their resolved points.
    ///
    /// `node_ids` and `points` must be the same length and order.
    pub(crate) fn new(id: u64, tags: Tags, node_ids: Vec<u64>, points: Vec<Point>) -> Self {
        debug_assert_eq!(node_ids.len(), points.len());
        Self {
            id,
            tags,
            node_ids,
            points,
        }
    }

    /// Source OSM way id.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn node_ids(&self) -> &[u64] {
        &self.node_ids
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Integer layer of this way; malformed or absent tags count as 0.
    pub fn layer(&self) -> i32 {
        self.tags.parse("layer").unwrap_or(0)
    }
}

/// A way passing through a junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WayPoint {
    /// Index of the way in the owning [`RoadGraph`].
    pub way: usize,
    /// Location where the way meets the junction.
    pub point: Point,
}

/// A location shared by two or more roads.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    node_id: u64,
    members: Vec<WayPoint>,
}

impl Junction {
    /// Creates a junction; returns `None` for fewer than two members.
    pub(crate) fn new(node_id: u64, members: Vec<WayPoint>) -> Option<Self> {
        if members.len() < 2 {
            return None;
        }
        Some(Self { node_id, members })
    }

    /// Source node id of the shared location.
    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn members(&self) -> &[WayPoint] {
        &self.members
    }

    /// Location of the junction.
    pub fn point(&self) -> Point {
        // At least two members by construction
        self.members[0].point
    }
}

/// Roads, junctions and layers extracted for one base-zoom tile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadGraph {
    layers: Vec<i32>,
    ways: Vec<Way>,
    junctions: Vec<Junction>,
}

impl RoadGraph {
    pub(crate) fn new(layers: Vec<i32>, ways: Vec<Way>, junctions: Vec<Junction>) -> Self {
        Self {
            layers,
            ways,
            junctions,
        }
    }

    /// Distinct integer layers present in the source data, ascending.
    pub fn layers(&self) -> &[i32] {
        &self.layers
    }

    pub fn ways(&self) -> &[Way] {
        &self.ways
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }
}
