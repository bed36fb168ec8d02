//! OpenStreetMap element classification.
//!
//! Turns the flat element list returned by a map-data source into a
//! [`RoadGraph`]: road ways selected by tag rules, junctions wherever two or
//! more roads share a node, and the tile's integer layer set.

use std::collections::{BTreeSet, HashMap};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::coord::Point;
use crate::tile::{Junction, RoadGraph, Tags, Way, WayPoint};

/// `highway` values that are rendered as roads.
pub const ROAD_CLASSES: &[&str] = &[
    "motorway",
    "trunk",
    "primary",
    "secondary",
    "tertiary",
    "unclassified",
    "residential",
    "service",
    "motorway_link",
    "trunk_link",
    "primary_link",
    "secondary_link",
    "tertiary_link",
];

/// A raw map element as delivered by the map-data source.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: u64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: Tags,
    },
    Way {
        id: u64,
        #[serde(default)]
        nodes: Vec<u64>,
        #[serde(default)]
        tags: Tags,
    },
    /// Relations and anything else the source returns.
    #[serde(other)]
    Other,
}

/// Errors raised while classifying map data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A way references a node that is not part of the data set.
    #[error("Way {way} references missing node {node}")]
    MissingNode { way: u64, node: u64 },
}

/// Returns true if the tags describe a road that should be rendered.
pub fn is_road(tags: &Tags) -> bool {
    if tags.is("area", "yes") {
        return false;
    }
    tags.get("highway")
        .is_some_and(|class| ROAD_CLASSES.contains(&class))
}

/// Classifies map elements into a road graph.
///
/// Output order follows source element order, so identical input always
/// yields identical ways and junctions.
pub fn classify(elements: &[Element]) -> Result<RoadGraph, ClassifyError> {
    let nodes: HashMap<u64, Point> = elements
        .iter()
        .filter_map(|element| match element {
            Element::Node { id, lat, lon, .. } => Some((*id, Point::new(*lat, *lon))),
            _ => None,
        })
        .collect();

    let mut layers = BTreeSet::new();
    let mut ways = Vec::new();

    for element in elements {
        let Element::Way { id, nodes: node_ids, tags } = element else {
            continue;
        };

        if let Ok(layer) = tags.get_or("layer", "0").trim().parse::<i32>() {
            layers.insert(layer);
        }

        if !is_road(tags) {
            continue;
        }

        let points = node_ids
            .iter()
            .map(|node| {
                nodes.get(node).copied().ok_or(ClassifyError::MissingNode {
                    way: *id,
                    node: *node,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        ways.push(Way::new(*id, tags.clone(), node_ids.clone(), points));
    }

    let junctions = find_junctions(&ways);

    debug!(
        elements = elements.len(),
        roads = ways.len(),
        junctions = junctions.len(),
        layers = layers.len(),
        "Classified map data"
    );

    Ok(RoadGraph::new(layers.into_iter().collect(), ways, junctions))
}

/// Builds a junction for every node shared by two or more roads.
fn find_junctions(ways: &[Way]) -> Vec<Junction> {
    let mut order = Vec::new();
    let mut touching: HashMap<u64, Vec<WayPoint>> = HashMap::new();

    for (index, way) in ways.iter().enumerate() {
        for (node, point) in way.node_ids().iter().zip(way.points()) {
            let members = touching.entry(*node).or_insert_with(|| {
                order.push(*node);
                Vec::new()
            });
            // Closed ways revisit their first node
            if members.iter().any(|member| member.way == index) {
                continue;
            }
            members.push(WayPoint {
                way: index,
                point: *point,
            });
        }
    }

    order
        .into_iter()
        .filter_map(|node| {
            let members = touching.remove(&node)?;
            Junction::new(node, members)
        })
        .collect()
}
