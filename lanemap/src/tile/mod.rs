//! Tiles and their road graphs.
//!
//! A [`Tile`] at the cache's base zoom owns a [`RoadGraph`] that is set
//! exactly once by the build that created it. Tiles requested at deeper zoom
//! levels are lightweight views: their own corners and image scale, but the
//! same `Arc<RoadGraph>` as their base-zoom ancestor.
//!
//! # Example
//!
//! ```
//! use lanemap::tile::{RoadGraph, Tile};
//! use lanemap::coord::TileKey;
//!
//! let base = Tile::new(TileKey::new(16, 100, 200));
//! base.set_graph(RoadGraph::default()).unwrap();
//!
//! let view = Tile::view(TileKey::new(18, 401, 802), &base).unwrap();
//! assert!(std::sync::Arc::ptr_eq(base.graph().unwrap(), view.graph().unwrap()));
//! ```

mod graph;

pub use graph::{Junction, RoadGraph, Tags, Way, WayPoint};

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::coord::{self, BoundingBox, PixelPoint, Point, TileKey};

/// Nominal width of one driving lane in metres.
pub const LANE_WIDTH_METERS: f64 = 2.0;

/// Errors raised when a tile's graph is used out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// The graph has already been published for this tile.
    #[error("Road graph for tile {0} was already built")]
    GraphAlreadyBuilt(TileKey),

    /// The graph has not been published yet.
    #[error("Road graph for tile {0} is not built yet")]
    GraphNotBuilt(TileKey),

    /// A view was requested over a tile that does not contain it.
    #[error("Tile {ancestor} is not an ancestor of {key}")]
    NotAnAncestor { ancestor: TileKey, key: TileKey },
}

/// A 256×256 pixel map tile and its projection window.
#[derive(Debug)]
pub struct Tile {
    key: TileKey,
    nw: Point,
    se: Point,
    image_scale: f64,
    graph: OnceLock<Arc<RoadGraph>>,
}

impl Tile {
    /// Creates a tile with no road graph yet.
    pub fn new(key: TileKey) -> Self {
        let nw = coord::tile_to_geo(key.zoom, key.x, key.y);
        let se = coord::tile_to_geo(key.zoom, key.x.saturating_add(1), key.y.saturating_add(1));
        Self {
            key,
            nw,
            se,
            image_scale: coord::image_scale(nw.lat, key.zoom),
            graph: OnceLock::new(),
        }
    }

    /// Creates a view at `key` that shares `ancestor`'s road graph.
    ///
    /// Fails if `ancestor` has no graph yet or does not contain `key`.
    pub fn view(key: TileKey, ancestor: &Tile) -> Result<Self, TileError> {
        if key.ancestor(ancestor.key.zoom) != Some(ancestor.key) {
            return Err(TileError::NotAnAncestor {
                ancestor: ancestor.key,
                key,
            });
        }
        let graph = Arc::clone(ancestor.graph()?);
        let tile = Self::new(key);
        // Freshly created, cannot already be set
        let _ = tile.graph.set(graph);
        Ok(tile)
    }

    /// Publishes the road graph. May be called exactly once.
    pub fn set_graph(&self, graph: RoadGraph) -> Result<(), TileError> {
        self.graph
            .set(Arc::new(graph))
            .map_err(|_| TileError::GraphAlreadyBuilt(self.key))
    }

    /// Returns the published road graph.
    pub fn graph(&self) -> Result<&Arc<RoadGraph>, TileError> {
        self.graph.get().ok_or(TileError::GraphNotBuilt(self.key))
    }

    pub fn is_built(&self) -> bool {
        self.graph.get().is_some()
    }

    pub fn key(&self) -> TileKey {
        self.key
    }

    /// North-west corner.
    pub fn nw(&self) -> Point {
        self.nw
    }

    /// South-east corner.
    pub fn se(&self) -> Point {
        self.se
    }

    /// Pixels per metre at this tile's north edge.
    pub fn image_scale(&self) -> f64 {
        self.image_scale
    }

    /// Geographic area covered by this tile.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_corners(self.nw, self.se)
    }

    /// Projects a point into this tile's pixel space.
    #[inline]
    pub fn to_pixel(&self, point: Point) -> PixelPoint {
        coord::geo_to_pixel(point, self.nw, self.se)
    }

    /// Width of one driving lane in pixels at this tile's latitude.
    pub fn lane_width_pixels(&self) -> f64 {
        LANE_WIDTH_METERS * self.image_scale
    }
}
