//! Lane-level road rendering.
//!
//! Each road is drawn segment by segment as a set of parallel bands offset
//! from its centreline. Passes run back to front within every layer:
//!
//! 1. sidewalk band (only where the tags declare a sidewalk)
//! 2. kerb band
//! 3. road surface, then junction patches
//! 4. dashed dividers between adjacent lanes
//!
//! Segments are independent; overlapping pointed caps hide the seams at
//! bends instead of explicit joins.
//!
//! In pixel space y grows southward, so the offset direction `(-dy, dx)`
//! points to the right of travel. Left-side lanes sit at negative offsets.

mod surface;

pub use surface::{DrawCall, PixmapSurface, RasterSurface, RecordingSurface, Rgba};

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::{CacheError, TileCache};
use crate::coord::PixelPoint;
use crate::lanes::{self, Lane, Sidewalks};
use crate::source::RoadDataSource;
use crate::tile::{Junction, Tile, TileError};

/// Extra half-width added outside the lanes for the kerb and sidewalk edge.
pub const KERB_PADDING: f64 = 2.0;

/// Extra half-width added outside the lanes for the road surface.
pub const SURFACE_PADDING: f64 = 1.0;

/// Divider stroke width in pixels.
pub const DIVIDER_WIDTH: f32 = 1.0;

/// Divider dash pattern (on, off) in pixels.
pub const DIVIDER_DASH: [f32; 2] = [3.0, 3.0];

/// Segments shorter than this are skipped.
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// Errors that can occur while rendering a tile.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The tile could not be resolved.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The tile has no road graph.
    #[error(transparent)]
    Tile(#[from] TileError),

    /// The drawing surface could not be created.
    #[error("Surface error: {0}")]
    Surface(String),

    /// The image could not be encoded.
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Fixed colours for each render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub sidewalk: Rgba,
    pub kerb: Rgba,
    pub surface: Rgba,
    pub divider: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            sidewalk: Rgba::opaque(0xd6, 0xd2, 0xc9),
            kerb: Rgba::opaque(0x9a, 0x96, 0x8f),
            surface: Rgba::opaque(0x4a, 0x4a, 0x4f),
            divider: Rgba::opaque(0xff, 0xff, 0xff),
        }
    }
}

/// Counts of what was drawn for one tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Roads with at least one lane.
    pub roads: usize,
    /// Segments drawn across all roads.
    pub segments: usize,
    /// Filled polygons.
    pub polygons: usize,
    /// Divider strokes.
    pub dividers: usize,
}

/// Octagonal surface patch covering one junction centre.
#[derive(Debug, Clone, Copy)]
struct JunctionPatch {
    centre: PixelPoint,
    radius: f64,
}

impl JunctionPatch {
    fn outline(&self) -> [PixelPoint; 8] {
        std::array::from_fn(|i| {
            let angle = std::f64::consts::FRAC_PI_4 * i as f64;
            PixelPoint::new(
                self.centre.x + self.radius * angle.cos(),
                self.centre.y + self.radius * angle.sin(),
            )
        })
    }
}

/// A road prepared for drawing in one tile's pixel space.
struct ProjectedRoad {
    layer: i32,
    lanes: Vec<Lane>,
    sidewalks: Sidewalks,
    pixels: Vec<PixelPoint>,
}

impl ProjectedRoad {
    /// Half of the lanes' total width in pixels.
    fn lane_half_width(&self, lane_px: f64) -> f64 {
        lane_px * lanes::total_width(&self.lanes) / 2.0
    }

    fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.pixels
            .windows(2)
            .filter_map(|pair| Segment::new(pair[0], pair[1]))
    }
}

/// One straight piece of a road in pixel space.
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: PixelPoint,
    end: PixelPoint,
    direction: PixelPoint,
    normal: PixelPoint,
}

impl Segment {
    fn new(start: PixelPoint, end: PixelPoint) -> Option<Self> {
        let delta = start.to(end);
        let length = delta.length();
        if length < MIN_SEGMENT_LENGTH {
            return None;
        }
        let direction = PixelPoint::new(delta.x / length, delta.y / length);
        Some(Self {
            start,
            end,
            direction,
            normal: direction.perpendicular(),
        })
    }

    /// Hexagon covering the band from `left` pixels left of the centreline
    /// to `right` pixels right of it, with pointed caps at both ends.
    fn band(&self, left: f64, right: f64) -> [PixelPoint; 6] {
        let cap = (left + right) / 2.0;
        let middle = (right - left) / 2.0;
        [
            self.start.offset(self.normal, -left),
            self.end.offset(self.normal, -left),
            self.end.offset(self.normal, middle).offset(self.direction, cap),
            self.end.offset(self.normal, right),
            self.start.offset(self.normal, right),
            self.start.offset(self.normal, middle).offset(self.direction, -cap),
        ]
    }

    /// Line parallel to the segment, `offset` pixels to its right.
    fn parallel(&self, offset: f64) -> (PixelPoint, PixelPoint) {
        (
            self.start.offset(self.normal, offset),
            self.end.offset(self.normal, offset),
        )
    }
}

/// Draws road graphs onto a [`RasterSurface`].
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    palette: Palette,
}

impl Renderer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Renders every road of `tile`'s graph in its pixel space.
    pub fn render<R: RasterSurface>(
        &self,
        tile: &Tile,
        surface: &mut R,
    ) -> Result<RenderSummary, TileError> {
        let graph = tile.graph()?;
        let lane_px = tile.lane_width_pixels();

        let roads: Vec<Option<ProjectedRoad>> = graph
            .ways()
            .iter()
            .map(|way| {
                let lanes = lanes::compute_lanes(way);
                if lanes.is_empty() {
                    return None;
                }
                Some(ProjectedRoad {
                    layer: way.layer(),
                    lanes,
                    sidewalks: lanes::sidewalks(way.tags()),
                    pixels: way.points().iter().map(|p| tile.to_pixel(*p)).collect(),
                })
            })
            .collect();

        // Roads with malformed layer tags draw at layer 0 even if the tile
        // has no other layer-0 way
        let layers: BTreeSet<i32> = graph
            .layers()
            .iter()
            .copied()
            .chain(roads.iter().flatten().map(|road| road.layer))
            .collect();

        let junctions = Self::junction_patches(tile, graph.junctions(), &roads, lane_px);

        let mut summary = RenderSummary {
            roads: roads.iter().flatten().count(),
            ..Default::default()
        };

        for layer in layers {
            let in_layer: Vec<&ProjectedRoad> = roads
                .iter()
                .flatten()
                .filter(|road| road.layer == layer)
                .collect();
            if in_layer.is_empty() {
                continue;
            }

            for road in &in_layer {
                self.draw_sidewalks(road, lane_px, surface, &mut summary);
            }
            for road in &in_layer {
                let half_width = road.lane_half_width(lane_px) + KERB_PADDING;
                self.draw_band(road, half_width, self.palette.kerb, surface, &mut summary);
            }
            for road in &in_layer {
                let half_width = road.lane_half_width(lane_px) + SURFACE_PADDING;
                self.draw_band(road, half_width, self.palette.surface, surface, &mut summary);
            }
            if let Some(patches) = junctions.get(&layer) {
                self.draw_junctions(patches, surface, &mut summary);
            }
            for road in &in_layer {
                summary.segments += road.segments().count();
                self.draw_dividers(road, lane_px, surface, &mut summary);
            }
        }

        debug!(
            tile = %tile.key(),
            roads = summary.roads,
            segments = summary.segments,
            polygons = summary.polygons,
            dividers = summary.dividers,
            "Rendered tile"
        );
        Ok(summary)
    }

    fn draw_sidewalks<R: RasterSurface>(
        &self,
        road: &ProjectedRoad,
        lane_px: f64,
        surface: &mut R,
        summary: &mut RenderSummary,
    ) {
        if !road.sidewalks.any() {
            return;
        }
        let edge = road.lane_half_width(lane_px) + KERB_PADDING;
        let extra = lane_px / 2.0;
        let left = edge + if road.sidewalks.left { extra } else { 0.0 };
        let right = edge + if road.sidewalks.right { extra } else { 0.0 };

        for segment in road.segments() {
            surface.fill_polygon(&segment.band(left, right), self.palette.sidewalk);
            summary.polygons += 1;
        }
    }

    fn draw_band<R: RasterSurface>(
        &self,
        road: &ProjectedRoad,
        half_width: f64,
        color: Rgba,
        surface: &mut R,
        summary: &mut RenderSummary,
    ) {
        for segment in road.segments() {
            surface.fill_polygon(&segment.band(half_width, half_width), color);
            summary.polygons += 1;
        }
    }

    /// Groups junction patches by the layer of their first member road
    /// that has lanes. Junctions with no such member are dropped.
    fn junction_patches(
        tile: &Tile,
        junctions: &[Junction],
        roads: &[Option<ProjectedRoad>],
        lane_px: f64,
    ) -> BTreeMap<i32, Vec<JunctionPatch>> {
        let mut by_layer: BTreeMap<i32, Vec<JunctionPatch>> = BTreeMap::new();
        for junction in junctions {
            let members: Vec<&ProjectedRoad> = junction
                .members()
                .iter()
                .filter_map(|member| roads.get(member.way).and_then(Option::as_ref))
                .collect();
            let Some(first) = members.first() else {
                continue;
            };

            let radius = members
                .iter()
                .map(|road| road.lane_half_width(lane_px) + SURFACE_PADDING)
                .fold(0.0, f64::max);

            by_layer.entry(first.layer).or_default().push(JunctionPatch {
                centre: tile.to_pixel(junction.point()),
                radius,
            });
        }
        by_layer
    }

    /// Covers junction centres with road surface so crossing roads merge.
    fn draw_junctions<R: RasterSurface>(
        &self,
        patches: &[JunctionPatch],
        surface: &mut R,
        summary: &mut RenderSummary,
    ) {
        for patch in patches {
            surface.fill_polygon(&patch.outline(), self.palette.surface);
            summary.polygons += 1;
        }
    }

    fn draw_dividers<R: RasterSurface>(
        &self,
        road: &ProjectedRoad,
        lane_px: f64,
        surface: &mut R,
        summary: &mut RenderSummary,
    ) {
        if road.lanes.len() < 2 {
            return;
        }
        let half = road.lane_half_width(lane_px);

        for segment in road.segments() {
            let mut covered = 0.0;
            for lane in &road.lanes[..road.lanes.len() - 1] {
                covered += lane.width * lane_px;
                let (from, to) = segment.parallel(covered - half);
                surface.stroke_line(
                    from,
                    to,
                    self.palette.divider,
                    DIVIDER_WIDTH,
                    Some(&DIVIDER_DASH[..]),
                );
                summary.dividers += 1;
            }
        }
    }
}

/// Resolves tiles through a [`TileCache`] and renders them to PNG.
pub struct TileRenderer<S: RoadDataSource> {
    cache: TileCache<S>,
    renderer: Renderer,
}

impl<S: RoadDataSource> TileRenderer<S> {
    pub fn new(cache: TileCache<S>, renderer: Renderer) -> Self {
        Self { cache, renderer }
    }

    pub fn cache(&self) -> &TileCache<S> {
        &self.cache
    }

    /// Resolves `(zoom, x, y)` and draws it onto `surface`.
    pub async fn render_into<R: RasterSurface>(
        &self,
        zoom: u8,
        x: u32,
        y: u32,
        surface: &mut R,
    ) -> Result<RenderSummary, RenderError> {
        let tile = self.cache.resolve(zoom, x, y).await?;
        Ok(self.renderer.render(&tile, surface)?)
    }

    /// Resolves `(zoom, x, y)` and returns the rendered tile as PNG bytes.
    pub async fn render_png(&self, zoom: u8, x: u32, y: u32) -> Result<Vec<u8>, RenderError> {
        let mut surface = PixmapSurface::new()?;
        let summary = self.render_into(zoom, x, y, &mut surface).await?;
        let png = surface.encode_png()?;

        info!(
            zoom,
            x,
            y,
            roads = summary.roads,
            bytes = png.len(),
            "Rendered tile"
        );
        Ok(png)
    }
}
