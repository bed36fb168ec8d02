//! Integration tests for the tile request path.
//!
//! Drives the cache and renderer together with a mock road source:
//! - one upstream fetch per base tile, shared by deeper tiles
//! - draw output for a small crossroads
//! - error propagation from the source to the caller
//!
//! Run with: `cargo test --test render_integration`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lanemap::cache::{CacheConfig, CacheError, TileCache};
use lanemap::coord::{BoundingBox, PixelPoint, TileKey};
use lanemap::osm::Element;
use lanemap::render::{
    DrawCall, Palette, PixmapSurface, RasterSurface, RecordingSurface, RenderError, Renderer,
    Rgba, TileRenderer, KERB_PADDING,
};
use lanemap::source::{RoadDataSource, SourceError};
use lanemap::tile::Tags;

// ============================================================================
// Mock Implementations
// ============================================================================

/// Source that returns a crossroads centred in the requested bounds.
///
/// West-east: residential, 2 lanes, sidewalks both sides.
/// North-south: primary, 4 lanes, on layer 1.
struct CrossroadsSource {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl CrossroadsSource {
    fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: Arc::clone(&calls),
                fail: false,
            },
            calls,
        )
    }

    fn failing() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }
}

impl RoadDataSource for CrossroadsSource {
    async fn fetch(&self, bounds: BoundingBox) -> Result<Vec<Element>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        if self.fail {
            return Err(SourceError::HttpError("HTTP 504".to_string()));
        }

        let mid_lat = (bounds.north + bounds.south) / 2.0;
        let mid_lon = (bounds.east + bounds.west) / 2.0;
        let node = |id, lat, lon| Element::Node {
            id,
            lat,
            lon,
            tags: Tags::new(),
        };

        Ok(vec![
            node(1, mid_lat, bounds.west),
            node(2, mid_lat, mid_lon),
            node(3, mid_lat, bounds.east),
            node(4, bounds.north, mid_lon),
            node(5, bounds.south, mid_lon),
            Element::Way {
                id: 100,
                nodes: vec![1, 2, 3],
                tags: [("highway", "residential"), ("sidewalk", "both")]
                    .into_iter()
                    .collect(),
            },
            Element::Way {
                id: 101,
                nodes: vec![4, 2, 5],
                tags: [("highway", "primary"), ("lanes", "4"), ("layer", "1")]
                    .into_iter()
                    .collect(),
            },
            Element::Way {
                id: 102,
                nodes: vec![1, 4],
                tags: [("highway", "footway")].into_iter().collect(),
            },
        ])
    }

    fn name(&self) -> &str {
        "crossroads"
    }
}

fn tile_renderer(source: CrossroadsSource) -> TileRenderer<CrossroadsSource> {
    TileRenderer::new(
        TileCache::new(source, CacheConfig::default()),
        Renderer::default(),
    )
}

/// Vertical extent of the first polygon drawn with `color`.
fn first_polygon_height(surface: &RecordingSurface, color: Rgba) -> f64 {
    let points = surface.polygons(color)[0];
    let (min, max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p: &PixelPoint| {
            (lo.min(p.y), hi.max(p.y))
        });
    max - min
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_render_png_for_base_tile() {
    let (source, calls) = CrossroadsSource::new();
    let renderer = tile_renderer(source);

    let png = renderer.render_png(16, 32740, 21790).await.unwrap();

    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deeper_tiles_share_one_fetch() {
    let (source, calls) = CrossroadsSource::new();
    let renderer = Arc::new(tile_renderer(source));

    // Every z18 tile inside base tile 16/32740/21790
    let mut handles = Vec::new();
    for dx in 0..4 {
        for dy in 0..4 {
            let renderer = Arc::clone(&renderer);
            handles.push(tokio::spawn(async move {
                let mut surface = RecordingSurface::new();
                renderer
                    .render_into(18, 32740 * 4 + dx, 21790 * 4 + dy, &mut surface)
                    .await
                    .map(|summary| (summary, surface.calls().len()))
            }));
        }
    }

    for handle in handles {
        let (summary, calls) = handle.await.unwrap().unwrap();
        assert_eq!(summary.roads, 2);
        assert!(calls > 0);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(renderer.cache().len(), 1);
    let stats = renderer.cache().stats();
    assert_eq!(stats.builds, 1);
    assert_eq!(stats.hits, 15);
}

#[tokio::test]
async fn test_crossroads_draw_order() {
    let (source, _) = CrossroadsSource::new();
    let renderer = tile_renderer(source);
    let palette = Palette::default();

    let mut surface = RecordingSurface::new();
    let summary = renderer
        .render_into(16, 32740, 21790, &mut surface)
        .await
        .unwrap();

    // Footway is not a road; each road has two segments
    assert_eq!(summary.roads, 2);
    assert_eq!(summary.segments, 4);
    // Residential: 1 divider x 2 segments, primary: 3 dividers x 2 segments
    assert_eq!(summary.dividers, 8);

    // The junction sits on layer 0 (first member is the residential road),
    // so its patch is drawn before anything from layer 1
    let first_layer_one = surface
        .calls()
        .iter()
        .position(|call| match call {
            DrawCall::Polygon { points, .. } => {
                points.len() == 6 && (points[0].x - points[1].x).abs() < 1e-6
            }
            DrawCall::Line { .. } => false,
        })
        .unwrap();
    let patch = surface
        .calls()
        .iter()
        .position(|call| matches!(call, DrawCall::Polygon { points, .. } if points.len() == 8))
        .unwrap();
    assert!(patch < first_layer_one);

    // Only the residential road has sidewalks
    assert_eq!(surface.polygons(palette.sidewalk).len(), 2);
    assert_eq!(surface.polygons(palette.kerb).len(), 4);
}

#[tokio::test]
async fn test_deeper_zoom_draws_wider_lanes() {
    let (source, calls) = CrossroadsSource::new();
    let renderer = tile_renderer(source);
    let kerb = Palette::default().kerb;

    let mut base = RecordingSurface::new();
    renderer.render_into(16, 32740, 21790, &mut base).await.unwrap();
    let mut deeper = RecordingSurface::new();
    renderer
        .render_into(17, 32740 * 2, 21790 * 2, &mut deeper)
        .await
        .unwrap();

    // Kerb padding is a fixed pixel width; the lanes inside it scale with zoom.
    // Both tiles share a north-west corner, so the scale doubles exactly.
    let lanes_only = |surface: &RecordingSurface| first_polygon_height(surface, kerb) - 2.0 * KERB_PADDING;
    let ratio = lanes_only(&deeper) / lanes_only(&base);
    assert!((ratio - 2.0).abs() < 1e-6, "ratio was {ratio}");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_pixmap_has_asphalt_at_crossing() {
    let (source, _) = CrossroadsSource::new();
    let renderer = tile_renderer(source);

    let mut surface = PixmapSurface::new().unwrap();
    renderer
        .render_into(18, 32740 * 4 + 1, 21790 * 4 + 1, &mut surface)
        .await
        .unwrap();

    // The crossing lies at this tile's south-east corner
    let corner = surface.pixel(254, 254).unwrap();
    assert_eq!(corner.a, 255);
    assert_eq!(surface.pixel(10, 10).unwrap().a, 0);
}

#[tokio::test]
async fn test_upstream_failure_reaches_caller() {
    let renderer = tile_renderer(CrossroadsSource::failing());

    let result = renderer.render_png(18, 130960, 87160).await;
    assert!(matches!(
        result,
        Err(RenderError::Cache(CacheError::Upstream(SourceError::HttpError(_))))
    ));
}

#[tokio::test]
async fn test_zoom_below_base_rejected() {
    let (source, calls) = CrossroadsSource::new();
    let renderer = tile_renderer(source);

    let mut surface = RecordingSurface::new();
    let result = renderer.render_into(12, 2046, 1361, &mut surface).await;

    assert!(matches!(
        result,
        Err(RenderError::Cache(CacheError::ZoomBelowBase {
            requested: 12,
            base: 16
        }))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(surface.calls().is_empty());
}

#[tokio::test]
async fn test_tile_outside_pyramid_rejected() {
    let (source, calls) = CrossroadsSource::new();
    let renderer = tile_renderer(source);

    let result = renderer.render_png(16, 70_000, 0).await;
    assert!(matches!(
        result,
        Err(RenderError::Cache(CacheError::InvalidTile(key))) if key == TileKey::new(16, 70_000, 0)
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_recording_surface_is_a_raster_surface() {
    fn draw(surface: &mut impl RasterSurface) {
        surface.fill_polygon(&[PixelPoint::new(0.0, 0.0)], Palette::default().surface);
    }
    let mut surface = RecordingSurface::new();
    draw(&mut surface);
    assert_eq!(surface.calls().len(), 1);
}
