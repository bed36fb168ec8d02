//! Coordinate conversion module
//!
//! Provides conversions between slippy-tile indices, geographic coordinates
//! (latitude/longitude) and tile-local pixel coordinates. Everything here is
//! pure math with no state.

mod types;

pub use types::{
    BoundingBox, CoordError, PixelPoint, Point, TileKey, EARTH_CIRCUMFERENCE, MAX_LAT, MAX_LON,
    MAX_ZOOM, MIN_LAT, MIN_LON, TILE_SIZE,
};

use std::f64::consts::PI;

/// Converts tile indices to the geographic position of the tile's
/// north-west corner.
///
/// Passing `(x + 1, y + 1)` yields the south-east corner of tile `(x, y)`.
#[inline]
pub fn tile_to_geo(zoom: u8, x: u32, y: u32) -> Point {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = x as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let lat_rad = (PI - 2.0 * PI * y as f64 / n).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    Point { lat, lon }
}

/// Converts geographic coordinates to the tile containing them.
///
/// # Arguments
///
/// * `point` - Latitude (-85.05112878 to 85.05112878) and longitude (-180 to 180)
/// * `zoom` - Zoom level (0 to 24)
#[inline]
pub fn geo_to_tile(point: Point, zoom: u8) -> Result<TileKey, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
        return Err(CoordError::InvalidLatitude(point.lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&point.lon) {
        return Err(CoordError::InvalidLongitude(point.lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = (n as u32).saturating_sub(1);

    let x = ((point.lon + 180.0) / 360.0 * n) as u32;
    let lat_rad = point.lat * PI / 180.0;
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n) as u32;

    // lon = 180 and lat = MIN_LAT land exactly on the far edge
    Ok(TileKey {
        zoom,
        x: x.min(max_index),
        y: y.min(max_index),
    })
}

/// Pixels per metre of ground distance for a tile whose north edge sits at
/// `nw_lat`.
///
/// Accounts for Mercator north-south compression: a metre near the poles
/// covers more pixels than a metre at the equator.
#[inline]
pub fn image_scale(nw_lat: f64, zoom: u8) -> f64 {
    let metres_per_pixel =
        EARTH_CIRCUMFERENCE * nw_lat.to_radians().cos() / 2.0_f64.powi(zoom as i32 + 8);
    1.0 / metres_per_pixel
}

/// Projects a geographic point into the 256×256 pixel square spanned by
/// `nw` and `se`.
///
/// Linear interpolation, no clamping: points outside the tile produce
/// pixel coordinates outside `0..256`.
#[inline]
pub fn geo_to_pixel(point: Point, nw: Point, se: Point) -> PixelPoint {
    PixelPoint {
        x: TILE_SIZE * (point.lon - nw.lon) / (se.lon - nw.lon),
        y: TILE_SIZE * (point.lat - nw.lat) / (se.lat - nw.lat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tile_to_geo_origin_is_pyramid_northwest() {
        for zoom in [0u8, 1, 5, 16, 20] {
            let nw = tile_to_geo(zoom, 0, 0);
            assert!((nw.lat - 85.0511).abs() < 1e-4, "zoom {} lat {}", zoom, nw.lat);
            assert_eq!(nw.lon, -180.0);
        }
    }

    #[test]
    fn test_tile_to_geo_at_equator() {
        // At zoom 10, tile 512,512 sits on the equator and prime meridian
        let p = tile_to_geo(10, 512, 512);
        assert!(p.lat.abs() < 1e-9);
        assert!(p.lon.abs() < 1e-9);
    }

    #[test]
    fn test_new_york_city_at_zoom_16() {
        let tile = geo_to_tile(Point::new(40.7128, -74.0060), 16).unwrap();
        assert_eq!(tile, TileKey::new(16, 19295, 24640));
    }

    #[test]
    fn test_geo_to_tile_invalid_latitude() {
        let result = geo_to_tile(Point::new(90.0, 0.0), 10);
        assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
    }

    #[test]
    fn test_geo_to_tile_invalid_zoom() {
        let result = geo_to_tile(Point::new(0.0, 0.0), 30);
        assert_eq!(result, Err(CoordError::InvalidZoom(30)));
    }

    #[test]
    fn test_geo_to_tile_far_edge_clamped() {
        let tile = geo_to_tile(Point::new(MIN_LAT, 180.0), 3).unwrap();
        assert_eq!(tile, TileKey::new(3, 7, 7));
    }

    #[test]
    fn test_image_scale_equator_zoom_zero() {
        // One 256 pixel tile spans the whole circumference
        let scale = image_scale(0.0, 0);
        assert!((scale - 256.0 / EARTH_CIRCUMFERENCE).abs() < 1e-15);
    }

    #[test]
    fn test_image_scale_grows_with_latitude() {
        assert!(image_scale(60.0, 16) > image_scale(0.0, 16));
        // cos(60°) = 0.5
        let ratio = image_scale(60.0, 16) / image_scale(0.0, 16);
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_image_scale_doubles_per_zoom() {
        let ratio = image_scale(51.5, 17) / image_scale(51.5, 16);
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_geo_to_pixel_outside_tile_is_not_clamped() {
        let nw = tile_to_geo(16, 100, 100);
        let se = tile_to_geo(16, 101, 101);
        let beyond = tile_to_geo(16, 102, 102);
        let px = geo_to_pixel(beyond, nw, se);
        assert!(px.x > 256.0);
        assert!(px.y > 256.0);
    }

    #[test]
    fn test_ancestor_key() {
        let key = TileKey::new(18, 1000, 2001);
        assert_eq!(key.ancestor(16), Some(TileKey::new(16, 250, 500)));
        assert_eq!(key.ancestor(18), Some(key));
        assert_eq!(key.ancestor(19), None);
    }

    #[test]
    fn test_tile_key_validity() {
        assert!(TileKey::new(0, 0, 0).is_valid());
        assert!(TileKey::new(16, 65_535, 65_535).is_valid());
        assert!(TileKey::new(MAX_ZOOM, (1 << MAX_ZOOM) - 1, 0).is_valid());
        assert!(!TileKey::new(16, 65_536, 0).is_valid());
        assert!(!TileKey::new(16, 0, 70_000).is_valid());
        assert!(!TileKey::new(MAX_ZOOM + 1, 0, 0).is_valid());
        assert!(!TileKey::new(48, 0, 0).is_valid());
    }

    #[test]
    fn test_ancestor_with_wide_zoom_gap() {
        let key = TileKey::new(48, u32::MAX, 7);
        assert_eq!(key.ancestor(16), Some(TileKey::new(16, 0, 0)));
        assert_eq!(key.ancestor(40), Some(TileKey::new(40, 0xFF_FFFF, 0)));
    }

    #[test]
    fn test_pixel_perpendicular() {
        let v = PixelPoint::new(1.0, 0.0).perpendicular();
        assert_eq!(v, PixelPoint::new(-0.0, 1.0));
    }

    proptest! {
        /// Property: a tile's own corners project onto the pixel square corners.
        #[test]
        fn prop_corners_project_to_square(zoom in 1u8..20, fx in 0.0f64..1.0, fy in 0.0f64..1.0) {
            let n = 1u32 << zoom;
            let x = ((n - 1) as f64 * fx) as u32;
            let y = ((n - 1) as f64 * fy) as u32;
            let nw = tile_to_geo(zoom, x, y);
            let se = tile_to_geo(zoom, x + 1, y + 1);

            let origin = geo_to_pixel(nw, nw, se);
            prop_assert!(origin.x.abs() < 1e-9 && origin.y.abs() < 1e-9);

            let far = geo_to_pixel(se, nw, se);
            prop_assert!((far.x - 256.0).abs() < 1e-6 && (far.y - 256.0).abs() < 1e-6);
        }

        /// Property: projecting a tile origin back into the same tile lands on its NW pixel.
        #[test]
        fn prop_tile_origin_round_trips(zoom in 0u8..20, fx in 0.0f64..1.0, fy in 0.0f64..1.0) {
            let n = 1u32 << zoom;
            let x = ((n - 1) as f64 * fx) as u32;
            let y = ((n - 1) as f64 * fy) as u32;
            let nw = tile_to_geo(zoom, x, y);
            let se = tile_to_geo(zoom, x + 1, y + 1);
            let p = geo_to_pixel(tile_to_geo(zoom, x, y), nw, se);
            prop_assert_eq!(p, PixelPoint::new(0.0, 0.0));
        }

        /// Property: the inner point of a tile maps back to that tile.
        #[test]
        fn prop_geo_to_tile_inverts_tile_to_geo(zoom in 1u8..18, fx in 0.0f64..1.0, fy in 0.05f64..0.95) {
            let n = 1u32 << zoom;
            let x = ((n - 1) as f64 * fx) as u32;
            let y = ((n - 1) as f64 * fy) as u32;
            let nw = tile_to_geo(zoom, x, y);
            let se = tile_to_geo(zoom, x + 1, y + 1);
            let centre = Point::new((nw.lat + se.lat) / 2.0, (nw.lon + se.lon) / 2.0);
            prop_assert_eq!(geo_to_tile(centre, zoom).unwrap(), TileKey::new(zoom, x, y));
        }
    }
}
