//! Coordinate type definitions

use std::fmt;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Deepest zoom level accepted by the slippy-tile helpers.
pub const MAX_ZOOM: u8 = 24;

/// Edge length of a rendered tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Equatorial circumference of the earth in metres.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_016.686;

/// Tile coordinates in the Web Mercator / Slippy Map pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileKey {
    /// Creates a new tile key.
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Returns true if the key lies inside the tile pyramid: `zoom` at most
    /// [`MAX_ZOOM`] and both `x` and `y` below `2^zoom`.
    pub fn is_valid(&self) -> bool {
        if self.zoom > MAX_ZOOM {
            return false;
        }
        let tiles = 1u32 << self.zoom;
        self.x < tiles && self.y < tiles
    }

    /// Returns the key of the enclosing tile at a shallower zoom level.
    ///
    /// Returns `None` if `zoom` is deeper than this key's own zoom.
    #[inline]
    pub fn ancestor(&self, zoom: u8) -> Option<TileKey> {
        if zoom > self.zoom {
            return None;
        }
        let shift = u32::from(self.zoom - zoom);
        Some(TileKey {
            zoom,
            x: self.x.checked_shr(shift).unwrap_or(0),
            y: self.y.checked_shr(shift).unwrap_or(0),
        })
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.7}, {:.7})", self.lat, self.lon)
    }
}

/// A position in tile-local pixel space.
///
/// (0, 0) is the tile's north-west corner; x grows east, y grows south.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when interpreted as a vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Vector pointing from `self` to `other`.
    pub fn to(&self, other: PixelPoint) -> PixelPoint {
        PixelPoint::new(other.x - self.x, other.y - self.y)
    }

    /// Moves this point along `direction` by `distance`.
    pub fn offset(&self, direction: PixelPoint, distance: f64) -> PixelPoint {
        PixelPoint::new(self.x + direction.x * distance, self.y + direction.y * distance)
    }

    /// Rotates the vector by 90 degrees: (dx, dy) -> (-dy, dx).
    pub fn perpendicular(&self) -> PixelPoint {
        PixelPoint::new(-self.y, self.x)
    }
}

/// Geographic bounding box used to query map data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Builds a bounding box from a tile's north-west and south-east corners.
    pub fn from_corners(nw: Point, se: Point) -> Self {
        Self {
            south: se.lat,
            west: nw.lon,
            north: nw.lat,
            east: se.lon,
        }
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude outside valid Web Mercator range
    InvalidLatitude(f64),
    /// Longitude outside valid range
    InvalidLongitude(f64),
    /// Zoom level outside valid range
    InvalidZoom(u8),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude: {} (must be between {} and {})", lat, MIN_LAT, MAX_LAT)
            }
            CoordError::InvalidLongitude(lon) => {
                write!(f, "Invalid longitude: {} (must be between {} and {})", lon, MIN_LON, MAX_LON)
            }
            CoordError::InvalidZoom(zoom) => {
                write!(f, "Invalid zoom level: {} (must be at most {})", zoom, MAX_ZOOM)
            }
        }
    }
}

impl std::error::Error for CoordError {}
