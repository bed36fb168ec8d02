//! Drawing surfaces.
//!
//! [`RasterSurface`] is the only drawing capability the renderer needs.
//! [`PixmapSurface`] implements it with tiny-skia; [`RecordingSurface`]
//! keeps the draw calls instead of rasterising them.

use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use super::RenderError;
use crate::coord::{PixelPoint, TILE_SIZE};

/// An RGBA colour, not premultiplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

/// A 256×256 drawable with (0, 0) at the tile's north-west corner.
pub trait RasterSurface {
    /// Fills the closed polygon through `points`.
    fn fill_polygon(&mut self, points: &[PixelPoint], color: Rgba);

    /// Strokes a straight line, optionally dashed (alternating on/off lengths).
    fn stroke_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        color: Rgba,
        width: f32,
        dash: Option<&[f32]>,
    );
}

/// tiny-skia backed raster surface.
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// Allocates a transparent tile-sized pixmap.
    pub fn new() -> Result<Self, RenderError> {
        let size = TILE_SIZE as u32;
        let pixmap = Pixmap::new(size, size)
            .ok_or_else(|| RenderError::Surface(format!("cannot allocate {size}x{size} pixmap")))?;
        Ok(Self { pixmap })
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))
    }

    /// Reads back one pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        // tiny-skia only bounds-checks the flat index, so (width, 0) would
        // read the first pixel of the next row
        if x >= self.pixmap.width() || y >= self.pixmap.height() {
            return None;
        }
        let color = self.pixmap.pixel(x, y)?.demultiply();
        Some(Rgba::new(color.red(), color.green(), color.blue(), color.alpha()))
    }

    fn paint(color: Rgba) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;
        paint
    }
}

impl RasterSurface for PixmapSurface {
    fn fill_polygon(&mut self, points: &[PixelPoint], color: Rgba) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };

        let mut builder = PathBuilder::new();
        builder.move_to(first.x as f32, first.y as f32);
        for point in rest {
            builder.line_to(point.x as f32, point.y as f32);
        }
        builder.close();

        // Degenerate polygons produce no path
        if let Some(path) = builder.finish() {
            self.pixmap.fill_path(
                &path,
                &Self::paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        color: Rgba,
        width: f32,
        dash: Option<&[f32]>,
    ) {
        let mut builder = PathBuilder::new();
        builder.move_to(from.x as f32, from.y as f32);
        builder.line_to(to.x as f32, to.y as f32);

        let Some(path) = builder.finish() else {
            return;
        };

        let stroke = Stroke {
            width,
            dash: dash.and_then(|pattern| StrokeDash::new(pattern.to_vec(), 0.0)),
            ..Default::default()
        };

        self.pixmap.stroke_path(
            &path,
            &Self::paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Polygon {
        points: Vec<PixelPoint>,
        color: Rgba,
    },
    Line {
        from: PixelPoint,
        to: PixelPoint,
        color: Rgba,
        width: f32,
        dash: Option<Vec<f32>>,
    },
}

/// Surface that records draw calls in order.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Polygons drawn with `color`.
    pub fn polygons(&self, color: Rgba) -> Vec<&[PixelPoint]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Polygon { points, color: c } if *c == color => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    /// Number of line strokes.
    pub fn line_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DrawCall::Line { .. }))
            .count()
    }
}

impl RasterSurface for RecordingSurface {
    fn fill_polygon(&mut self, points: &[PixelPoint], color: Rgba) {
        self.calls.push(DrawCall::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn stroke_line(
        &mut self,
        from: PixelPoint,
        to: PixelPoint,
        color: Rgba,
        width: f32,
        dash: Option<&[f32]>,
    ) {
        self.calls.push(DrawCall::Line {
            from,
            to,
            color,
            width,
            dash: dash.map(<[f32]>::to_vec),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::opaque(255, 0, 0);

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = PixmapSurface::new().unwrap();
        assert_eq!(surface.pixel(0, 0), Some(Rgba::new(0, 0, 0, 0)));
        assert_eq!(surface.pixel(256, 0), None);
        assert_eq!(surface.pixel(0, 256), None);
        assert_eq!(surface.pixel(255, 255), Some(Rgba::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_pixel_past_row_end_does_not_wrap() {
        let mut surface = PixmapSurface::new().unwrap();
        let first_column_of_row_one = [
            PixelPoint::new(0.0, 1.0),
            PixelPoint::new(1.0, 1.0),
            PixelPoint::new(1.0, 2.0),
            PixelPoint::new(0.0, 2.0),
        ];
        surface.fill_polygon(&first_column_of_row_one, Rgba::new(255, 0, 0, 255));

        let painted = surface.pixel(0, 1).unwrap();
        assert!(painted.a > 0 && painted.r > 0);
        assert_eq!(surface.pixel(256, 0), None);
    }

    #[test]
    fn test_fill_polygon_paints_interior() {
        let mut surface = PixmapSurface::new().unwrap();
        let square = [
            PixelPoint::new(10.0, 10.0),
            PixelPoint::new(50.0, 10.0),
            PixelPoint::new(50.0, 50.0),
            PixelPoint::new(10.0, 50.0),
        ];
        surface.fill_polygon(&square, RED);

        assert_eq!(surface.pixel(30, 30), Some(RED));
        assert_eq!(surface.pixel(100, 100), Some(Rgba::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_fill_polygon_outside_tile_is_clipped() {
        let mut surface = PixmapSurface::new().unwrap();
        let square = [
            PixelPoint::new(-100.0, -100.0),
            PixelPoint::new(400.0, -100.0),
            PixelPoint::new(400.0, 400.0),
            PixelPoint::new(-100.0, 400.0),
        ];
        surface.fill_polygon(&square, RED);
        assert_eq!(surface.pixel(0, 0), Some(RED));
        assert_eq!(surface.pixel(255, 255), Some(RED));
    }

    #[test]
    fn test_empty_polygon_is_ignored() {
        let mut surface = PixmapSurface::new().unwrap();
        surface.fill_polygon(&[], RED);
        assert_eq!(surface.pixel(0, 0), Some(Rgba::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_stroke_line() {
        let mut surface = PixmapSurface::new().unwrap();
        surface.stroke_line(
            PixelPoint::new(0.0, 100.5),
            PixelPoint::new(256.0, 100.5),
            RED,
            3.0,
            None,
        );
        assert_eq!(surface.pixel(128, 100), Some(RED));
        assert_eq!(surface.pixel(128, 120), Some(Rgba::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_encode_png_signature() {
        let surface = PixmapSurface::new().unwrap();
        let png = surface.encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_recording_surface_keeps_order() {
        let mut surface = RecordingSurface::new();
        surface.fill_polygon(&[PixelPoint::new(0.0, 0.0)], RED);
        surface.stroke_line(
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(1.0, 1.0),
            RED,
            1.0,
            Some(&[2.0, 2.0]),
        );

        assert_eq!(surface.calls().len(), 2);
        assert_eq!(surface.polygons(RED).len(), 1);
        assert_eq!(surface.line_count(), 1);
        assert!(matches!(
            &surface.calls()[1],
            DrawCall::Line { dash: Some(d), .. } if d == &vec![2.0, 2.0]
        ));
    }
}
