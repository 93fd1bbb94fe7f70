use png::{BitDepth, ColorType, Encoder};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Rect, Transform,
};

use crate::error::{Error, Result};
use crate::image::BaseImage;
use crate::scene::{NodeKind, Scene};
use crate::{Color, Point};

/// Straight-alpha RGBA8 pixels. A zero-area raster is valid and has no pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Raster {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            rgba: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.rgba.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Lossless RGBA PNG. A zero-area raster encodes to an empty payload,
    /// since PNG has no representation for it.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let mut bytes = Vec::new();
        let mut encoder = Encoder::new(&mut bytes, self.width, self.height);
        encoder.set_color(ColorType::Rgba);
        encoder.set_depth(BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| Error::Rasterization(e.to_string()))?;
        writer
            .write_image_data(&self.rgba)
            .map_err(|e| Error::Rasterization(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| Error::Rasterization(e.to_string()))?;
        Ok(bytes)
    }
}

/// Largest surface rasterized, the same area browsers cap a canvas at.
pub const MAX_RASTER_PIXELS: u64 = 1 << 28;

/// Renders `scene` at `factor` device pixels per viewport pixel.
pub fn rasterize(scene: &Scene, factor: u32) -> Result<Raster> {
    let viewport = scene.viewport();
    let (width, height) = viewport.scaled(factor);
    if width == 0 || height == 0 {
        return Ok(Raster::empty());
    }
    if u64::from(width) * u64::from(height) > MAX_RASTER_PIXELS {
        return Err(Error::Rasterization(format!(
            "{width}x{height} exceeds the raster size limit"
        )));
    }
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Rasterization(format!("cannot allocate {width}x{height} surface")))?;
    let transform = Transform::from_scale(factor as f32, factor as f32);
    let logical_width = viewport.width() as f32;
    let logical_height = viewport.height() as f32;

    for node in scene.nodes() {
        match &node.kind {
            NodeKind::Background { color } => {
                if let Some(rect) = Rect::from_xywh(0.0, 0.0, logical_width, logical_height) {
                    pixmap.fill_rect(rect, &solid(*color), transform, None);
                }
            }
            NodeKind::Image { image } => {
                draw_image(&mut pixmap, image, logical_width, logical_height, transform)?;
            }
            NodeKind::Polyline {
                points,
                color,
                width,
            } => draw_polyline(&mut pixmap, points, *color, *width, transform),
        }
    }

    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Ok(Raster {
        width,
        height,
        rgba,
    })
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn draw_image(
    pixmap: &mut Pixmap,
    image: &BaseImage,
    width: f32,
    height: f32,
    transform: Transform,
) -> Result<()> {
    let Some(size) = IntSize::from_wh(image.width(), image.height()) else {
        return Ok(());
    };
    let premultiplied = image
        .rgba()
        .chunks_exact(4)
        .flat_map(|px| {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let source = Pixmap::from_vec(premultiplied, size)
        .ok_or_else(|| Error::Rasterization("base image buffer has the wrong size".into()))?;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    let fit = transform.pre_scale(
        width / image.width() as f32,
        height / image.height() as f32,
    );
    pixmap.draw_pixmap(0, 0, source.as_ref(), &paint, fit, None);
    Ok(())
}

fn draw_polyline(
    pixmap: &mut Pixmap,
    points: &[Point],
    color: Color,
    width: f32,
    transform: Transform,
) {
    let Some(first) = points.first() else {
        return;
    };
    let paint = solid(color);
    if points.iter().all(|point| point == first) {
        draw_dot(pixmap, *first, &paint, width, transform);
        return;
    }
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for point in &points[1..] {
        builder.line_to(point.x, point.y);
    }
    let Some(path) = builder.finish() else {
        draw_dot(pixmap, *first, &paint, width, transform);
        return;
    };
    let stroke = tiny_skia::Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
}

fn draw_dot(pixmap: &mut Pixmap, center: Point, paint: &Paint<'_>, width: f32, transform: Transform) {
    if let Some(path) = PathBuilder::from_circle(center.x, center.y, width / 2.0) {
        pixmap.fill_path(&path, paint, FillRule::Winding, transform, None);
    }
}
