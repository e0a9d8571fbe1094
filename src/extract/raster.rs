//! Minimal page rasterizer: composites placed images on a white canvas.
//!
//! Only raster content is drawn. Text and vector paths are not rendered.

use image::{Pixel, Rgba, RgbaImage};

use super::glyph::{Transform, Viewport};
use super::images::Bitmap;
use crate::error::{Error, Result};

/// Largest page bitmap the rasterizer allocates, in pixels.
pub const MAX_CANVAS_PIXELS: u64 = 64_000_000;

/// A page-sized pixel canvas in viewport coordinates.
pub struct PageCanvas {
    bitmap: Bitmap,
    viewport: Viewport,
}

impl PageCanvas {
    /// A white canvas covering the viewport.
    ///
    /// Fails with [`Error::CanvasTooLarge`] above [`MAX_CANVAS_PIXELS`].
    pub fn new(viewport: Viewport) -> Result<Self> {
        let (w, h) = viewport.pixel_size();
        if u64::from(w) * u64::from(h) > MAX_CANVAS_PIXELS {
            return Err(Error::CanvasTooLarge {
                width: w,
                height: h,
            });
        }
        Ok(Self {
            bitmap: RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])),
            viewport,
        })
    }

    /// Draw `image` into the unit square mapped by `ctm` (PDF image space).
    ///
    /// Rotation and skew are ignored: the image fills the axis-aligned
    /// bounding box of the transformed square. Only the part of that box
    /// inside the canvas is sampled, so images bleeding off the page cost
    /// no more than the page itself.
    pub fn draw_image(&mut self, image: &RgbaImage, ctm: &Transform) {
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(x, y)| {
            let (px, py) = ctm.apply(x, y);
            (
                px * self.viewport.scale,
                self.viewport.height - py * self.viewport.scale,
            )
        });

        let left = corners.iter().map(|c| c.0).fold(f32::INFINITY, f32::min);
        let right = corners.iter().map(|c| c.0).fold(f32::NEG_INFINITY, f32::max);
        let top = corners.iter().map(|c| c.1).fold(f32::INFINITY, f32::min);
        let bottom = corners.iter().map(|c| c.1).fold(f32::NEG_INFINITY, f32::max);

        if !(left.is_finite() && right.is_finite() && top.is_finite() && bottom.is_finite()) {
            return;
        }

        let (span_x, span_y) = (right - left, bottom - top);
        let (iw, ih) = image.dimensions();
        if span_x < 0.5 || span_y < 0.5 || iw == 0 || ih == 0 {
            return;
        }

        // Clip to the canvas before touching any pixel.
        let (cw, ch) = self.bitmap.dimensions();
        let x0 = left.max(0.0).round() as u32;
        let x1 = right.min(cw as f32).round() as u32;
        let y0 = top.max(0.0).round() as u32;
        let y1 = bottom.min(ch as f32).round() as u32;
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        // Nearest source pixel for each destination pixel centre.
        let source = |pos: u32, origin: f32, span: f32, len: u32| -> u32 {
            let t = (pos as f32 + 0.5 - origin) / span;
            ((t * len as f32) as u32).min(len - 1)
        };
        for py in y0..y1 {
            let sy = source(py, top, span_y, ih);
            for px in x0..x1 {
                let sx = source(px, left, span_x, iw);
                self.bitmap.get_pixel_mut(px, py).blend(image.get_pixel(sx, sy));
            }
        }
    }

    pub fn into_bitmap(self) -> Bitmap {
        self.bitmap
    }
}
