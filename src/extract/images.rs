//! Image-region detection from a page's paint-operation trace.
//!
//! Every image-XObject paint yields one image element whose payload is
//! the whole rasterized page and whose box is a fixed placeholder. No
//! cropping and no deduplication: N paints give N elements. The encoded
//! page is shared between them instead of being re-encoded N times.

use std::io::Cursor;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Rect;
use crate::model::ImagePayload;

/// A rasterized page.
pub type Bitmap = image::RgbaImage;

/// Placeholder box given to every detected image.
pub const PLACEHOLDER_BOX: Rect = Rect {
    x: 50.0,
    y: 50.0,
    width: 200.0,
    height: 150.0,
};

/// Tag of one drawing operation in a page's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaintOp {
    /// An image XObject was painted (`Do` on an `/Image`).
    PaintImageXObject { name: String },
    /// A form XObject was painted.
    PaintFormXObject { name: String },
    ShowText,
    FillPath,
    StrokePath,
}

impl PaintOp {
    pub fn is_image_paint(&self) -> bool {
        matches!(self, PaintOp::PaintImageXObject { .. })
    }
}

/// Number of image paints in a trace.
pub fn count_image_paints(ops: &[PaintOp]) -> usize {
    ops.iter().filter(|op| op.is_image_paint()).count()
}

/// Turns a bitmap into an image payload.
pub trait BitmapEncoder {
    fn encode(&self, bitmap: &Bitmap) -> Result<ImagePayload>;
}

/// PNG encoder backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngEncoder;

impl BitmapEncoder for PngEncoder {
    fn encode(&self, bitmap: &Bitmap) -> Result<ImagePayload> {
        let mut buf = Vec::new();
        bitmap.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(ImagePayload::png(bitmap.width(), bitmap.height(), buf))
    }
}

/// An image found on a page, ready to enter the element library.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedImage {
    pub bounds: Rect,
    pub payload: ImagePayload,
}

/// Emits one [`DetectedImage`] per image paint in `ops`.
///
/// An encoding failure drops the affected image with a warning; it never
/// fails the page.
pub fn detect_images<E: BitmapEncoder + ?Sized>(
    ops: &[PaintOp],
    bitmap: &Bitmap,
    encoder: &E,
    page: u32,
) -> Vec<DetectedImage> {
    let mut encoded: Option<std::result::Result<ImagePayload, String>> = None;
    let mut images = Vec::new();

    for op in ops.iter().filter(|op| op.is_image_paint()) {
        let result = encoded.get_or_insert_with(|| encoder.encode(bitmap).map_err(|e| e.to_string()));
        match result {
            Ok(payload) => images.push(DetectedImage {
                bounds: PLACEHOLDER_BOX,
                payload: payload.clone(),
            }),
            Err(e) => log::warn!("Skipping image {:?} on page {}: {}", op, page, e),
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FailingEncoder;

    impl BitmapEncoder for FailingEncoder {
        fn encode(&self, _bitmap: &Bitmap) -> Result<ImagePayload> {
            Err(Error::ImageEncode("boom".to_string()))
        }
    }

    fn image_op(name: &str) -> PaintOp {
        PaintOp::PaintImageXObject {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_one_element_per_image_paint() {
        let bitmap = Bitmap::new(4, 4);
        let ops = vec![
            PaintOp::ShowText,
            image_op("Im1"),
            PaintOp::FillPath,
            image_op("Im1"),
            PaintOp::PaintFormXObject {
                name: "Fm0".to_string(),
            },
        ];
        let images = detect_images(&ops, &bitmap, &PngEncoder, 1);
        assert_eq!(images.len(), 2);
        for img in &images {
            assert_eq!(img.bounds, PLACEHOLDER_BOX);
            assert_eq!(img.payload.mime, "image/png");
            assert_eq!((img.payload.width, img.payload.height), (4, 4));
        }
        assert!(images[0].payload.shares_buffer(&images[1].payload));
    }

    #[test]
    fn test_png_signature() {
        let payload = PngEncoder.encode(&Bitmap::new(2, 3)).unwrap();
        assert!(payload.bytes().starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_encode_failure_skips_images() {
        let ops = vec![image_op("Im1"), image_op("Im2")];
        let images = detect_images(&ops, &Bitmap::new(1, 1), &FailingEncoder, 1);
        assert!(images.is_empty());
    }

    #[test]
    fn test_no_image_paints() {
        let ops = vec![PaintOp::ShowText, PaintOp::StrokePath];
        assert_eq!(count_image_paints(&ops), 0);
        assert!(detect_images(&ops, &Bitmap::new(1, 1), &PngEncoder, 1).is_empty());
    }
}
