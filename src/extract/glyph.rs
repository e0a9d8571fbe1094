//! Positioned glyph runs and the page viewport they are measured against.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A PDF affine matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transform(pub [f32; 6]);

impl Transform {
    pub const IDENTITY: Transform = Transform([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Transform([a, b, c, d, e, f])
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Transform([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self × other`, i.e. apply `self` first and then `other`.
    pub fn then(&self, other: &Transform) -> Transform {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Transform([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    /// Map a point through the matrix.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Font size implied by the 2×2 submatrix: `sqrt(a² + b²)`.
    pub fn font_size(&self) -> f32 {
        self.0[0].hypot(self.0[1])
    }

    /// Length of the transformed y unit vector: `sqrt(c² + d²)`.
    pub fn vertical_scale(&self) -> f32 {
        self.0[2].hypot(self.0[3])
    }

    pub fn x(&self) -> f32 {
        self.0[4]
    }

    pub fn y(&self) -> f32 {
        self.0[5]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

/// The coordinate frame a page is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Rendered width in pixels (page width × scale).
    pub width: f32,
    /// Rendered height in pixels (page height × scale).
    pub height: f32,
    pub scale: f32,
}

impl Viewport {
    /// Viewport for a page of the given size in PDF points.
    pub fn for_page(page_width: f32, page_height: f32, scale: f32) -> Self {
        Self {
            width: page_width * scale,
            height: page_height * scale,
            scale,
        }
    }

    /// Pixel dimensions of a bitmap covering this viewport.
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.width.ceil().max(1.0) as u32,
            self.height.ceil().max(1.0) as u32,
        )
    }
}

/// One text fragment as reported by a page's text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphRun {
    #[serde(rename = "str")]
    pub text: String,
    /// Page-space transform; `None` when the producer gave no geometry.
    #[serde(default)]
    pub transform: Option<Transform>,
    pub width: f32,
    pub height: f32,
}

impl GlyphRun {
    pub fn new(text: impl Into<String>, transform: Transform, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            transform: Some(transform),
            width,
            height,
        }
    }

    /// Resolve the run's geometry against a viewport height.
    ///
    /// `page` and `index` only label the error.
    pub fn place(&self, viewport_height: f32, page: u32, index: usize) -> Result<PlacedRun> {
        let malformed = |reason: &str| Error::MalformedGlyphRun {
            page,
            index,
            reason: reason.to_string(),
        };

        let transform = self
            .transform
            .ok_or_else(|| malformed("missing transform"))?;
        if !transform.is_finite() {
            return Err(malformed("non-finite transform"));
        }
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(malformed("non-finite width or height"));
        }

        Ok(PlacedRun {
            x: transform.x(),
            y: viewport_height - transform.y(),
            width: self.width,
            height: self.height,
            font_size: transform.font_size(),
        })
    }
}

/// A glyph run with its anchor flipped to a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedRun {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_size: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_size_from_submatrix() {
        assert_eq!(Transform::new(3.0, 4.0, 0.0, 5.0, 0.0, 0.0).font_size(), 5.0);
        assert_eq!(Transform::new(16.0, 0.0, 0.0, 16.0, 10.0, 20.0).font_size(), 16.0);
    }

    #[test]
    fn test_then_composes_translation_and_scale() {
        let scale = Transform::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        let shift = Transform::translation(10.0, 5.0);
        // Scale first, then shift.
        assert_eq!(scale.then(&shift).apply(1.0, 1.0), (12.0, 7.0));
        // Shift first, then scale.
        assert_eq!(shift.then(&scale).apply(1.0, 1.0), (22.0, 12.0));
    }

    #[test]
    fn test_place_flips_y() {
        let run = GlyphRun::new("Hi", Transform::new(16.0, 0.0, 0.0, 16.0, 72.0, 700.0), 20.0, 16.0);
        let placed = run.place(1584.0, 1, 0).unwrap();
        assert_eq!(placed.x, 72.0);
        assert_eq!(placed.y, 884.0);
        assert_eq!(placed.font_size, 16.0);
    }

    #[test]
    fn test_place_rejects_missing_transform() {
        let run = GlyphRun {
            text: "x".to_string(),
            transform: None,
            width: 1.0,
            height: 1.0,
        };
        let err = run.place(100.0, 3, 4).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedGlyphRun { page: 3, index: 4, .. }
        ));
    }

    #[test]
    fn test_place_rejects_nan() {
        let run = GlyphRun::new("x", Transform::new(f32::NAN, 0.0, 0.0, 1.0, 0.0, 0.0), 1.0, 1.0);
        assert!(run.place(100.0, 1, 0).is_err());

        let run = GlyphRun::new("x", Transform::IDENTITY, f32::INFINITY, 1.0);
        assert!(run.place(100.0, 1, 0).is_err());
    }

    #[test]
    fn test_glyph_run_json_shape() {
        let run: GlyphRun = serde_json::from_str(
            r#"{"str":"Hello","transform":[12,0,0,12,50,700],"width":30.5,"height":12}"#,
        )
        .unwrap();
        assert_eq!(run.text, "Hello");
        assert_eq!(run.transform.unwrap().x(), 50.0);

        let missing: GlyphRun =
            serde_json::from_str(r#"{"str":"a","width":1,"height":1}"#).unwrap();
        assert!(missing.transform.is_none());
    }

    #[test]
    fn test_viewport_for_page() {
        let vp = Viewport::for_page(612.0, 792.0, 2.0);
        assert_eq!(vp.width, 1224.0);
        assert_eq!(vp.height, 1584.0);
        assert_eq!(vp.pixel_size(), (1224, 1584));
    }
}
