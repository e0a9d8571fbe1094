//! Editor configuration.

use crate::geometry::{Point, Size};
use crate::model::Color;

/// Geometry and defaults for the slide editor.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Slide canvas size in pixels
    pub canvas: Size,

    /// Position of the first card added from the library
    pub cascade_origin: f32,

    /// Per-card offset applied to cards added from the library
    pub cascade_step: f32,

    /// Smallest size a resize may produce
    pub min_card_size: Size,

    /// Size of new text cards
    pub text_card_size: Size,

    /// Size of new image cards
    pub image_card_size: Size,

    /// Font size range for cards created from extracted text
    pub min_font_size: f32,
    pub max_font_size: f32,

    /// Font size when the source has none
    pub default_font_size: f32,

    /// Text color of new text cards
    pub text_color: Color,

    /// Background of new slides
    pub background: Color,

    /// Content of a blank text card
    pub placeholder_text: String,

    /// Where blank text cards and search images are placed
    pub new_card_origin: Point,
}

impl EditorConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the canvas size.
    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.canvas = Size::new(width, height);
        self
    }

    /// Set the minimum card size enforced while resizing.
    pub fn with_min_card_size(mut self, width: f32, height: f32) -> Self {
        self.min_card_size = Size::new(width, height);
        self
    }

    /// Set the background of new slides.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Clamp an extracted font size into the allowed range.
    pub fn card_font_size(&self, source: f32) -> f32 {
        let size = if source.is_finite() && source > 0.0 {
            source
        } else {
            self.default_font_size
        };
        size.max(self.min_font_size).min(self.max_font_size)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(960.0, 540.0),
            cascade_origin: 50.0,
            cascade_step: 20.0,
            min_card_size: Size::new(100.0, 50.0),
            text_card_size: Size::new(400.0, 100.0),
            image_card_size: Size::new(300.0, 200.0),
            min_font_size: 12.0,
            max_font_size: 32.0,
            default_font_size: 16.0,
            text_color: Color::rgb(0x33, 0x33, 0x33),
            background: Color::WHITE,
            placeholder_text: "Enter your text here".to_string(),
            new_card_origin: Point::new(100.0, 100.0),
        }
    }
}
