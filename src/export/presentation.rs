//! Format-neutral description of a presentation, built from a deck.
//!
//! All frames are in inches on a 16:9 slide. The pptx writer turns a
//! [`PresentationSpec`] into a file; nothing here knows about OOXML.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Size;
use crate::model::{
    Alignment, Card, CardContent, Color, Deck, FitMode, ImageSource, Slide, VerticalAlign,
};

/// Slide width in inches.
pub const SLIDE_WIDTH_IN: f32 = 10.0;

/// Slide height in inches.
pub const SLIDE_HEIGHT_IN: f32 = 5.625;

/// CSS pixels to points.
pub const PX_TO_PT: f32 = 0.75;

/// A rectangle in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Frame {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// The whole slide.
    pub const fn full_slide() -> Self {
        Self::new(0.0, 0.0, SLIDE_WIDTH_IN, SLIDE_HEIGHT_IN)
    }
}

/// Fraction of the source image cut from each edge, 0.0..0.5.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Crop {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub frame: Frame,
    pub text: String,
    pub font_pt: f32,
    pub bold: bool,
    pub align: Alignment,
    pub valign: VerticalAlign,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBox {
    pub frame: Frame,
    pub source: ImageSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
}

/// One drawable on a slide, in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Text(TextBox),
    Image(ImageBox),
}

impl Shape {
    pub fn frame(&self) -> Frame {
        match self {
            Shape::Text(t) => t.frame,
            Shape::Image(i) => i.frame,
        }
    }
}

/// Full-bleed image behind a slide's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    pub source: ImageSource,
    /// Percent, 0 = opaque.
    pub transparency: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideSpec {
    pub background: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
    pub shapes: Vec<Shape>,
}

/// Document properties written into the package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationProperties {
    pub author: String,
    pub title: String,
    pub subject: String,
}

impl Default for PresentationProperties {
    fn default() -> Self {
        Self {
            author: "Doc Converter".to_string(),
            title: "Generated Presentation".to_string(),
            subject: "PDF to PPT Conversion".to_string(),
        }
    }
}

/// Options for building a [`PresentationSpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Editor canvas size the card geometry refers to
    pub canvas: Size,

    /// Transparency of background images, in percent
    pub background_transparency: u8,

    pub properties: PresentationProperties,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            canvas: Size::new(960.0, 540.0),
            background_transparency: 30,
            properties: PresentationProperties::default(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas(mut self, canvas: Size) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.properties.title = title.into();
        self
    }

    pub fn with_background_transparency(mut self, percent: u8) -> Self {
        self.background_transparency = percent.min(100);
        self
    }

    fn background_image(&self, source: &Option<ImageSource>) -> Option<BackgroundImage> {
        source.as_ref().map(|source| BackgroundImage {
            source: source.clone(),
            transparency: self.background_transparency,
        })
    }
}

/// A presentation ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationSpec {
    pub properties: PresentationProperties,
    pub slides: Vec<SlideSpec>,
}

impl PresentationSpec {
    /// Map every slide and card of a deck. Cards are emitted in z-order.
    pub fn from_deck(deck: &Deck, options: &ExportOptions) -> Result<Self> {
        if deck.is_empty() {
            return Err(Error::EmptyInput("No slides to export".to_string()));
        }
        let mapper = CanvasMapper::new(options.canvas);
        let slides = deck
            .slides
            .iter()
            .map(|slide| mapper.slide(slide, options))
            .collect();
        Ok(Self {
            properties: options.properties.clone(),
            slides,
        })
    }

    pub fn shape_count(&self) -> usize {
        self.slides.iter().map(|s| s.shapes.len()).sum()
    }
}

/// Converts canvas pixels to slide inches.
struct CanvasMapper {
    sx: f32,
    sy: f32,
}

impl CanvasMapper {
    fn new(canvas: Size) -> Self {
        let per = |inches: f32, px: f32| if px > 0.0 { inches / px } else { 0.0 };
        Self {
            sx: per(SLIDE_WIDTH_IN, canvas.width),
            sy: per(SLIDE_HEIGHT_IN, canvas.height),
        }
    }

    fn frame(&self, card: &Card) -> Frame {
        Frame::new(
            card.position.x * self.sx,
            card.position.y * self.sy,
            card.size.width * self.sx,
            card.size.height * self.sy,
        )
    }

    fn slide(&self, slide: &Slide, options: &ExportOptions) -> SlideSpec {
        SlideSpec {
            background: slide.background,
            background_image: options.background_image(&slide.background_image),
            shapes: slide.cards_by_z().into_iter().map(|c| self.card(c)).collect(),
        }
    }

    fn card(&self, card: &Card) -> Shape {
        let frame = self.frame(card);
        match &card.content {
            CardContent::Text { text, style } => Shape::Text(TextBox {
                frame,
                text: text.clone(),
                font_pt: style.font_size * PX_TO_PT,
                bold: false,
                align: style.align,
                valign: VerticalAlign::Top,
                color: style.color,
            }),
            CardContent::Image { source, fit } => {
                let (frame, crop) = fit_image(frame, source.dimensions(), *fit);
                Shape::Image(ImageBox {
                    frame,
                    source: source.clone(),
                    crop,
                })
            }
        }
    }
}

/// Place an image of known pixel size into `frame` according to `fit`.
///
/// Without dimensions the image is stretched to the frame.
pub fn fit_image(frame: Frame, dimensions: Option<(u32, u32)>, fit: FitMode) -> (Frame, Option<Crop>) {
    let Some((iw, ih)) = dimensions else {
        return (frame, None);
    };
    if frame.w <= 0.0 || frame.h <= 0.0 {
        return (frame, None);
    }
    let image_aspect = iw as f32 / ih as f32;
    let frame_aspect = frame.w / frame.h;

    match fit {
        FitMode::Fill => (frame, None),
        FitMode::Contain => {
            let (w, h) = if image_aspect > frame_aspect {
                (frame.w, frame.w / image_aspect)
            } else {
                (frame.h * image_aspect, frame.h)
            };
            let placed = Frame::new(
                frame.x + (frame.w - w) / 2.0,
                frame.y + (frame.h - h) / 2.0,
                w,
                h,
            );
            (placed, None)
        }
        FitMode::Cover => {
            let crop = if image_aspect > frame_aspect {
                let cut = (1.0 - frame_aspect / image_aspect) / 2.0;
                Crop {
                    left: cut,
                    right: cut,
                    ..Crop::default()
                }
            } else {
                let cut = (1.0 - image_aspect / frame_aspect) / 2.0;
                Crop {
                    top: cut,
                    bottom: cut,
                    ..Crop::default()
                }
            };
            (frame, Some(crop))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{CardId, ImagePayload, SlideId, TextStyle};

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    fn deck_with_cards() -> Deck {
        let mut slide = Slide::new(SlideId(1), Color::WHITE);
        slide.cards.push(Card {
            id: CardId(1),
            position: Point::new(96.0, 48.0),
            size: Size::new(384.0, 96.0),
            z_order: 2,
            selected: false,
            content: CardContent::Text {
                text: "Hello".to_string(),
                style: TextStyle::default(),
            },
        });
        slide.cards.push(Card {
            id: CardId(2),
            position: Point::new(0.0, 0.0),
            size: Size::new(300.0, 200.0),
            z_order: 1,
            selected: false,
            content: CardContent::Image {
                source: ImageSource::Embedded(ImagePayload::png(200, 100, vec![1u8, 2, 3])),
                fit: FitMode::Contain,
            },
        });
        let mut deck = Deck::new();
        deck.slides.push(slide);
        deck
    }

    #[test]
    fn test_empty_deck_is_rejected() {
        let err = PresentationSpec::from_deck(&Deck::new(), &ExportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
    }

    #[test]
    fn test_from_deck_geometry_and_order() {
        let spec = PresentationSpec::from_deck(&deck_with_cards(), &ExportOptions::default()).unwrap();
        assert_eq!(spec.slides.len(), 1);
        assert_eq!(spec.properties.author, "Doc Converter");

        let shapes = &spec.slides[0].shapes;
        assert_eq!(shapes.len(), 2);
        assert!(matches!(shapes[0], Shape::Image(_)));
        match &shapes[1] {
            Shape::Text(text) => {
                assert_close(text.frame.x, 1.0);
                assert_close(text.frame.y, 0.5);
                assert_close(text.frame.w, 4.0);
                assert_close(text.frame.h, 1.0);
                assert_close(text.font_pt, 12.0);
                assert_eq!(text.color.to_srgb(), "333333");
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_fit_contain_letterboxes() {
        let frame = Frame::new(0.0, 0.0, 3.0, 2.0);
        let (placed, crop) = fit_image(frame, Some((200, 100)), FitMode::Contain);
        assert!(crop.is_none());
        assert_close(placed.w, 3.0);
        assert_close(placed.h, 1.5);
        assert_close(placed.y, 0.25);
    }

    #[test]
    fn test_fit_cover_crops() {
        let frame = Frame::new(0.0, 0.0, 2.0, 2.0);
        let (placed, crop) = fit_image(frame, Some((200, 100)), FitMode::Cover);
        assert_eq!(placed, frame);
        let crop = crop.unwrap();
        assert_close(crop.left, 0.25);
        assert_close(crop.right, 0.25);
        assert_close(crop.top, 0.0);
    }

    #[test]
    fn test_fit_without_dimensions_stretches() {
        let frame = Frame::new(1.0, 1.0, 2.0, 2.0);
        assert_eq!(fit_image(frame, None, FitMode::Contain), (frame, None));
        assert_eq!(fit_image(frame, Some((5, 5)), FitMode::Fill), (frame, None));
    }

    #[test]
    fn test_background_image_transparency() {
        let mut deck = deck_with_cards();
        deck.slides[0].background_image = Some(ImageSource::remote("https://example.com/bg.jpg"));
        let options = ExportOptions::new().with_background_transparency(150);
        let spec = PresentationSpec::from_deck(&deck, &options).unwrap();
        let bg = spec.slides[0].background_image.as_ref().unwrap();
        assert_eq!(bg.transparency, 100);
    }
}
