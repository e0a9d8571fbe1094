//! Fixed-layout slides: a title, a body and at most one image per slide.

use serde::{Deserialize, Serialize};

use super::presentation::{
    BackgroundImage, ExportOptions, Frame, ImageBox, PresentationSpec, Shape, SlideSpec, TextBox,
};
use crate::error::{Error, Result};
use crate::model::{Alignment, Color, ImageSource, VerticalAlign};

const HEADING: Color = Color::rgb(0x36, 0x36, 0x36);
const BODY: Color = Color::rgb(0x66, 0x66, 0x66);

/// Slide layout variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlideLayout {
    Title,
    #[default]
    Content,
    TwoColumn,
    ImageLeft,
    ImageRight,
}

/// Where and how one text field is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub frame: Frame,
    pub font_pt: f32,
    pub bold: bool,
    pub align: Alignment,
    pub valign: VerticalAlign,
    pub color: Color,
}

impl TextPlacement {
    fn heading(frame: Frame, font_pt: f32) -> Self {
        Self {
            frame,
            font_pt,
            bold: true,
            align: Alignment::Left,
            valign: VerticalAlign::Middle,
            color: HEADING,
        }
    }

    fn body(frame: Frame) -> Self {
        Self {
            frame,
            font_pt: 18.0,
            bold: false,
            align: Alignment::Left,
            valign: VerticalAlign::Top,
            color: BODY,
        }
    }

    fn centered(mut self) -> Self {
        self.align = Alignment::Center;
        self.valign = VerticalAlign::Middle;
        self
    }

    fn place(&self, text: &str) -> Shape {
        Shape::Text(TextBox {
            frame: self.frame,
            text: text.to_string(),
            font_pt: self.font_pt,
            bold: self.bold,
            align: self.align,
            valign: self.valign,
            color: self.color,
        })
    }
}

/// Frames of one layout, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutGeometry {
    pub title: TextPlacement,
    pub content: TextPlacement,
    /// `None` when the layout has no image slot.
    pub image: Option<Frame>,
}

impl SlideLayout {
    pub fn geometry(self) -> LayoutGeometry {
        let title = TextPlacement::heading(Frame::new(0.5, 0.5, 9.0, 0.75), 32.0);
        match self {
            SlideLayout::Title => LayoutGeometry {
                title: TextPlacement::heading(Frame::new(1.0, 2.0, 8.0, 1.5), 44.0).centered(),
                content: TextPlacement {
                    font_pt: 24.0,
                    ..TextPlacement::body(Frame::new(1.0, 3.5, 8.0, 1.0)).centered()
                },
                image: None,
            },
            SlideLayout::Content => LayoutGeometry {
                title,
                content: TextPlacement::body(Frame::new(0.5, 1.5, 9.0, 3.0)),
                image: Some(Frame::new(6.0, 4.5, 3.0, 2.0)),
            },
            SlideLayout::TwoColumn => LayoutGeometry {
                title,
                content: TextPlacement::body(Frame::new(0.5, 1.5, 4.25, 4.0)),
                image: Some(Frame::new(5.25, 1.5, 4.25, 4.0)),
            },
            SlideLayout::ImageLeft => LayoutGeometry {
                title,
                content: TextPlacement::body(Frame::new(5.0, 1.5, 4.5, 4.0)),
                image: Some(Frame::new(0.5, 1.5, 4.0, 4.0)),
            },
            SlideLayout::ImageRight => LayoutGeometry {
                title,
                content: TextPlacement::body(Frame::new(0.5, 1.5, 4.5, 4.0)),
                image: Some(Frame::new(5.5, 1.5, 4.0, 4.0)),
            },
        }
    }
}

/// A slide in the flat title/content model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSlide {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub layout: SlideLayout,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
    #[serde(default)]
    pub background: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImageSource>,
}

impl LayoutSlide {
    pub fn new(layout: SlideLayout, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            layout,
            image: None,
            background: Color::WHITE,
            background_image: None,
        }
    }

    pub fn with_image(mut self, image: ImageSource) -> Self {
        self.image = Some(image);
        self
    }

    fn to_spec(&self, options: &ExportOptions) -> SlideSpec {
        let geometry = self.layout.geometry();
        let mut shapes = vec![geometry.title.place(&self.title)];
        let image = geometry.image.zip(self.image.clone()).map(|(frame, source)| {
            Shape::Image(ImageBox {
                frame,
                source,
                crop: None,
            })
        });
        let content = geometry.content.place(&self.content);
        match (self.layout, image) {
            (SlideLayout::ImageLeft | SlideLayout::ImageRight, Some(image)) => {
                shapes.push(image);
                shapes.push(content);
            }
            (_, image) => {
                shapes.push(content);
                shapes.extend(image);
            }
        }
        SlideSpec {
            background: self.background,
            background_image: self.background_image.clone().map(|source| BackgroundImage {
                source,
                transparency: options.background_transparency,
            }),
            shapes,
        }
    }
}

impl PresentationSpec {
    /// Build a presentation from fixed-layout slides.
    pub fn from_layouts(slides: &[LayoutSlide], options: &ExportOptions) -> Result<Self> {
        if slides.is_empty() {
            return Err(Error::EmptyInput("No slides to export".to_string()));
        }
        Ok(Self {
            properties: options.properties.clone(),
            slides: slides.iter().map(|s| s.to_spec(options)).collect(),
        })
    }
}
