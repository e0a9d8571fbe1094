//! Output formats: PowerPoint decks, text documents and JSON.

pub mod documents;
mod json;
pub mod layout;
pub mod pptx;
pub mod presentation;

pub use documents::{export_text, format_date, DocumentBranding, DocumentFormat, ExportedFile};
pub use json::{to_json, JsonFormat};
pub use layout::{LayoutGeometry, LayoutSlide, SlideLayout, TextPlacement};
pub use pptx::{default_file_name, to_pptx_bytes, write_pptx};
pub use presentation::{
    fit_image, BackgroundImage, Crop, ExportOptions, Frame, ImageBox, PresentationProperties,
    PresentationSpec, Shape, SlideSpec, TextBox,
};
