//! PDF content extraction: glyph runs → text blocks, paint ops → image regions.

pub mod backend;
pub mod glyph;
pub mod images;
mod options;
mod pipeline;
pub mod raster;
pub mod text_runs;

pub use backend::{LopdfBackend, PageSource};
pub use glyph::{GlyphRun, PlacedRun, Transform, Viewport};
pub use images::{Bitmap, BitmapEncoder, DetectedImage, PaintOp, PngEncoder, PLACEHOLDER_BOX};
pub use options::{ErrorMode, ExtractOptions, PageSelection, DEFAULT_SCALE};
pub use pipeline::{ConvertedPage, Conversion, Extractor, PageFailure, Progress};
pub use text_runs::{group_runs, TextBlock, TextBlockBuilder};
