//! # pdfdeck
//!
//! Turn PDF pages into editable slide decks.
//!
//! Each page's positioned text runs are grouped into text blocks, and its
//! image paint operations become image elements. Together they form an
//! element library. From it you build slides of movable, resizable cards,
//! then export them as a PowerPoint file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdeck::{export, Pdfdeck};
//!
//! fn main() -> pdfdeck::Result<()> {
//!     // One slide per page, every extracted element placed on its slide
//!     let editor = Pdfdeck::new().populate(true).open("document.pdf")?;
//!
//!     let spec = export::PresentationSpec::from_deck(editor.deck(), &Default::default())?;
//!     std::fs::write("deck.pptx", export::to_pptx_bytes(&spec)?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Text reconstruction**: runs merged into blocks by vertical and horizontal proximity
//! - **Image regions**: one element per image paint, backed by a shared page bitmap
//! - **Editor model**: cascade placement, z-order, drag/resize with canvas clamping
//! - **Export**: `.pptx` from decks or fixed layouts, plus PDF/Word/RTF/HTML/Markdown text documents
//! - **Services**: image search and grammar checks with offline fallbacks

pub mod detect;
pub mod editor;
pub mod error;
pub mod export;
pub mod extract;
pub mod geometry;
pub mod model;
pub mod services;

// Re-export commonly used types
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfHeader};
pub use editor::{Editor, EditorConfig, HitTarget, Interaction, Key, StyleUpdate};
pub use error::{Error, Result};
pub use export::{JsonFormat, PresentationSpec};
pub use extract::{
    Conversion, ErrorMode, ExtractOptions, Extractor, LopdfBackend, PageSelection, PageSource,
};
pub use geometry::{Point, Rect, Size};
pub use model::{
    Card, CardContent, CardId, Color, Deck, ElementId, ElementKind, ElementLibrary,
    ExtractedElement, ImagePayload, ImageSource, KindFilter, Slide, SlideId,
};

use std::path::Path;

/// Extract every page of a PDF file into an element library.
///
/// # Example
///
/// ```no_run
/// use pdfdeck::extract_file;
///
/// let conversion = extract_file("document.pdf").unwrap();
/// println!("{} elements", conversion.library.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Conversion> {
    extract_file_with_options(path, ExtractOptions::default())
}

/// Extract a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfdeck::{extract_file_with_options, ExtractOptions, PageSelection};
///
/// let options = ExtractOptions::new()
///     .with_pages(PageSelection::Range(1..=3))
///     .text_only();
/// let conversion = extract_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Conversion> {
    let backend = LopdfBackend::load_file(path)?;
    Extractor::new(backend).with_options(options).convert()
}

/// Extract a PDF held in memory.
pub fn extract_bytes(data: &[u8]) -> Result<Conversion> {
    extract_bytes_with_options(data, ExtractOptions::default())
}

/// Extract a PDF held in memory with custom options.
pub fn extract_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Conversion> {
    let backend = LopdfBackend::load_bytes(data)?;
    Extractor::new(backend).with_options(options).convert()
}

/// Export a deck as `.pptx` bytes with default options.
pub fn deck_to_pptx(deck: &Deck) -> Result<Vec<u8>> {
    let spec = PresentationSpec::from_deck(deck, &export::ExportOptions::default())?;
    export::to_pptx_bytes(&spec)
}

/// Builder that opens a PDF straight into an [`Editor`].
///
/// # Example
///
/// ```no_run
/// use pdfdeck::{PageSelection, Pdfdeck};
///
/// let editor = Pdfdeck::new()
///     .strict()
///     .with_pages(PageSelection::Pages(vec![1, 3]))
///     .populate(true)
///     .open("document.pdf")?;
/// assert!(editor.deck().len() <= 2);
/// # Ok::<(), pdfdeck::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pdfdeck {
    extract_options: ExtractOptions,
    editor_config: EditorConfig,
    populate: bool,
}

impl Pdfdeck {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first unreadable page.
    pub fn strict(mut self) -> Self {
        self.extract_options = self.extract_options.strict();
        self
    }

    /// Skip image detection.
    pub fn text_only(mut self) -> Self {
        self.extract_options = self.extract_options.text_only();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.extract_options = self.extract_options.with_pages(pages);
        self
    }

    /// Set the render scale used for geometry and bitmaps.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.extract_options = self.extract_options.with_scale(scale);
        self
    }

    /// Set the editor configuration.
    pub fn with_editor_config(mut self, config: EditorConfig) -> Self {
        self.editor_config = config;
        self
    }

    /// Place every extracted element on the slide of its page.
    pub fn populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<Editor> {
        let conversion = extract_file_with_options(path, self.extract_options.clone())?;
        Ok(self.into_editor(conversion))
    }

    /// Open a PDF held in memory.
    pub fn open_bytes(self, data: &[u8]) -> Result<Editor> {
        let conversion = extract_bytes_with_options(data, self.extract_options.clone())?;
        Ok(self.into_editor(conversion))
    }

    fn into_editor(self, conversion: Conversion) -> Editor {
        let mut editor = Editor::new(self.editor_config);
        editor.load_conversion(conversion);
        if self.populate {
            let placed = editor.populate_from_pages();
            log::debug!("Placed {} elements on {} slides", placed, editor.deck().len());
        }
        editor
    }
}
