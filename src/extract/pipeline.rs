//! Sequential page-by-page conversion into an element library.

use serde::Serialize;

use super::backend::PageSource;
use super::glyph::Viewport;
use super::images::{count_image_paints, detect_images, BitmapEncoder, PngEncoder};
use super::options::{ErrorMode, ExtractOptions};
use super::text_runs::group_runs;
use crate::error::Result;
use crate::geometry::Rect;
use crate::model::{ElementLibrary, ImagePayload};

/// A page that converted successfully.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedPage {
    /// 1-indexed page number.
    pub page: u32,
    pub viewport: Viewport,
    pub text_blocks: usize,
    pub images: usize,
}

/// A page that was skipped in lenient mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFailure {
    pub page: u32,
    pub error: String,
}

/// Result of converting one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversion {
    pub library: ElementLibrary,
    pub pages: Vec<ConvertedPage>,
    pub failures: Vec<PageFailure>,
}

impl Conversion {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Progress notification, sent before each page starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub page: u32,
    pub total: u32,
}

/// Elements of one page, held back until the whole page succeeds.
enum Pending {
    Text {
        bounds: Rect,
        content: String,
        font_size: f32,
    },
    Image {
        bounds: Rect,
        payload: ImagePayload,
    },
}

/// Converts every selected page of a [`PageSource`].
pub struct Extractor<S> {
    source: S,
    options: ExtractOptions,
    encoder: Box<dyn BitmapEncoder>,
}

impl<S: PageSource> Extractor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: ExtractOptions::default(),
            encoder: Box::new(PngEncoder),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the bitmap encoder used for image payloads.
    pub fn with_encoder(mut self, encoder: impl BitmapEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Convert all selected pages.
    pub fn convert(&self) -> Result<Conversion> {
        self.convert_with_progress(|_| {})
    }

    /// Convert all selected pages, reporting progress before each page.
    ///
    /// Pages run strictly one after another. In lenient mode a failing
    /// page is logged and left out, and conversion carries on.
    pub fn convert_with_progress<F: FnMut(Progress)>(&self, mut progress: F) -> Result<Conversion> {
        let total = self.source.page_count();
        let mut conversion = Conversion::default();

        for page in (1..=total).filter(|p| self.options.pages.includes(*p)) {
            progress(Progress { page, total });
            match self.extract_page(page) {
                Ok((summary, pending)) => {
                    commit(&mut conversion.library, page, pending);
                    conversion.pages.push(summary);
                }
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to convert page {}: {}", page, e);
                    conversion.failures.push(PageFailure {
                        page,
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "Converted {} of {} pages into {} elements",
            conversion.pages.len(),
            total,
            conversion.library.len()
        );
        Ok(conversion)
    }

    fn extract_page(&self, page: u32) -> Result<(ConvertedPage, Vec<Pending>)> {
        let viewport = self.source.viewport(page, self.options.scale)?;
        let runs = self.source.text_content(page)?;
        let blocks = group_runs(&runs, viewport.height, page)?;

        let mut pending: Vec<Pending> = blocks
            .into_iter()
            .map(|b| Pending::Text {
                bounds: b.bounds(),
                content: b.text.trim().to_string(),
                font_size: b.font_size,
            })
            .collect();
        let text_blocks = pending.len();

        let mut images = 0;
        if self.options.extract_images {
            let ops = self.source.operator_list(page)?;
            if count_image_paints(&ops) > 0 {
                let bitmap = self.source.rasterize(page, &viewport)?;
                for image in detect_images(&ops, &bitmap, self.encoder.as_ref(), page) {
                    pending.push(Pending::Image {
                        bounds: image.bounds,
                        payload: image.payload,
                    });
                    images += 1;
                }
            }
        }

        let summary = ConvertedPage {
            page,
            viewport,
            text_blocks,
            images,
        };
        Ok((summary, pending))
    }
}

fn commit(library: &mut ElementLibrary, page: u32, pending: Vec<Pending>) {
    for item in pending {
        match item {
            Pending::Text {
                bounds,
                content,
                font_size,
            } => {
                library.push_text(page, bounds, content, font_size);
            }
            Pending::Image { bounds, payload } => {
                library.push_image(page, bounds, payload);
            }
        }
    }
}
