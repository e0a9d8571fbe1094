//! The element library: every element extracted from one document.

use serde::Serialize;

use super::element::{ElementId, ElementKind, ExtractedElement, ImagePayload, KindFilter};
use crate::geometry::Rect;

/// Maximum number of characters shown in a text preview.
pub const PREVIEW_CHARS: usize = 50;

/// Ordered, append-only collection of extracted elements.
///
/// Identifiers come from a counter owned by the library, so they are
/// unique for the lifetime of one conversion no matter how fast
/// extraction runs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementLibrary {
    elements: Vec<ExtractedElement>,
    #[serde(skip)]
    next_id: u64,
}

impl ElementLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId(self.next_id)
    }

    /// Append a text element and return its id.
    pub fn push_text(
        &mut self,
        page: u32,
        bounds: Rect,
        content: impl Into<String>,
        font_size: f32,
    ) -> ElementId {
        let id = self.allocate_id();
        self.elements.push(ExtractedElement {
            id,
            page,
            bounds,
            kind: ElementKind::Text {
                content: content.into(),
                font_size,
            },
        });
        id
    }

    /// Append an image element and return its id.
    pub fn push_image(&mut self, page: u32, bounds: Rect, payload: ImagePayload) -> ElementId {
        let id = self.allocate_id();
        self.elements.push(ExtractedElement {
            id,
            page,
            bounds,
            kind: ElementKind::Image { payload },
        });
        id
    }

    /// Look up an element by id.
    pub fn get(&self, id: ElementId) -> Option<&ExtractedElement> {
        // Ids are allocated in push order, so the vector is sorted by id.
        self.elements
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.elements[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtractedElement> {
        self.elements.iter()
    }

    /// Elements of one kind, in extraction order.
    pub fn filter(&self, kind: KindFilter) -> impl Iterator<Item = &ExtractedElement> {
        self.elements.iter().filter(move |e| e.matches(kind))
    }

    /// Elements extracted from one page.
    pub fn on_page(&self, page: u32) -> impl Iterator<Item = &ExtractedElement> {
        self.elements.iter().filter(move |e| e.page == page)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn text_count(&self) -> usize {
        self.filter(KindFilter::Text).count()
    }

    pub fn image_count(&self) -> usize {
        self.filter(KindFilter::Image).count()
    }

    pub fn as_slice(&self) -> &[ExtractedElement] {
        &self.elements
    }
}

impl<'a> IntoIterator for &'a ElementLibrary {
    type Item = &'a ExtractedElement;
    type IntoIter = std::slice::Iter<'a, ExtractedElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Short human-readable label for the library listing.
pub fn preview(element: &ExtractedElement) -> String {
    match &element.kind {
        ElementKind::Text { content, .. } => truncate(content, PREVIEW_CHARS),
        ElementKind::Image { payload } => format!(
            "Image from page {} ({}x{})",
            element.page, payload.width, payload.height
        ),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
