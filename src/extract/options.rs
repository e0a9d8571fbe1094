//! Extraction options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Viewport scale used when rendering pages.
pub const DEFAULT_SCALE: f32 = 2.0;

/// Options for converting a PDF into elements and slides.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Viewport scale (page points → pixels)
    pub scale: f32,

    /// Which pages to convert
    pub pages: PageSelection,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Whether to rasterize pages and detect image regions
    pub extract_images: bool,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the whole conversion on the first page error.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Skip rasterization and image detection.
    pub fn text_only(mut self) -> Self {
        self.extract_images = false;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            pages: PageSelection::All,
            error_mode: ErrorMode::Lenient,
            extract_images: true,
        }
    }
}

/// Error handling mode for per-page failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    Strict,
    /// Log the failure, skip the page and continue
    #[default]
    Lenient,
}

/// Page selection (1-indexed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    #[default]
    All,
    Range(RangeInclusive<u32>),
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number is selected.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse "all", "3", "1-10" or "1,3,5-7".
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());
        let page = |p: &str| -> Result<u32> {
            match p.trim().parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(invalid()),
            }
        };

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = (page(start)?, page(end)?);
                if start > end {
                    return Err(invalid());
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (page(start)?, page(end)?);
                    if start > end {
                        return Err(invalid());
                    }
                    pages.extend(start..=end);
                }
                None => pages.push(page(part)?),
            }
        }
        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new().with_scale(1.5).strict().text_only();
        assert_eq!(options.scale, 1.5);
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(!options.extract_images);
    }

    #[test]
    fn test_defaults() {
        let options = ExtractOptions::default();
        assert_eq!(options.scale, 2.0);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert!(options.extract_images);
        assert_eq!(options.pages, PageSelection::All);
    }

    #[test]
    fn test_page_selection_includes() {
        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(10));

        let pages = PageSelection::Pages(vec![1, 3]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
        assert!(PageSelection::All.includes(100));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("2-4").unwrap(), PageSelection::Range(2..=4));
        assert_eq!(
            PageSelection::parse("5,1,3-4,3").unwrap(),
            PageSelection::Pages(vec![1, 3, 4, 5])
        );
        assert_eq!(PageSelection::parse("7").unwrap(), PageSelection::Pages(vec![7]));
    }

    #[test]
    fn test_page_selection_parse_errors() {
        assert!(matches!(
            PageSelection::parse("0"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(PageSelection::parse("4-2").is_err());
        assert!(PageSelection::parse("a,b").is_err());
    }
}
