//! Elements extracted from a source PDF.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Identifier of an extracted element, unique within one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "elem_{}", self.0)
    }
}

impl std::str::FromStr for ElementId {
    type Err = Error;

    /// Accepts `elem_7` or a bare `7`.
    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches("elem_");
        digits
            .parse()
            .map(ElementId)
            .map_err(|_| Error::Other(format!("Invalid element id: {}", s)))
    }
}

/// Encoded raster data. Cloning is cheap: all clones share one buffer.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PayloadRepr", into = "PayloadRepr")]
pub struct ImagePayload {
    pub mime: String,
    pub width: u32,
    pub height: u32,
    data: Arc<[u8]>,
}

impl ImagePayload {
    pub fn new(mime: impl Into<String>, width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            mime: mime.into(),
            width,
            height,
            data: data.into(),
        }
    }

    /// A PNG payload.
    pub fn png(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self::new("image/png", width, height, data)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Whether two payloads share the same underlying buffer.
    pub fn shares_buffer(&self, other: &ImagePayload) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// File extension matching the MIME type.
    pub fn extension(&self) -> &'static str {
        match self.mime.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            _ => "png",
        }
    }

    /// `data:<mime>;base64,<...>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }

    /// Parse a base64 `data:` URL. Dimensions are left at zero.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::Other("not a data URL".to_string()))?;
        let (mime, encoded) = rest
            .split_once(";base64,")
            .ok_or_else(|| Error::Other("data URL is not base64".to_string()))?;
        let data = STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Other(format!("invalid base64 payload: {}", e)))?;
        Ok(Self::new(mime, 0, 0, data))
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime", &self.mime)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[derive(Serialize, Deserialize)]
struct PayloadRepr {
    width: u32,
    height: u32,
    src: String,
}

impl From<ImagePayload> for PayloadRepr {
    fn from(p: ImagePayload) -> Self {
        Self {
            width: p.width,
            height: p.height,
            src: p.to_data_url(),
        }
    }
}

impl TryFrom<PayloadRepr> for ImagePayload {
    type Error = Error;

    fn try_from(repr: PayloadRepr) -> Result<Self> {
        let mut payload = ImagePayload::from_data_url(&repr.src)?;
        payload.width = repr.width;
        payload.height = repr.height;
        Ok(payload)
    }
}

/// Kind-specific content of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementKind {
    Text { content: String, font_size: f32 },
    Image { payload: ImagePayload },
}

/// Filter for listing elements by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Text,
    Image,
}

/// One piece of extracted content: a text block or an image region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedElement {
    pub id: ElementId,
    /// 1-indexed source page.
    pub page: u32,
    pub bounds: Rect,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl ExtractedElement {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image { .. })
    }

    pub fn matches(&self, filter: KindFilter) -> bool {
        match filter {
            KindFilter::Text => self.is_text(),
            KindFilter::Image => self.is_image(),
        }
    }

    /// Text content, if this is a text element.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { content, .. } => Some(content),
            ElementKind::Image { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_display_and_parse() {
        assert_eq!(ElementId(3).to_string(), "elem_3");
        assert_eq!("elem_12".parse::<ElementId>().unwrap(), ElementId(12));
        assert_eq!("5".parse::<ElementId>().unwrap(), ElementId(5));
        assert!("elem_x".parse::<ElementId>().is_err());
    }

    #[test]
    fn test_data_url_round_trip() {
        let payload = ImagePayload::png(2, 1, vec![1u8, 2, 3, 250]);
        let url = payload.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        let back = ImagePayload::from_data_url(&url).unwrap();
        assert_eq!(back.bytes(), payload.bytes());
        assert_eq!(back.mime, "image/png");
    }

    #[test]
    fn test_payload_serializes_as_src() {
        let payload = ImagePayload::png(4, 3, vec![0u8; 4]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["width"], 4);
        assert!(json["src"].as_str().unwrap().starts_with("data:image/png"));

        let back: ImagePayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_element_serialization_is_tagged() {
        let elem = ExtractedElement {
            id: ElementId(1),
            page: 1,
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            kind: ElementKind::Text {
                content: "Hello".to_string(),
                font_size: 12.0,
            },
        };
        let json = serde_json::to_value(&elem).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["content"], "Hello");
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_payload_debug_hides_bytes() {
        let payload = ImagePayload::png(1, 1, vec![9u8; 1000]);
        let dbg = format!("{:?}", payload);
        assert!(dbg.contains("bytes: 1000"));
    }
}
