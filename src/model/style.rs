//! Card styling primitives shared by the editor and the exporters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An opaque RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or the same without the leading `#`.
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(Error::Other(format!("Invalid color: {}", s))),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i..i + 2], 16)
                .map_err(|_| Error::Other(format!("Invalid color: {}", s)))
        };
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// `RRGGBB`, the form DrawingML expects in `srgbClr`.
    pub fn to_srgb(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Color::parse(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchoring inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAlign {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// How an image fills its card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale to fit entirely inside the card, letterboxed.
    #[default]
    Contain,
    /// Scale to cover the card, cropping overflow.
    Cover,
    /// Stretch to the card's exact size.
    Fill,
}

/// Style of a text card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in canvas pixels.
    pub font_size: f32,
    pub color: Color,
    pub align: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            color: Color::rgb(0x33, 0x33, 0x33),
            align: Alignment::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!(Color::parse("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse("333").unwrap(), Color::rgb(0x33, 0x33, 0x33));
        assert_eq!(Color::parse("#2563EB").unwrap(), Color::rgb(0x25, 0x63, 0xeb));
        assert!(Color::parse("#12345").is_err());
        assert!(Color::parse("#gggggg").is_err());
    }

    #[test]
    fn test_color_formats() {
        let c = Color::rgb(0x36, 0x36, 0x36);
        assert_eq!(c.to_hex(), "#363636");
        assert_eq!(Color::rgb(0xab, 0, 0x1f).to_srgb(), "AB001F");
    }

    #[test]
    fn test_color_serde() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: Color = serde_json::from_str("\"#0a0b0c\"").unwrap();
        assert_eq!(back, Color::rgb(10, 11, 12));
        assert!(serde_json::from_str::<Color>("\"red\"").is_err());
    }

    #[test]
    fn test_enum_serde_names() {
        assert_eq!(serde_json::to_string(&FitMode::Cover).unwrap(), "\"cover\"");
        assert_eq!(
            serde_json::from_str::<Alignment>("\"center\"").unwrap(),
            Alignment::Center
        );
    }
}
