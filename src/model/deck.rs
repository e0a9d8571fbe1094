//! The editable deck: slides holding positioned, z-ordered cards.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::element::ImagePayload;
use super::style::{Color, FitMode, TextStyle};
use crate::geometry::{Point, Rect, Size};

/// Slide identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(pub u64);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slide_{}", self.0)
    }
}

/// Card identifier. Never reused within an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card_{}", self.0)
    }
}

/// Where an image card's pixels come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    /// Bytes carried with the deck.
    Embedded(ImagePayload),
    /// A remote URL (image search results).
    Remote { url: String },
}

impl ImageSource {
    pub fn remote(url: impl Into<String>) -> Self {
        ImageSource::Remote { url: url.into() }
    }

    /// Pixel dimensions when known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            ImageSource::Embedded(p) if p.width > 0 && p.height > 0 => Some((p.width, p.height)),
            _ => None,
        }
    }
}

/// Kind-specific card content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CardContent {
    Text { text: String, style: TextStyle },
    Image { source: ImageSource, fit: FitMode },
}

/// A positioned unit of content on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub position: Point,
    pub size: Size,
    pub z_order: u32,
    pub selected: bool,
    pub content: CardContent,
}

impl Card {
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self.content, CardContent::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self.content, CardContent::Image { .. })
    }
}

/// One slide of the deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    pub background: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<ImageSource>,
    /// PDF page this slide was created from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_page: Option<u32>,
    pub cards: Vec<Card>,
    /// Card last brought to front. Wins z-order ties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raised: Option<CardId>,
    /// Card last sent to back. Loses z-order ties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowered: Option<CardId>,
}

impl Slide {
    /// An empty slide with the given background.
    pub fn new(id: SlideId, background: Color) -> Self {
        Self {
            id,
            background,
            background_image: None,
            source_page: None,
            cards: Vec::new(),
            raised: None,
            lowered: None,
        }
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    /// Remove a card. Remaining cards keep their z-order values.
    pub fn remove_card(&mut self, id: CardId) -> Option<Card> {
        let index = self.cards.iter().position(|c| c.id == id)?;
        self.mark_restacked(id, None);
        Some(self.cards.remove(index))
    }

    /// Record `id` as the last card raised (`Some(true)`) or lowered
    /// (`Some(false)`); `None` forgets it.
    pub fn mark_restacked(&mut self, id: CardId, raised: Option<bool>) {
        if self.raised == Some(id) {
            self.raised = None;
        }
        if self.lowered == Some(id) {
            self.lowered = None;
        }
        match raised {
            Some(true) => self.raised = Some(id),
            Some(false) => self.lowered = Some(id),
            None => {}
        }
    }

    /// Cards sorted by ascending z-order.
    ///
    /// On equal z-order the last raised card paints on top and the last
    /// lowered card underneath; other ties keep insertion order.
    pub fn cards_by_z(&self) -> Vec<&Card> {
        let rank = |id: CardId| {
            if self.lowered == Some(id) {
                0
            } else if self.raised == Some(id) {
                2
            } else {
                1
            }
        };
        let mut cards: Vec<&Card> = self.cards.iter().collect();
        cards.sort_by_key(|c| (c.z_order, rank(c.id)));
        cards
    }
}

/// The whole editable document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub slides: Vec<Slide>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn index_of(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    pub fn slide(&self, id: SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn slide_mut(&mut self, id: SlideId) -> Option<&mut Slide> {
        self.slides.iter_mut().find(|s| s.id == id)
    }

    /// Find the slide holding a card.
    pub fn slide_of_card(&self, card: CardId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.card(card).is_some())
    }

    pub fn card_count(&self) -> usize {
        self.slides.iter().map(|s| s.cards.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_card(id: u64, z: u32) -> Card {
        Card {
            id: CardId(id),
            position: Point::new(0.0, 0.0),
            size: Size::new(100.0, 50.0),
            z_order: z,
            selected: false,
            content: CardContent::Text {
                text: "t".to_string(),
                style: TextStyle::default(),
            },
        }
    }

    #[test]
    fn test_remove_card_keeps_z_orders() {
        let mut slide = Slide::new(SlideId(1), Color::WHITE);
        slide.cards.push(text_card(1, 1));
        slide.cards.push(text_card(2, 2));
        slide.cards.push(text_card(3, 3));

        assert!(slide.remove_card(CardId(2)).is_some());
        let z: Vec<u32> = slide.cards.iter().map(|c| c.z_order).collect();
        assert_eq!(z, vec![1, 3]);
        assert!(slide.remove_card(CardId(2)).is_none());
    }

    #[test]
    fn test_cards_by_z() {
        let mut slide = Slide::new(SlideId(1), Color::WHITE);
        slide.cards.push(text_card(1, 5));
        slide.cards.push(text_card(2, 1));
        let order: Vec<CardId> = slide.cards_by_z().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![CardId(2), CardId(1)]);
    }

    #[test]
    fn test_restacked_cards_break_z_ties() {
        let mut slide = Slide::new(SlideId(1), Color::WHITE);
        slide.cards.push(text_card(1, 3));
        slide.cards.push(text_card(2, 3));
        slide.cards.push(text_card(3, 3));
        slide.mark_restacked(CardId(1), Some(true));
        slide.mark_restacked(CardId(3), Some(false));
        let order: Vec<CardId> = slide.cards_by_z().iter().map(|c| c.id).collect();
        assert_eq!(order, vec![CardId(3), CardId(2), CardId(1)]);

        slide.remove_card(CardId(1));
        assert!(slide.raised.is_none());
        slide.mark_restacked(CardId(3), Some(true));
        assert_eq!((slide.raised, slide.lowered), (Some(CardId(3)), None));
    }

    #[test]
    fn test_deck_lookup() {
        let mut deck = Deck::new();
        let mut slide = Slide::new(SlideId(7), Color::WHITE);
        slide.cards.push(text_card(4, 1));
        deck.slides.push(slide);

        assert_eq!(deck.index_of(SlideId(7)), Some(0));
        assert_eq!(deck.slide_of_card(CardId(4)).map(|s| s.id), Some(SlideId(7)));
        assert!(deck.slide(SlideId(8)).is_none());
        assert_eq!(deck.card_count(), 1);
    }

    #[test]
    fn test_deck_json_round_trip() {
        let mut deck = Deck::new();
        let mut slide = Slide::new(SlideId(1), Color::rgb(0xf0, 0xf0, 0xf0));
        slide.cards.push(Card {
            id: CardId(9),
            position: Point::new(1.0, 2.0),
            size: Size::new(300.0, 200.0),
            z_order: 1,
            selected: true,
            content: CardContent::Image {
                source: ImageSource::remote("https://example.com/a.png"),
                fit: FitMode::Cover,
            },
        });
        deck.slides.push(slide);

        let json = serde_json::to_string(&deck).unwrap();
        assert!(json.contains("\"type\":\"image\""));
        let back: Deck = serde_json::from_str(&json).unwrap();
        assert_eq!(back, deck);
    }
}
