//! The editor: owns the deck, the element library and all interaction state.

use crate::extract::Conversion;
use crate::geometry::{Point, Size};
use crate::model::{
    Card, CardContent, CardId, Color, Deck, ElementId, ElementKind, ElementLibrary, FitMode,
    ImageSource, Slide, SlideId, TextStyle,
};

use super::config::EditorConfig;
use super::interaction::{CardTarget, HitTarget, Interaction, Key, StyleUpdate};

/// Single owner of all editor state.
///
/// Every mutation goes through a method here, one at a time. Operations
/// that cannot apply (no slide, unknown id, wrong card kind) are no-ops
/// and report that through their return value.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    deck: Deck,
    library: ElementLibrary,
    current: Option<usize>,
    selected: Option<CardId>,
    interaction: Interaction,
    next_slide: u64,
    next_card: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            deck: Deck::new(),
            library: ElementLibrary::new(),
            current: None,
            selected: None,
            interaction: Interaction::Idle,
            next_slide: 0,
            next_card: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn library(&self) -> &ElementLibrary {
        &self.library
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.current.and_then(|i| self.deck.slides.get(i))
    }

    fn current_slide_mut(&mut self) -> Option<&mut Slide> {
        self.current.and_then(|i| self.deck.slides.get_mut(i))
    }

    pub fn selected_card(&self) -> Option<CardId> {
        self.selected
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    /// Find a card anywhere in the deck.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.deck.slides.iter().find_map(|s| s.card(id))
    }

    fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.deck.slides.iter_mut().find_map(|s| s.card_mut(id))
    }

    fn allocate_slide(&mut self) -> Slide {
        self.next_slide += 1;
        Slide::new(SlideId(self.next_slide), self.config.background)
    }

    fn allocate_card(&mut self) -> CardId {
        self.next_card += 1;
        CardId(self.next_card)
    }

    // ------------------------------------------------------------------
    // Document and slides
    // ------------------------------------------------------------------

    /// Replace the library and deck with a fresh conversion: one blank
    /// slide per converted page. Card ids keep counting.
    pub fn load_conversion(&mut self, conversion: Conversion) -> Vec<SlideId> {
        self.library = conversion.library;
        self.deck = Deck::new();
        self.selected = None;
        self.interaction = Interaction::Idle;

        let mut ids = Vec::with_capacity(conversion.pages.len());
        for page in &conversion.pages {
            let mut slide = self.allocate_slide();
            slide.source_page = Some(page.page);
            ids.push(slide.id);
            self.deck.slides.push(slide);
        }
        self.current = if self.deck.is_empty() { None } else { Some(0) };
        ids
    }

    /// Put every library element on the slide made from its page.
    pub fn populate_from_pages(&mut self) -> usize {
        let targets: Vec<(usize, u32)> = self
            .deck
            .slides
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.source_page.map(|p| (i, p)))
            .collect();
        let keep = self.current;

        let mut added = 0;
        for (index, page) in targets {
            let elements: Vec<ElementId> = self.library.on_page(page).map(|e| e.id).collect();
            self.current = Some(index);
            for id in elements {
                if self.add_element_to_slide(id).is_some() {
                    added += 1;
                }
            }
        }

        self.current = keep;
        self.deselect_all();
        added
    }

    /// Make a slide current. Out-of-range indices are ignored.
    pub fn select_slide(&mut self, index: usize) -> bool {
        if index >= self.deck.len() {
            return false;
        }
        self.current = Some(index);
        self.deselect_all();
        true
    }

    /// Append a blank slide and make it current.
    pub fn add_slide(&mut self) -> SlideId {
        let slide = self.allocate_slide();
        let id = slide.id;
        self.deck.slides.push(slide);
        self.select_slide(self.deck.len() - 1);
        id
    }

    /// Remove the current slide. The next slide (or the new last one)
    /// becomes current.
    pub fn delete_current_slide(&mut self) -> Option<SlideId> {
        let index = self.current?;
        let removed = self.deck.slides.remove(index);
        self.current = if self.deck.is_empty() {
            None
        } else {
            Some(index.min(self.deck.len() - 1))
        };
        self.deselect_all();
        Some(removed.id)
    }

    pub fn set_background(&mut self, color: Color) -> bool {
        match self.current_slide_mut() {
            Some(slide) => {
                slide.background = color;
                true
            }
            None => false,
        }
    }

    pub fn set_background_image(&mut self, image: Option<ImageSource>) -> bool {
        match self.current_slide_mut() {
            Some(slide) => {
                slide.background_image = image;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------

    fn push_card(&mut self, slide_index: usize, build: impl FnOnce(CardId, u32) -> Card) -> Option<CardId> {
        let id = self.allocate_card();
        let slide = self.deck.slides.get_mut(slide_index)?;
        let z_order = slide.cards.len() as u32 + 1;
        slide.cards.push(build(id, z_order));
        Some(id)
    }

    /// Copy a library element onto the current slide as a new card.
    ///
    /// The card cascades by `step × card count` from the origin so new
    /// cards do not land exactly on top of each other. Returns `None`
    /// when there is no current slide or the element is unknown.
    pub fn add_element_to_slide(&mut self, element: ElementId) -> Option<CardId> {
        let index = self.current?;
        let slide_len = self.deck.slides.get(index)?.cards.len();
        let element = self.library.get(element)?;

        let offset = self.config.cascade_origin + self.config.cascade_step * slide_len as f32;
        let position = Point::new(offset, offset);
        let (size, content) = match &element.kind {
            ElementKind::Text { content, font_size } => (
                self.config.text_card_size,
                CardContent::Text {
                    text: content.clone(),
                    style: TextStyle {
                        font_size: self.config.card_font_size(*font_size),
                        color: self.config.text_color,
                        align: Default::default(),
                    },
                },
            ),
            ElementKind::Image { payload } => (
                self.config.image_card_size,
                CardContent::Image {
                    source: ImageSource::Embedded(payload.clone()),
                    fit: FitMode::Contain,
                },
            ),
        };

        self.push_card(index, |id, z_order| Card {
            id,
            position,
            size,
            z_order,
            selected: false,
            content,
        })
    }

    /// Add a blank text card to the current slide.
    pub fn add_text_card(&mut self) -> Option<CardId> {
        let index = self.current?;
        let content = CardContent::Text {
            text: self.config.placeholder_text.clone(),
            style: TextStyle {
                font_size: self.config.default_font_size,
                color: self.config.text_color,
                align: Default::default(),
            },
        };
        let (position, size) = (self.config.new_card_origin, self.config.text_card_size);
        self.push_card(index, |id, z_order| Card {
            id,
            position,
            size,
            z_order,
            selected: false,
            content,
        })
    }

    /// Add an image card to the current slide.
    pub fn add_image_card(&mut self, source: ImageSource) -> Option<CardId> {
        let slide = self.current_slide()?.id;
        self.add_image_card_to(slide, source)
    }

    /// Add an image card to a slide captured earlier, if it still exists.
    pub fn add_image_card_to(&mut self, slide: SlideId, source: ImageSource) -> Option<CardId> {
        let index = self.deck.index_of(slide)?;
        let (position, size) = (self.config.new_card_origin, self.config.image_card_size);
        self.push_card(index, |id, z_order| Card {
            id,
            position,
            size,
            z_order,
            selected: false,
            content: CardContent::Image {
                source,
                fit: FitMode::Contain,
            },
        })
    }

    /// Apply one style change. Ignored when the card is gone or the field
    /// does not apply to its kind.
    pub fn update_card_style(&mut self, card: CardId, update: StyleUpdate) -> bool {
        let Some(card) = self.card_mut(card) else {
            return false;
        };
        match (&mut card.content, update) {
            (CardContent::Text { style, .. }, StyleUpdate::Color(color)) => style.color = color,
            (CardContent::Text { style, .. }, StyleUpdate::FontSize(size)) if size > 0.0 => {
                style.font_size = size
            }
            (CardContent::Text { style, .. }, StyleUpdate::Align(align)) => style.align = align,
            (CardContent::Image { fit, .. }, StyleUpdate::Fit(mode)) => *fit = mode,
            _ => return false,
        }
        true
    }

    /// Replace a text card's content.
    pub fn update_card_content(&mut self, card: CardId, text: impl Into<String>) -> bool {
        match self.card_mut(card).map(|c| &mut c.content) {
            Some(CardContent::Text { text: current, .. }) => {
                *current = text.into();
                true
            }
            _ => false,
        }
    }

    /// Raise a card above every other card on its slide.
    pub fn bring_to_front(&mut self, card: CardId) -> bool {
        self.restack(card, true, |others| others.iter().max().map_or(1, |z| z + 1))
    }

    /// Lower a card below every other card on its slide.
    pub fn send_to_back(&mut self, card: CardId) -> bool {
        self.restack(card, false, |others| {
            others.iter().min().map_or(1, |z| z.saturating_sub(1))
        })
    }

    fn restack(&mut self, card: CardId, raise: bool, pick: impl FnOnce(&[u32]) -> u32) -> bool {
        let Some(slide) = self.deck.slides.iter_mut().find(|s| s.card(card).is_some()) else {
            return false;
        };
        let others: Vec<u32> = slide
            .cards
            .iter()
            .filter(|c| c.id != card)
            .map(|c| c.z_order)
            .collect();
        let z = pick(&others);
        match slide.card_mut(card) {
            Some(c) => c.z_order = z,
            None => return false,
        }
        slide.mark_restacked(card, Some(raise));
        true
    }

    /// Remove a card. Unknown ids are a no-op.
    pub fn delete_card(&mut self, card: CardId) -> bool {
        let removed = self
            .deck
            .slides
            .iter_mut()
            .any(|s| s.remove_card(card).is_some());
        if removed && self.selected == Some(card) {
            self.selected = None;
            self.interaction = Interaction::Idle;
        }
        removed
    }

    /// Remove the selected card, if any.
    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(card) => self.delete_card(card),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Selection and pointer interaction
    // ------------------------------------------------------------------

    /// Select one card on the current slide, deselecting all others.
    pub fn select_card(&mut self, card: CardId) -> bool {
        if self.current_slide().and_then(|s| s.card(card)).is_none() {
            return false;
        }
        self.deselect_all();
        if let Some(c) = self.card_mut(card) {
            c.selected = true;
        }
        self.selected = Some(card);
        true
    }

    pub fn deselect_all(&mut self) {
        for slide in &mut self.deck.slides {
            for card in &mut slide.cards {
                card.selected = false;
            }
        }
        self.selected = None;
        self.interaction = Interaction::Idle;
    }

    /// Pointer pressed on part of a card, in canvas coordinates.
    pub fn pointer_down(&mut self, card: CardId, target: HitTarget, at: Point) -> bool {
        if matches!(target, HitTarget::Toolbar | HitTarget::Content) {
            return false;
        }
        if !self.select_card(card) {
            return false;
        }
        self.interaction = match target {
            HitTarget::ResizeHandle => Interaction::Resizing { card },
            _ => {
                let origin = self.card(card).map(|c| c.position).unwrap_or_default();
                Interaction::Dragging {
                    card,
                    offset: Point::new(at.x - origin.x, at.y - origin.y),
                }
            }
        };
        true
    }

    /// Pointer moved, in canvas coordinates.
    ///
    /// Dragging keeps the card inside the canvas; resizing keeps it at or
    /// above the minimum size.
    pub fn pointer_move(&mut self, at: Point) -> bool {
        let canvas = self.config.canvas;
        let min = self.config.min_card_size;
        let interaction = self.interaction;
        let Some(card) = (match interaction {
            Interaction::Idle => None,
            Interaction::Dragging { card, .. } | Interaction::Resizing { card } => self
                .current_slide_mut()
                .and_then(|s| s.card_mut(card)),
        }) else {
            return false;
        };

        match interaction {
            Interaction::Dragging { offset, .. } => {
                card.position = Point::new(
                    clamp_to_canvas(at.x - offset.x, canvas.width - card.size.width),
                    clamp_to_canvas(at.y - offset.y, canvas.height - card.size.height),
                );
            }
            Interaction::Resizing { .. } => {
                card.size = Size::new(
                    (at.x - card.position.x).max(min.width),
                    (at.y - card.position.y).max(min.height),
                );
            }
            Interaction::Idle => return false,
        }
        true
    }

    /// Pointer released: leave drag/resize mode, keep the selection.
    pub fn pointer_up(&mut self) {
        self.interaction = Interaction::Idle;
    }

    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Delete => self.delete_selected(),
            Key::Escape => {
                let had_selection = self.selected.is_some();
                self.deselect_all();
                had_selection
            }
        }
    }

    // ------------------------------------------------------------------
    // Asynchronous resumption
    // ------------------------------------------------------------------

    /// Capture a card before starting an asynchronous operation on it.
    pub fn capture(&self, card: CardId) -> Option<CardTarget> {
        let slide = self.deck.slide_of_card(card)?;
        Some(CardTarget {
            slide: slide.id,
            card,
        })
    }

    /// Current text of a captured card, if it is still there.
    pub fn target_text(&self, target: CardTarget) -> Option<&str> {
        match &self.deck.slide(target.slide)?.card(target.card)?.content {
            CardContent::Text { text, .. } => Some(text),
            CardContent::Image { .. } => None,
        }
    }

    /// Write corrected text back to a captured card.
    ///
    /// Returns `false` and changes nothing if the slide or the card was
    /// deleted, or the card moved, while the operation was in flight.
    pub fn apply_text_correction(&mut self, target: CardTarget, text: impl Into<String>) -> bool {
        let Some(card) = self
            .deck
            .slide_mut(target.slide)
            .and_then(|s| s.card_mut(target.card))
        else {
            log::debug!("{} is gone, dropping correction", target.card);
            return false;
        };
        match &mut card.content {
            CardContent::Text { text: current, .. } => {
                *current = text.into();
                true
            }
            CardContent::Image { .. } => false,
        }
    }
}

/// `max(0, min(value, limit))`: a card wider than the canvas pins to 0.
fn clamp_to_canvas(value: f32, limit: f32) -> f32 {
    value.min(limit).max(0.0)
}
