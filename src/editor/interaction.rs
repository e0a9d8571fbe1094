//! Input vocabulary of the editor: pointer targets, keys, style edits.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::model::{Alignment, CardId, Color, FitMode, SlideId};

/// Modal pointer state. At most one card is being dragged or resized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// Dragging `card`; `offset` is the pointer position relative to the card origin.
    Dragging { card: CardId, offset: Point },
    Resizing { card: CardId },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

/// Which part of a card the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// The card frame: selects and starts a drag.
    Body,
    /// The resize affordance: selects and starts a resize.
    ResizeHandle,
    /// The card's toolbar. Ignored.
    Toolbar,
    /// Editable text content. Ignored so text selection still works.
    Content,
}

/// Keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Delete,
    Escape,
}

/// A single in-place style change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum StyleUpdate {
    Color(Color),
    FontSize(f32),
    Align(Alignment),
    Fit(FitMode),
}

/// A card captured at the start of an asynchronous operation.
///
/// Resuming code hands this back to the editor, which checks that the
/// slide and the card still exist before mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardTarget {
    pub slide: SlideId,
    pub card: CardId,
}
