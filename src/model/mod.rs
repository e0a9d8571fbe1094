//! Document model: extracted elements and the editable slide deck.

mod deck;
mod element;
mod library;
mod style;

pub use deck::{Card, CardContent, CardId, Deck, ImageSource, Slide, SlideId};
pub use element::{ElementId, ElementKind, ExtractedElement, ImagePayload, KindFilter};
pub use library::{preview, ElementLibrary, PREVIEW_CHARS};
pub use style::{Alignment, Color, FitMode, TextStyle, VerticalAlign};
