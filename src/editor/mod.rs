//! Slide editor state: deck, selection and pointer interaction.

mod config;
mod controller;
mod interaction;

pub use config::EditorConfig;
pub use controller::Editor;
pub use interaction::{CardTarget, HitTarget, Interaction, Key, StyleUpdate};
