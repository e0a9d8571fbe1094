//! Remote helpers used while editing: stock image search and grammar checks.
//!
//! Both degrade to local substitutes when the service cannot be reached,
//! so callers only ever see input validation errors.

pub mod grammar;
pub mod image_search;

pub use grammar::{apply_replacement, basic_checks, CheckOrigin, GrammarClient, GrammarIssue, GrammarReport};
pub use image_search::{demo_images, ImageResult, ImageSearchClient, ResultOrigin, SearchResults};
