//! JSON output for element libraries, decks and conversion summaries.

use serde::Serialize;

use crate::error::Result;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any model value.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}
