//! Grammar checking: a remote checker with local heuristics as fallback.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default checking endpoint (LanguageTool public API).
pub const DEFAULT_ENDPOINT: &str = "https://api.languagetool.org/v2/check";

/// Characters accepted as sentence-final punctuation.
const TERMINAL_PUNCTUATION: [char; 5] = ['.', '!', '?', ':', ';'];

/// One reported problem.
///
/// `offset` and `length` count characters of the checked text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub message: String,
    pub offset: usize,
    pub length: usize,
    pub replacements: Vec<String>,
}

impl GrammarIssue {
    pub fn first_replacement(&self) -> Option<&str> {
        self.replacements.first().map(String::as_str)
    }
}

/// Which checker produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOrigin {
    Remote,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarReport {
    pub origin: CheckOrigin,
    pub issues: Vec<GrammarIssue>,
}

impl GrammarReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// The text with the first suggestion of the first issue applied.
    pub fn corrected(&self, text: &str) -> Option<String> {
        let issue = self.issues.first()?;
        apply_replacement(text, issue, 0)
    }
}

fn double_space() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" {2,}").expect("literal pattern"))
}

fn char_offset(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Local heuristics: repeated spaces, a lowercase first letter and a
/// missing sentence-final punctuation mark.
pub fn basic_checks(text: &str) -> Vec<GrammarIssue> {
    let mut issues = Vec::new();

    for m in double_space().find_iter(text) {
        issues.push(GrammarIssue {
            message: "Multiple consecutive spaces found".to_string(),
            offset: char_offset(text, m.start()),
            length: m.as_str().chars().count(),
            replacements: vec![" ".to_string()],
        });
    }

    // Leading whitespace does not count as the start of the text.
    if let Some((offset, first)) = text.chars().enumerate().find(|(_, c)| !c.is_whitespace()) {
        let upper: String = first.to_uppercase().collect();
        if upper != first.to_string() {
            issues.push(GrammarIssue {
                message: "Text should start with capital letter".to_string(),
                offset,
                length: 1,
                replacements: vec![upper],
            });
        }
    }

    let body = text.trim_end();
    if let Some(last) = body.chars().last() {
        if !TERMINAL_PUNCTUATION.contains(&last) {
            issues.push(GrammarIssue {
                message: "Consider adding punctuation at the end".to_string(),
                offset: body.chars().count(),
                length: 0,
                replacements: vec![".".to_string()],
            });
        }
    }

    issues
}

/// Splice replacement `choice` of `issue` into `text`.
///
/// `None` when the choice does not exist or the issue's span falls
/// outside the text.
pub fn apply_replacement(text: &str, issue: &GrammarIssue, choice: usize) -> Option<String> {
    let replacement = issue.replacements.get(choice)?;
    let start = byte_index(text, issue.offset)?;
    let end = byte_index(text, issue.offset + issue.length)?;
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    Some(out)
}

/// Byte index of character `n`; `n == char count` maps to the end.
fn byte_index(text: &str, n: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(n)
}

/// Convert a UTF-16 code unit offset to a character offset.
fn utf16_to_chars(text: &str, units: usize) -> usize {
    let mut seen = 0;
    for (count, c) in text.chars().enumerate() {
        if seen >= units {
            return count;
        }
        seen += c.len_utf16();
    }
    text.chars().count()
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<RemoteMatch>,
}

#[derive(Debug, Deserialize)]
struct RemoteMatch {
    message: String,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<RemoteReplacement>,
}

#[derive(Debug, Deserialize)]
struct RemoteReplacement {
    value: String,
}

/// Parse a checker response. Remote offsets count UTF-16 units.
fn parse_response(text: &str, body: &str) -> Result<Vec<GrammarIssue>> {
    let response: CheckResponse = serde_json::from_str(body)?;
    Ok(response
        .matches
        .into_iter()
        .map(|m| {
            let offset = utf16_to_chars(text, m.offset);
            let end = utf16_to_chars(text, m.offset + m.length);
            GrammarIssue {
                message: m.message,
                offset,
                length: end.saturating_sub(offset),
                replacements: m.replacements.into_iter().map(|r| r.value).collect(),
            }
        })
        .collect())
}

/// Client for the remote grammar checker.
#[derive(Debug, Clone)]
pub struct GrammarClient {
    endpoint: String,
    language: String,
}

impl Default for GrammarClient {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "en-US".to_string(),
        }
    }
}

impl GrammarClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Check `text`. Blank text is an error; a failing service falls back
    /// to [`basic_checks`].
    pub async fn check(&self, text: &str) -> Result<GrammarReport> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput("no text to check".to_string()));
        }
        match self.fetch(text).await {
            Ok(issues) => Ok(GrammarReport {
                origin: CheckOrigin::Remote,
                issues,
            }),
            Err(e) => {
                log::warn!("Grammar service unavailable, using basic checks: {}", e);
                Ok(GrammarReport {
                    origin: CheckOrigin::Basic,
                    issues: basic_checks(text),
                })
            }
        }
    }

    #[cfg(feature = "network")]
    async fn fetch(&self, text: &str) -> Result<Vec<GrammarIssue>> {
        let response = reqwest::Client::new()
            .post(&self.endpoint)
            .form(&[("text", text), ("language", self.language.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;
        parse_response(text, &body)
    }

    #[cfg(not(feature = "network"))]
    async fn fetch(&self, _text: &str) -> Result<Vec<GrammarIssue>> {
        Err(Error::Network("built without network support".to_string()))
    }
}
