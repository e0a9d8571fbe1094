//! Freeform text to PDF, Word, plain text, RTF, HTML or Markdown.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output format of [`export_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    /// HTML that word processors open as a document.
    Docx,
    Txt,
    Rtf,
    Html,
    Markdown,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 6] = [
        DocumentFormat::Pdf,
        DocumentFormat::Docx,
        DocumentFormat::Txt,
        DocumentFormat::Rtf,
        DocumentFormat::Html,
        DocumentFormat::Markdown,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "doc",
            DocumentFormat::Txt => "txt",
            DocumentFormat::Rtf => "rtf",
            DocumentFormat::Html => "html",
            DocumentFormat::Markdown => "md",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Docx => "application/msword",
            DocumentFormat::Txt => "text/plain",
            DocumentFormat::Rtf => "application/rtf",
            DocumentFormat::Html => "text/html",
            DocumentFormat::Markdown => "text/markdown",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::Docx => "docx",
            other => other.extension(),
        };
        f.write_str(name)
    }
}

impl FromStr for DocumentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "doc" => Ok(DocumentFormat::Docx),
            "txt" | "text" => Ok(DocumentFormat::Txt),
            "rtf" => Ok(DocumentFormat::Rtf),
            "html" | "htm" => Ok(DocumentFormat::Html),
            "markdown" | "md" => Ok(DocumentFormat::Markdown),
            other => Err(Error::Other(format!("Unknown document format: {}", other))),
        }
    }
}

/// Fixed header and footer strings wrapped around the user's text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBranding {
    /// Heading of every format
    pub title: String,

    /// First line of the plain-text format
    pub banner: String,

    /// Closing line
    pub footer: String,

    /// File name without extension
    pub file_stem: String,

    pub author: String,
    pub subject: String,
    pub creator: String,
}

impl Default for DocumentBranding {
    fn default() -> Self {
        Self {
            title: "DURAI Document".to_string(),
            banner: "DURAI DOCUMENT CONVERTER".to_string(),
            footer: "Created with DURAI Document Converter".to_string(),
            file_stem: "DURAI-document".to_string(),
            author: "DURAI Document Converter".to_string(),
            subject: "Converted Document".to_string(),
            creator: "DURAI".to_string(),
        }
    }
}

/// A finished document, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Date as shown in document headers, e.g. `3/7/2025`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Wrap `text` in the branding template of `format`.
///
/// The text is trimmed first; blank input is rejected.
pub fn export_text(
    text: &str,
    format: DocumentFormat,
    branding: &DocumentBranding,
    date: NaiveDate,
) -> Result<ExportedFile> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::EmptyInput("Please enter some text to convert".to_string()));
    }
    let date = format_date(date);

    let bytes = match format {
        DocumentFormat::Pdf => pdf_document(text, branding, &date)?,
        DocumentFormat::Docx => {
            let mut bytes = "\u{feff}".as_bytes().to_vec();
            bytes.extend(word_html(text, branding, &date).into_bytes());
            bytes
        }
        DocumentFormat::Txt => plain_text(text, branding, &date).into_bytes(),
        DocumentFormat::Rtf => rtf(text, branding, &date).into_bytes(),
        DocumentFormat::Html => html(text, branding, &date).into_bytes(),
        DocumentFormat::Markdown => markdown(text, branding, &date).into_bytes(),
    };
    log::debug!("Exported {} bytes as {}", bytes.len(), format);

    Ok(ExportedFile {
        filename: format!("{}.{}", branding.file_stem, format.extension()),
        mime: format.mime(),
        bytes,
    })
}

fn plain_text(text: &str, b: &DocumentBranding, date: &str) -> String {
    let rule = "=".repeat(50);
    format!(
        "{}\nGenerated on {}\n{}\n\n{}\n\n{}\n{}",
        b.banner, date, rule, text, rule, b.footer
    )
}

fn markdown(text: &str, b: &DocumentBranding, date: &str) -> String {
    format!(
        "# {}\n\n**Generated on {}**\n\n---\n\n{}\n\n---\n\n*{}*",
        b.title, date, text, b.footer
    )
}

fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\par\n"),
            '\r' => {}
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

fn rtf(text: &str, b: &DocumentBranding, date: &str) -> String {
    format!(
        concat!(
            "{{\\rtf1\\ansi\\deff0\n",
            "{{\\fonttbl{{\\f0 Arial;}}}}\n",
            "{{\\colortbl;\\red37\\green99\\blue235;\\red30\\green41\\blue59;}}\n",
            "\\f0\\fs24\n",
            "{{\\cf1\\b\\fs32 {}\\par}}\n",
            "\\cf2\\fs20 Generated on {}\\par\n",
            "\\par\n",
            "{}\n",
            "\\par\n",
            "\\par\n",
            "{{\\fs18 {}}}\n",
            "}}"
        ),
        escape_rtf(&b.title),
        date,
        escape_rtf(text),
        escape_rtf(&b.footer)
    )
}

fn word_html(text: &str, b: &DocumentBranding, date: &str) -> String {
    let body = escape(text).replace('\n', "<br>");
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; padding: 40px; }}
        h1 {{ color: #2563eb; }}
        .header {{ border-bottom: 2px solid #2563eb; padding-bottom: 10px; margin-bottom: 20px; }}
        .footer {{ margin-top: 40px; padding-top: 20px; border-top: 1px solid #ccc; font-size: 12px; color: #666; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>{title}</h1>
        <p>Generated on {date}</p>
    </div>
    <div class="content">
        {body}
    </div>
    <div class="footer">
        <p>{footer}</p>
    </div>
</body>
</html>
"#,
        title = escape(b.title.as_str()),
        date = date,
        body = body,
        footer = escape(b.footer.as_str())
    )
}

fn html(text: &str, b: &DocumentBranding, date: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
            max-width: 800px;
            margin: 0 auto;
            padding: 40px 20px;
            line-height: 1.6;
            color: #1e293b;
        }}
        .header {{ border-bottom: 3px solid #2563eb; padding-bottom: 20px; margin-bottom: 30px; }}
        h1 {{ color: #2563eb; margin: 0 0 10px 0; }}
        .date {{ color: #64748b; font-size: 14px; }}
        .content {{ white-space: pre-wrap; margin-bottom: 40px; }}
        .footer {{ border-top: 1px solid #e2e8f0; padding-top: 20px; text-align: center; color: #64748b; font-size: 14px; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>{title}</h1>
        <p class="date">Generated on {date}</p>
    </div>
    <div class="content">{body}</div>
    <div class="footer">
        <p>{footer}</p>
    </div>
</body>
</html>"#,
        title = escape(b.title.as_str()),
        date = date,
        body = escape(text),
        footer = escape(b.footer.as_str())
    )
}

// ----------------------------------------------------------------------
// PDF
// ----------------------------------------------------------------------

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const CONTENT_WIDTH_MM: f32 = 170.0;
const FIRST_LINE_MM: f32 = 40.0;
const LAST_LINE_MM: f32 = 275.0;
const BODY_PT: f32 = 11.0;
const LINE_FACTOR: f32 = 1.15;

type Rgb = (u8, u8, u8);
const TITLE_COLOR: Rgb = (37, 99, 235);
const DATE_COLOR: Rgb = (100, 116, 139);
const BODY_COLOR: Rgb = (30, 41, 59);
const FOOTER_COLOR: Rgb = (148, 163, 184);

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Approximate Helvetica advance width, in em.
fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' | '.' | ',' | ':' | ';' | '!' => 0.24,
        ' ' | 'f' | 't' | 'I' | '[' | ']' | '(' | ')' | '/' => 0.28,
        'r' | '-' => 0.33,
        'm' | 'M' | 'W' => 0.83,
        'w' => 0.72,
        c if c.is_ascii_uppercase() => 0.67,
        c if c.is_ascii_digit() => 0.556,
        _ => 0.52,
    }
}

fn text_width_mm(text: &str, font_pt: f32) -> f32 {
    let em_mm = font_pt * 25.4 / 72.0;
    text.chars().map(glyph_width).sum::<f32>() * em_mm
}

/// Greedy word wrap to `width_mm`. Words longer than a line are split.
fn wrap_text(text: &str, width_mm: f32, font_pt: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if text_width_mm(&candidate, font_pt) <= width_mm {
                line = candidate;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            for c in word.chars() {
                line.push(c);
                if text_width_mm(&line, font_pt) > width_mm && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::replace(&mut line, c.to_string()));
                }
            }
        }
        lines.push(line);
    }
    lines
}

/// Split wrapped lines into pages of `(line, baseline mm from top)`.
fn paginate(lines: Vec<String>) -> Vec<Vec<(String, f32)>> {
    let step = BODY_PT * LINE_FACTOR * 25.4 / 72.0;
    let mut pages = vec![Vec::new()];
    let mut y = FIRST_LINE_MM;
    for line in lines {
        if y > LAST_LINE_MM {
            pages.push(Vec::new());
            y = MARGIN_MM;
        }
        if let Some(page) = pages.last_mut() {
            page.push((line, y));
        }
        y += step;
    }
    pages
}

/// Latin-1 bytes for the standard Helvetica encoding; other chars become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn show_text(ops: &mut Vec<Operation>, text: &str, x_mm: f32, y_mm: f32, font_pt: f32, color: Rgb) {
    let channel = |v: u8| Object::Real(v as f32 / 255.0);
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), Object::Real(font_pt)]));
    ops.push(Operation::new(
        "rg",
        vec![channel(color.0), channel(color.1), channel(color.2)],
    ));
    ops.push(Operation::new(
        "Td",
        vec![
            Object::Real(mm_to_pt(x_mm)),
            Object::Real(mm_to_pt(PAGE_HEIGHT_MM - y_mm)),
        ],
    ));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

fn show_centered(ops: &mut Vec<Operation>, text: &str, y_mm: f32, font_pt: f32, color: Rgb) {
    let x = PAGE_WIDTH_MM / 2.0 - text_width_mm(text, font_pt) / 2.0;
    show_text(ops, text, x, y_mm, font_pt, color);
}

fn pdf_document(text: &str, b: &DocumentBranding, date: &str) -> Result<Vec<u8>> {
    let pages = paginate(wrap_text(text, CONTENT_WIDTH_MM, BODY_PT));
    let total = pages.len();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, lines) in pages.iter().enumerate() {
        let mut ops = Vec::new();
        if index == 0 {
            show_text(&mut ops, &b.title, MARGIN_MM, 20.0, 20.0, TITLE_COLOR);
            show_text(&mut ops, &format!("Generated on {}", date), MARGIN_MM, 28.0, 10.0, DATE_COLOR);
        }
        for (line, y) in lines {
            if !line.is_empty() {
                show_text(&mut ops, line, MARGIN_MM, *y, BODY_PT, BODY_COLOR);
            }
        }
        show_centered(&mut ops, &format!("Page {} of {}", index + 1, total), 285.0, 9.0, FOOTER_COLOR);
        show_centered(&mut ops, &b.footer, 290.0, 9.0, FOOTER_COLOR);

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                Object::Real(mm_to_pt(PAGE_WIDTH_MM)),
                Object::Real(mm_to_pt(PAGE_HEIGHT_MM)),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(win_ansi(&b.title)),
        "Subject" => Object::string_literal(win_ansi(&b.subject)),
        "Author" => Object::string_literal(win_ansi(&b.author)),
        "Creator" => Object::string_literal(win_ansi(&b.creator)),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{LopdfBackend, PageSource};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
    }

    fn export(text: &str, format: DocumentFormat) -> ExportedFile {
        export_text(text, format, &DocumentBranding::default(), date()).unwrap()
    }

    #[test]
    fn test_blank_text_rejected() {
        let err = export_text(" \n ", DocumentFormat::Txt, &DocumentBranding::default(), date());
        assert!(matches!(err, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn test_format_names() {
        for format in DocumentFormat::ALL {
            assert_eq!(format.to_string().parse::<DocumentFormat>().unwrap(), format);
        }
        assert_eq!("MD".parse::<DocumentFormat>().unwrap(), DocumentFormat::Markdown);
        assert!("odt".parse::<DocumentFormat>().is_err());
    }

    #[test]
    fn test_plain_text() {
        let file = export("  Hello  ", DocumentFormat::Txt);
        assert_eq!(file.filename, "DURAI-document.txt");
        assert_eq!(file.mime, "text/plain");
        let body = String::from_utf8(file.bytes).unwrap();
        let rule = "=".repeat(50);
        assert_eq!(
            body,
            format!(
                "DURAI DOCUMENT CONVERTER\nGenerated on 3/7/2025\n{}\n\nHello\n\n{}\nCreated with DURAI Document Converter",
                rule, rule
            )
        );
    }

    #[test]
    fn test_markdown() {
        let file = export("Body", DocumentFormat::Markdown);
        assert_eq!(file.filename, "DURAI-document.md");
        let body = String::from_utf8(file.bytes).unwrap();
        assert!(body.starts_with("# DURAI Document\n\n**Generated on 3/7/2025**"));
        assert!(body.ends_with("---\n\n*Created with DURAI Document Converter*"));
    }

    #[test]
    fn test_word_has_bom_and_breaks() {
        let file = export("a < b\nnext", DocumentFormat::Docx);
        assert_eq!(file.filename, "DURAI-document.doc");
        assert_eq!(file.mime, "application/msword");
        assert_eq!(&file.bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let body = String::from_utf8(file.bytes[3..].to_vec()).unwrap();
        assert!(body.contains("a &lt; b<br>next"));
    }

    #[test]
    fn test_html_escapes() {
        let body = String::from_utf8(export("<script>", DocumentFormat::Html).bytes).unwrap();
        assert!(body.contains(r#"<div class="content">&lt;script&gt;</div>"#));
    }

    #[test]
    fn test_rtf_escapes() {
        assert_eq!(escape_rtf("a{b}\\c\nd"), "a\\{b\\}\\\\c\\par\nd");
        assert_eq!(escape_rtf("é"), "\\u233?");
        let body = String::from_utf8(export("line", DocumentFormat::Rtf).bytes).unwrap();
        assert!(body.starts_with("{\\rtf1\\ansi\\deff0\n"));
        assert!(body.contains("{\\cf1\\b\\fs32 DURAI Document\\par}"));
        assert!(body.ends_with("{\\fs18 Created with DURAI Document Converter}\n}"));
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three", 1000.0, 11.0);
        assert_eq!(lines, vec!["one two three"]);

        let narrow = wrap_text("alpha beta gamma", 12.0, 11.0);
        assert!(narrow.len() >= 3);
        assert!(narrow.iter().all(|l| text_width_mm(l, 11.0) <= 12.0 || l.chars().count() == 1));

        let blank_kept = wrap_text("a\n\nb", 100.0, 11.0);
        assert_eq!(blank_kept, vec!["a", "", "b"]);
    }

    #[test]
    fn test_pdf_single_page() {
        let file = export("Hello PDF", DocumentFormat::Pdf);
        assert_eq!(file.mime, "application/pdf");
        assert!(file.bytes.starts_with(b"%PDF-1.5"));

        let backend = LopdfBackend::load_bytes(&file.bytes).unwrap();
        assert_eq!(backend.page_count(), 1);
        let text: Vec<String> = backend
            .text_content(1)
            .unwrap()
            .into_iter()
            .map(|run| run.text)
            .collect();
        assert!(text.iter().any(|t| t == "DURAI Document"));
        assert!(text.iter().any(|t| t == "Hello PDF"));
        assert!(text.iter().any(|t| t == "Page 1 of 1"));
    }

    #[test]
    fn test_pdf_paginates() {
        let long = (0..80).map(|i| format!("Line {}", i)).collect::<Vec<_>>().join("\n");
        let file = export(&long, DocumentFormat::Pdf);
        let backend = LopdfBackend::load_bytes(&file.bytes).unwrap();
        assert_eq!(backend.page_count(), 2);
        let footer: Vec<String> = backend
            .text_content(2)
            .unwrap()
            .into_iter()
            .map(|run| run.text)
            .collect();
        assert!(footer.iter().any(|t| t == "Page 2 of 2"));
    }
}
