//! Input validation: is this file a PDF we can convert?
//!
//! Conversion refuses anything that does not start with a `%PDF-x.y`
//! header before touching any editor state.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Header information sniffed from a PDF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// Declared version, e.g. "1.7".
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_LEN: usize = 8; // "%PDF-1.7"

/// MIME type accepted by the converter.
pub const PDF_MIME: &str = "application/pdf";

/// Sniff the header of a file on disk.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(16);
    file.by_ref().take(16).read_to_end(&mut header)?;
    sniff_bytes(&header)
}

/// Sniff the header of an in-memory buffer.
pub fn sniff_bytes(data: &[u8]) -> Result<PdfHeader> {
    if data.len() < HEADER_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = String::from_utf8_lossy(&data[PDF_MAGIC.len()..HEADER_LEN]).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version })
}

/// Check a declared MIME type the way a file picker reports it.
pub fn ensure_pdf_mime(mime: &str) -> Result<()> {
    if mime.trim().eq_ignore_ascii_case(PDF_MIME) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Whether the buffer looks like a PDF.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_valid_pdf() {
        let header = sniff_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_sniff_rejects_other_formats() {
        assert!(matches!(
            sniff_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(sniff_bytes(b"%PDF"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_bad_version() {
        assert!(matches!(
            sniff_bytes(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_mime_check() {
        assert!(ensure_pdf_mime("application/pdf").is_ok());
        assert!(ensure_pdf_mime("Application/PDF ").is_ok());
        assert!(ensure_pdf_mime("image/png").is_err());
    }

    #[test]
    fn test_sniff_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"%PDF-1.4\n1 0 obj\n").unwrap();
        assert!(sniff_path(&path).is_ok());

        let other = dir.path().join("a.txt");
        std::fs::write(&other, b"hello").unwrap();
        assert!(sniff_path(&other).is_err());
    }
}
