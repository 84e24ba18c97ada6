use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Text extraction failed: {0}")]
    Extraction(String),
}

/// Document-to-text capability.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, DocumentError>;
}

/// Default extractor: PDF via `pdf-extract`, DOCX via its `word/document.xml`
/// part, anything else via lossy UTF-8. Output is passed through `clean_text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl DocumentExtractor for TextExtractor {
    fn extract(&self, bytes: &[u8], mime_type: &str) -> Result<String, DocumentError> {
        let raw = match mime_type {
            MIME_PDF => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| DocumentError::Extraction(e.to_string()))?,
            MIME_DOCX => extract_docx(bytes)?,
            _ => String::from_utf8_lossy(bytes).into_owned(),
        };

        let text = clean_text(&raw);
        debug!(
            "Extracted {} chars from {} byte {} document",
            text.len(),
            bytes.len(),
            mime_type
        );
        Ok(text)
    }
}

/// Paragraph text of a DOCX body, one line per `w:p`.
fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Extraction(format!("invalid DOCX archive: {e}")))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| DocumentError::Extraction(format!("missing DOCX body: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Extraction(format!("unreadable DOCX body: {e}")))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| DocumentError::Extraction(format!("malformed DOCX text: {e}")))?;
                text.push_str(&unescaped);
            }
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" => text.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(DocumentError::Extraction(format!(
                    "malformed DOCX XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }
    Ok(text)
}

/// Guesses a mime type from magic bytes, then the file extension.
pub fn detect_mime_type(bytes: &[u8], filename: &str) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        return MIME_PDF;
    }
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => MIME_PDF,
        "docx" => MIME_DOCX,
        "txt" => MIME_TEXT,
        _ => "application/octet-stream",
    }
}

/// Collapses whitespace, drops control characters, and normalizes curly
/// quotes and long dashes.
pub fn clean_text(text: &str) -> String {
    let normalized: String = text
        .chars()
        .filter_map(|c| match c {
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\u{2013}' | '\u{2014}' => Some('-'),
            c if c.is_whitespace() => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Minimal DOCX archive wrapping `body` in a `w:document`.
#[cfg(test)]
pub(crate) fn docx_bytes(body: &str) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_and_normalizes() {
        let raw = "  Senior\u{0007} Engineer\n\n\t\u{201C}Rust\u{201D} \u{2014} systems  ";
        assert_eq!(clean_text(raw), "Senior Engineer \"Rust\" - systems");
    }

    #[test]
    fn test_plain_text_extraction() {
        let text = TextExtractor
            .extract(b"Jane Doe\r\nRust developer", MIME_TEXT)
            .unwrap();
        assert_eq!(text, "Jane Doe Rust developer");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let text = TextExtractor
            .extract(&[b'O', b'K', 0xFF, b'!'], MIME_TEXT)
            .unwrap();
        assert!(text.starts_with("OK"));
        assert!(text.ends_with('!'));
    }

    #[test]
    fn test_docx_extraction() {
        let bytes = docx_bytes(
            "<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Rust</w:t></w:r><w:r><w:tab/><w:t xml:space=\"preserve\">R&amp;D lead</w:t></w:r></w:p>",
        );
        let text = TextExtractor.extract(&bytes, MIME_DOCX).unwrap();
        assert_eq!(text, "Jane Doe Rust R&D lead");
    }

    #[test]
    fn test_docx_without_body_fails() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = TextExtractor.extract(&bytes, MIME_DOCX).unwrap_err();
        assert!(matches!(err, DocumentError::Extraction(_)));
    }

    #[test]
    fn test_corrupt_docx_fails() {
        let err = TextExtractor.extract(b"PK\x03\x04", MIME_DOCX).unwrap_err();
        assert!(matches!(err, DocumentError::Extraction(_)));
    }

    #[test]
    fn test_unknown_type_decodes_as_text() {
        let text = TextExtractor
            .extract(b"name,skill\nJane,Rust", "text/csv")
            .unwrap();
        assert_eq!(text, "name,skill Jane,Rust");
    }

    #[test]
    fn test_detect_mime_type() {
        assert_eq!(detect_mime_type(b"%PDF-1.7", "cv.bin"), MIME_PDF);
        assert_eq!(detect_mime_type(b"PK\x03\x04", "CV.DOCX"), MIME_DOCX);
        assert_eq!(detect_mime_type(b"hello", "notes.txt"), MIME_TEXT);
        assert_eq!(
            detect_mime_type(b"hello", "noext"),
            "application/octet-stream"
        );
    }
}
