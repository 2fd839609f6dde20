//! # Word (DOCX) Text Extraction
//!
//! A `.docx` file is a zip archive; the body lives in `word/document.xml`.
//! Text runs (`<w:t>`) are collected per paragraph (`<w:p>`) and paragraphs
//! are joined with newlines.

use super::IngestError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

/// Extracts paragraph text from a DOCX document.
pub fn extract_text_from_docx(data: &[u8]) -> Result<String, IngestError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| IngestError::Parse(format!("Not a valid DOCX archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| IngestError::Parse(format!("DOCX is missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| IngestError::Parse(format!("Failed to read {DOCUMENT_PART}: {e}")))?;

    paragraphs_from_document_xml(&xml).map(|paragraphs| paragraphs.join("\n"))
}

fn paragraphs_from_document_xml(xml: &str) -> Result<Vec<String>, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text_run = false;

    loop {
        match reader
            .read_event()
            .map_err(|e| IngestError::Parse(format!("Malformed DOCX XML: {e}")))?
        {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                // A self-closing paragraph is an empty line.
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => push_to(&mut current, "\t"),
                b"w:br" | b"w:cr" => push_to(&mut current, "\n"),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| IngestError::Parse(format!("Malformed DOCX text: {e}")))?;
                push_to(&mut current, &text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_to(current: &mut Option<String>, text: &str) {
    current.get_or_insert_with(String::new).push_str(text);
}
