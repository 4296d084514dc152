//! PDF text and metadata extraction.
//!
//! Walks pages with `lopdf`, accumulating text until the page cap or the
//! character budget is reached, and reads title/author/subject from the
//! Info dictionary. Scanned or image-only PDFs produce little or no text;
//! the pipeline detects that and escalates to the multimodal fallback.

use lopdf::{Dictionary, Document, Object};
use tracing::{debug, warn};

use crate::types::config::Budgets;
use crate::types::content::{DocProperties, ExtractedContent};

/// PDF magic bytes.
pub fn is_pdf(head: &[u8]) -> bool {
    head.starts_with(b"%PDF-")
}

/// Extract text and document properties from PDF bytes.
///
/// Never fails: unparseable input yields an empty `Pdf` content value and
/// the caller decides on fallback.
pub fn extract_pdf(bytes: &[u8], budgets: &Budgets) -> ExtractedContent {
    let doc = match Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(error = %e, "failed to parse PDF");
            return ExtractedContent::Pdf {
                text: String::new(),
                page_count: 0,
                properties: DocProperties::default(),
            };
        }
    };

    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut text = String::new();
    for (walked, page_number) in pages.keys().enumerate() {
        if walked >= budgets.max_pdf_pages || text.chars().count() >= budgets.max_extract_chars {
            break;
        }
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => {
                let trimmed = page_text.trim();
                if !trimmed.is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(trimmed);
                }
            }
            Err(e) => {
                debug!(page = page_number, error = %e, "page text extraction failed");
            }
        }
    }

    if let Some((idx, _)) = text.char_indices().nth(budgets.max_extract_chars) {
        text.truncate(idx);
    }

    let properties = info_properties(&doc);

    debug!(
        page_count,
        text_chars = text.chars().count(),
        has_title = properties.title.is_some(),
        "PDF extracted"
    );

    ExtractedContent::Pdf {
        text,
        page_count,
        properties,
    }
}

/// Read title/author/subject out of the trailer's Info dictionary.
fn info_properties(doc: &Document) -> DocProperties {
    let mut props = DocProperties::default();

    let Ok(info_obj) = doc.trailer.get(b"Info") else {
        return props;
    };

    let dict: &Dictionary = match info_obj {
        Object::Reference(id) => match doc.get_dictionary(*id) {
            Ok(d) => d,
            Err(_) => return props,
        },
        Object::Dictionary(d) => d,
        _ => return props,
    };

    props.title = dict_text(dict, b"Title");
    props.author = dict_text(dict, b"Author");
    props.subject = dict_text(dict, b"Subject");
    props
}

fn dict_text(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => {
            let decoded = decode_pdf_string(bytes);
            let trimmed = decoded.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

/// PDF text strings are either UTF-16BE (with a BOM) or roughly Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
