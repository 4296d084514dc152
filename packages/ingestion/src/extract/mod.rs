//! Format-specific content extractors.
//!
//! Each extractor turns raw bytes into an [`ExtractedContent`] plus
//! whatever title candidate the format carries. Shared policy: bounded
//! text budgets, bounded structural enumeration, and no hard failures.
//! Extraction problems degrade to empty content and the pipeline decides
//! what to do next.

pub mod docx;
pub mod office;
pub mod pdf;
pub mod sample;
pub mod sheet;
pub mod slides;
pub mod text;

pub use pdf::is_pdf;
pub use sample::{sample_text, truncate_chars};

use crate::types::config::Budgets;
use crate::types::content::ExtractedContent;

/// Broad media kind resolved from MIME type and filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Docx,
    Sheet,
    Slides,
    Text,
    Image,
    Video,
    Audio,
    Unknown,
}

/// Resolve the media kind from the declared MIME type, falling back to
/// the filename extension.
pub fn classify(mime: &str, file_name: &str) -> MediaKind {
    let mime = mime.to_ascii_lowercase();
    let name = file_name.to_ascii_lowercase();

    if mime.contains("pdf") || name.ends_with(".pdf") {
        return MediaKind::Pdf;
    }
    if mime.contains("wordprocessingml") || mime.contains("msword") || name.ends_with(".docx") {
        return MediaKind::Docx;
    }
    if mime.contains("spreadsheetml")
        || mime.contains("csv")
        || name.ends_with(".xlsx")
        || name.ends_with(".csv")
    {
        return MediaKind::Sheet;
    }
    if mime.contains("presentationml") || name.ends_with(".pptx") {
        return MediaKind::Slides;
    }
    if mime.starts_with("image/") {
        return MediaKind::Image;
    }
    if mime.starts_with("video/") {
        return MediaKind::Video;
    }
    if mime.starts_with("audio/") {
        return MediaKind::Audio;
    }
    if mime.starts_with("text/")
        || name.ends_with(".md")
        || name.ends_with(".markdown")
        || name.ends_with(".txt")
    {
        return MediaKind::Text;
    }

    MediaKind::Unknown
}

/// Run the extractor for a kind against fetched bytes.
///
/// Image, video, and audio inputs never reach this point: images go
/// straight to the model and A/V derives metadata from the filename.
pub fn extract_bytes(kind: MediaKind, bytes: &[u8], budgets: &Budgets) -> ExtractedContent {
    match kind {
        MediaKind::Pdf => pdf::extract_pdf(bytes, budgets),
        MediaKind::Docx => docx::extract_docx(bytes, budgets),
        MediaKind::Sheet => sheet::extract_sheet(bytes, budgets),
        MediaKind::Slides => slides::extract_slides(bytes, budgets),
        MediaKind::Text | MediaKind::Unknown => match std::str::from_utf8(bytes) {
            Ok(body) => text::extract_text_content(body, budgets),
            Err(_) => ExtractedContent::Empty,
        },
        MediaKind::Image | MediaKind::Video | MediaKind::Audio => ExtractedContent::Empty,
    }
}

/// Turn a filename into a human-readable title: strip the extension,
/// replace `_`/`-` with spaces, and title-case words while preserving
/// 2–5 letter all-caps acronyms.
pub fn clean_filename(name: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => name,
    };

    stem.replace(['_', '-'], " ")
        .split_whitespace()
        .map(|word| {
            if is_acronym(word) {
                word.to_string()
            } else {
                title_case(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_acronym(word: &str) -> bool {
    let len = word.chars().count();
    (2..=5).contains(&len)
        && word.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && word.chars().any(|c| c.is_ascii_uppercase())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
