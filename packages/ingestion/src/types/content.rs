//! Per-format extracted content.
//!
//! Transient: created per request, rendered into the AI prompt, then
//! discarded. Never cached or persisted.

/// Document-level properties read from format metadata (PDF Info
/// dictionary, OOXML core properties).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocProperties {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
}

impl DocProperties {
    /// Title, if present and long enough to be meaningful.
    pub fn usable_title(&self, min_chars: usize) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| t.chars().count() >= min_chars)
    }
}

/// Structured content pulled out of a file by a format extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedContent {
    /// PDF: page-bounded text plus document metadata
    Pdf {
        text: String,
        page_count: usize,
        properties: DocProperties,
    },

    /// DOCX: concatenated text runs plus core properties
    Docx {
        text: String,
        properties: DocProperties,
    },

    /// CSV/XLSX: header row, a small row sample, and full-sheet counts
    Sheet {
        headers: Vec<String>,
        first_rows: Vec<Vec<String>>,
        row_count: usize,
        column_count: usize,
    },

    /// PPTX: slide titles and a bounded set of bullet points
    Slides {
        slide_count: usize,
        slide_titles: Vec<String>,
        bullet_points: Vec<String>,
    },

    /// Plain text / markdown: a representative sample
    Text { sample: String, total_chars: usize },

    /// Nothing extractable
    Empty,
}

impl ExtractedContent {
    /// Whether extraction produced anything worth prompting with.
    pub fn is_empty(&self) -> bool {
        match self {
            ExtractedContent::Pdf { text, properties, .. } => {
                text.trim().is_empty() && properties.title.is_none()
            }
            ExtractedContent::Docx { text, properties } => {
                text.trim().is_empty() && properties.title.is_none()
            }
            ExtractedContent::Sheet { headers, first_rows, .. } => {
                headers.is_empty() && first_rows.is_empty()
            }
            ExtractedContent::Slides {
                slide_titles,
                bullet_points,
                ..
            } => slide_titles.is_empty() && bullet_points.is_empty(),
            ExtractedContent::Text { sample, .. } => sample.trim().is_empty(),
            ExtractedContent::Empty => true,
        }
    }

    /// Document properties, for formats that carry them.
    pub fn properties(&self) -> Option<&DocProperties> {
        match self {
            ExtractedContent::Pdf { properties, .. }
            | ExtractedContent::Docx { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Plain-text body, for formats that have one.
    pub fn body_text(&self) -> Option<&str> {
        match self {
            ExtractedContent::Pdf { text, .. } | ExtractedContent::Docx { text, .. } => {
                Some(text.as_str())
            }
            ExtractedContent::Text { sample, .. } => Some(sample.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_detection() {
        assert!(ExtractedContent::Empty.is_empty());
        assert!(ExtractedContent::Pdf {
            text: "  ".into(),
            page_count: 3,
            properties: DocProperties::default(),
        }
        .is_empty());
        assert!(!ExtractedContent::Sheet {
            headers: vec!["a".into()],
            first_rows: vec![],
            row_count: 0,
            column_count: 1,
        }
        .is_empty());
    }

    #[test]
    fn test_usable_title_threshold() {
        let props = DocProperties {
            title: Some("Q3".into()),
            ..Default::default()
        };
        assert!(props.usable_title(4).is_none());
        assert_eq!(props.usable_title(2), Some("Q3"));
    }
}
