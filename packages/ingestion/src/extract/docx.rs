//! DOCX text and metadata extraction.
//!
//! A DOCX is a zip archive; visible text lives in `<w:t>` run elements of
//! `word/document.xml` and document metadata in `docProps/core.xml`. No
//! layout reconstruction is attempted.

use tracing::{debug, warn};

use crate::extract::office;
use crate::extract::sample::{collapse_whitespace, truncate_chars};
use crate::types::config::Budgets;
use crate::types::content::ExtractedContent;

/// Extract text runs and core properties from DOCX bytes.
///
/// Never fails: a broken archive yields `Empty` and the caller falls back
/// to filename-derived metadata.
pub fn extract_docx(bytes: &[u8], budgets: &Budgets) -> ExtractedContent {
    let xml = match office::read_zip_entry(bytes, "word/document.xml") {
        Ok(xml) => xml,
        Err(e) => {
            warn!(error = %e, "failed to open DOCX document part");
            return ExtractedContent::Empty;
        }
    };

    let runs = office::text_runs(&xml, b"w:t");
    let text = truncate_chars(&collapse_whitespace(&runs.join(" ")), budgets.max_extract_chars)
        .to_string();

    let properties = office::core_properties(bytes);

    debug!(
        runs = runs.len(),
        text_chars = text.chars().count(),
        has_title = properties.title.is_some(),
        "DOCX extracted"
    );

    ExtractedContent::Docx { text, properties }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::office::build_zip;

    const DOCUMENT: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Meeting notes</w:t></w:r></w:p>
    <w:p><w:r><w:t>First   item</w:t></w:r><w:r><w:t xml:space="preserve"> continued</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    const CORE: &str = r#"<?xml version="1.0"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
                   xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>Team Sync</dc:title>
  <dc:creator>Grace</dc:creator>
</cp:coreProperties>"#;

    #[test]
    fn test_extracts_runs_and_properties() {
        let archive = build_zip(&[
            ("word/document.xml", DOCUMENT),
            ("docProps/core.xml", CORE),
        ]);

        let content = extract_docx(&archive, &Budgets::default());
        match content {
            ExtractedContent::Docx { text, properties } => {
                assert_eq!(text, "Meeting notes First item continued");
                assert_eq!(properties.title.as_deref(), Some("Team Sync"));
                assert_eq!(properties.author.as_deref(), Some("Grace"));
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_missing_document_part_is_empty() {
        let archive = build_zip(&[("other.xml", "<x/>")]);
        assert_eq!(
            extract_docx(&archive, &Budgets::default()),
            ExtractedContent::Empty
        );
    }

    #[test]
    fn test_not_a_zip_is_empty() {
        assert_eq!(
            extract_docx(b"plain text", &Budgets::default()),
            ExtractedContent::Empty
        );
    }
}
