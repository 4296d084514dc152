//! Shared helpers for OOXML formats (DOCX, XLSX, PPTX).
//!
//! All three are zip archives of XML parts; text lives in format-specific
//! run elements (`w:t`, `a:t`) and shared metadata in `docProps/core.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use crate::error::ExtractError;
use crate::types::content::DocProperties;

/// Zip local-file magic.
pub fn is_zip(head: &[u8]) -> bool {
    head.starts_with(&[0x50, 0x4B, 0x03, 0x04]) || head.starts_with(&[0x50, 0x4B, 0x05, 0x06])
}

/// Read one named entry out of a zip archive as a string.
pub fn read_zip_entry(bytes: &[u8], name: &str) -> Result<String, ExtractError> {
    let cursor = Cursor::new(bytes);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| ExtractError::Archive(e.to_string()))?;

    let mut file = archive
        .by_name(name)
        .map_err(|e| ExtractError::Archive(format!("{}: {}", name, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| ExtractError::Archive(e.to_string()))?;
    Ok(content)
}

/// List entry names in a zip archive.
pub fn list_zip_entries(bytes: &[u8]) -> Vec<String> {
    let cursor = Cursor::new(bytes);
    let Ok(archive) = zip::ZipArchive::new(cursor) else {
        return Vec::new();
    };
    archive.file_names().map(|n| n.to_string()).collect()
}

/// Collect the text content of every `<tag>` element, in document order.
pub fn text_runs(xml: &str, tag: &[u8]) -> Vec<String> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut runs = Vec::new();
    let mut in_run = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == tag => in_run = true,
            Ok(Event::End(ref e)) if e.name().as_ref() == tag => in_run = false,
            Ok(Event::Text(e)) if in_run => {
                let text = e.unescape().unwrap_or_default();
                runs.push(text.to_string());
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "XML parse stopped early");
                break;
            }
            _ => {}
        }
        buf.clear();
    }

    runs
}

/// Read title/author/subject/keywords from `docProps/core.xml`.
pub fn core_properties(bytes: &[u8]) -> DocProperties {
    let mut props = DocProperties::default();

    let Ok(xml) = read_zip_entry(bytes, "docProps/core.xml") else {
        return props;
    };

    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();
    let mut current_element = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => current_element = e.name().as_ref().to_vec(),
            Ok(Event::End(_)) => current_element.clear(),
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match current_element.as_slice() {
                    b"dc:title" => props.title = Some(text),
                    b"dc:creator" => props.author = Some(text),
                    b"dc:subject" => props.subject = Some(text),
                    b"cp:keywords" => props.keywords = Some(text),
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    props
}

/// Build an in-memory zip with the given (name, content) entries.
///
/// Test helper shared by the OOXML extractor tests.
#[cfg(test)]
pub(crate) fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_magic() {
        let archive = build_zip(&[("a.txt", "hi")]);
        assert!(is_zip(&archive));
        assert!(!is_zip(b"%PDF-1.7"));
    }

    #[test]
    fn test_read_zip_entry() {
        let archive = build_zip(&[("word/document.xml", "<w:document/>")]);
        assert_eq!(
            read_zip_entry(&archive, "word/document.xml").unwrap(),
            "<w:document/>"
        );
        assert!(read_zip_entry(&archive, "missing.xml").is_err());
    }

    #[test]
    fn test_text_runs_in_order() {
        let xml = r#"<w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:t xml:space="preserve"> world</w:t></w:r></w:p>"#;
        let runs = text_runs(xml, b"w:t");
        assert_eq!(runs, vec!["Hello", " world"]);
    }

    #[test]
    fn test_text_runs_unescapes_entities() {
        let xml = "<a:t>Q&amp;A</a:t>";
        assert_eq!(text_runs(xml, b"a:t"), vec!["Q&A"]);
    }

    #[test]
    fn test_core_properties() {
        let core = r#"<?xml version="1.0"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
                   xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>Annual Plan</dc:title>
  <dc:creator>Ada</dc:creator>
  <dc:subject>Planning</dc:subject>
  <cp:keywords>plan, roadmap</cp:keywords>
</cp:coreProperties>"#;
        let archive = build_zip(&[("docProps/core.xml", core)]);

        let props = core_properties(&archive);
        assert_eq!(props.title.as_deref(), Some("Annual Plan"));
        assert_eq!(props.author.as_deref(), Some("Ada"));
        assert_eq!(props.subject.as_deref(), Some("Planning"));
        assert_eq!(props.keywords.as_deref(), Some("plan, roadmap"));
    }
}
