//! PPTX slide extraction.
//!
//! Slide XML parts are sorted by their numeric index, capped, and mined
//! for text runs: the first run of each slide is its title candidate,
//! later runs become bullet points under per-slide and global caps.

use tracing::{debug, warn};

use crate::extract::office;
use crate::types::config::Budgets;
use crate::types::content::ExtractedContent;

/// Extract slide titles and bullet points from PPTX bytes.
pub fn extract_slides(bytes: &[u8], budgets: &Budgets) -> ExtractedContent {
    let mut slides: Vec<(usize, String)> = office::list_zip_entries(bytes)
        .into_iter()
        .filter_map(|name| slide_index(&name).map(|idx| (idx, name)))
        .collect();

    if slides.is_empty() {
        warn!("PPTX archive has no slide parts");
        return ExtractedContent::Empty;
    }

    slides.sort_by_key(|(idx, _)| *idx);
    let slide_count = slides.len();

    let mut slide_titles = Vec::new();
    let mut bullet_points = Vec::new();

    for (_, name) in slides.into_iter().take(budgets.max_slides) {
        let xml = match office::read_zip_entry(bytes, &name) {
            Ok(xml) => xml,
            Err(e) => {
                debug!(slide = %name, error = %e, "skipping unreadable slide");
                continue;
            }
        };

        let mut runs = office::text_runs(&xml, b"a:t")
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        if let Some(title) = runs.next() {
            slide_titles.push(title);
        }

        let mut taken_this_slide = 0;
        for run in runs {
            if taken_this_slide >= budgets.bullets_per_slide
                || bullet_points.len() >= budgets.max_bullets
            {
                break;
            }
            if run.chars().count() >= budgets.min_bullet_chars {
                bullet_points.push(run);
                taken_this_slide += 1;
            }
        }
    }

    debug!(
        slide_count,
        titles = slide_titles.len(),
        bullets = bullet_points.len(),
        "PPTX extracted"
    );

    ExtractedContent::Slides {
        slide_count,
        slide_titles,
        bullet_points,
    }
}

/// Numeric index of a `ppt/slides/slideN.xml` entry.
fn slide_index(name: &str) -> Option<usize> {
    name.strip_prefix("ppt/slides/slide")?
        .strip_suffix(".xml")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::office::build_zip;

    fn slide_xml(runs: &[&str]) -> String {
        let body: String = runs
            .iter()
            .map(|r| format!("<a:r><a:t>{}</a:t></a:r>", r))
            .collect();
        format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">{}</p:sld>"#,
            body
        )
    }

    #[test]
    fn test_slide_index_parsing() {
        assert_eq!(slide_index("ppt/slides/slide1.xml"), Some(1));
        assert_eq!(slide_index("ppt/slides/slide12.xml"), Some(12));
        assert_eq!(slide_index("ppt/slides/_rels/slide1.xml.rels"), None);
        assert_eq!(slide_index("ppt/media/image1.png"), None);
    }

    #[test]
    fn test_numeric_slide_order() {
        // slide10 must sort after slide2, not between slide1 and slide2.
        let s1 = slide_xml(&["First deck title"]);
        let s2 = slide_xml(&["Second slide"]);
        let s10 = slide_xml(&["Tenth slide"]);
        let archive = build_zip(&[
            ("ppt/slides/slide10.xml", &s10),
            ("ppt/slides/slide1.xml", &s1),
            ("ppt/slides/slide2.xml", &s2),
        ]);

        match extract_slides(&archive, &Budgets::default()) {
            ExtractedContent::Slides {
                slide_count,
                slide_titles,
                ..
            } => {
                assert_eq!(slide_count, 3);
                assert_eq!(
                    slide_titles,
                    vec!["First deck title", "Second slide", "Tenth slide"]
                );
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_bullet_caps_and_minimum_length() {
        // First run is the title; "tiny" is under the 6-char minimum.
        let s1 = slide_xml(&[
            "Roadmap",
            "tiny",
            "Ship the parser",
            "Cut release branch",
            "Write migration guide",
            "Notify customers",
            "Archive old docs",
            "Overflow bullet past per-slide cap",
        ]);
        let archive = build_zip(&[("ppt/slides/slide1.xml", &s1)]);

        match extract_slides(&archive, &Budgets::default()) {
            ExtractedContent::Slides { bullet_points, .. } => {
                assert_eq!(bullet_points.len(), 5);
                assert!(!bullet_points.contains(&"tiny".to_string()));
                assert!(!bullet_points
                    .iter()
                    .any(|b| b.contains("Overflow")));
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_global_bullet_cap() {
        let mut entries = Vec::new();
        let xmls: Vec<(String, String)> = (1..=6)
            .map(|i| {
                let runs: Vec<String> = (0..6)
                    .map(|j| format!("Slide {} bullet number {}", i, j))
                    .collect();
                let refs: Vec<&str> = runs.iter().map(String::as_str).collect();
                (format!("ppt/slides/slide{}.xml", i), slide_xml(&refs))
            })
            .collect();
        for (name, xml) in &xmls {
            entries.push((name.as_str(), xml.as_str()));
        }
        let archive = build_zip(&entries);

        match extract_slides(&archive, &Budgets::default()) {
            ExtractedContent::Slides { bullet_points, .. } => {
                assert_eq!(bullet_points.len(), Budgets::default().max_bullets);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_not_a_deck_is_empty() {
        let archive = build_zip(&[("word/document.xml", "<w:document/>")]);
        assert_eq!(
            extract_slides(&archive, &Budgets::default()),
            ExtractedContent::Empty
        );
    }
}
