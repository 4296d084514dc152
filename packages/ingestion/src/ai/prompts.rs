//! Prompt construction for analysis calls.

use crate::types::content::ExtractedContent;
use crate::web::WebExtraction;

/// System prompt shared by every analysis call.
pub fn system_prompt() -> String {
    "You are a metadata librarian. Given content a user saved, produce concise, \
     accurate metadata for search and organization. Titles are short and human; \
     descriptions are one or two sentences; tags are 1-6 lowercase topical labels; \
     pick the single best-fitting category. Use only what the content supports - \
     do not invent facts."
        .to_string()
}

/// User prompt for a web page.
pub fn url_prompt(extraction: &WebExtraction) -> String {
    let mut prompt = format!("Analyze the content saved from this URL: {}\n", extraction.url);

    if let Some(platform) = extraction.platform {
        prompt.push_str(&format!("Platform: {}\n", platform));
    }
    if let Some(title) = &extraction.metadata.title {
        prompt.push_str(&format!("Page title: {}\n", title));
    }
    if let Some(description) = &extraction.metadata.description {
        prompt.push_str(&format!("Page description: {}\n", description));
    }
    if let Some(author) = &extraction.metadata.author {
        prompt.push_str(&format!("Author: {}\n", author));
    }
    if !extraction.content.is_empty() {
        prompt.push_str(&format!("\nPage content:\n{}\n", extraction.content));
    }

    prompt
}

/// User prompt for an extracted file.
pub fn file_prompt(file_name: &str, content: &ExtractedContent) -> String {
    format!(
        "Analyze this uploaded file: {}\n\n{}",
        file_name,
        render_content(content)
    )
}

/// User prompt for an image, analyzed visually in one pass.
pub fn image_prompt(file_name: &str) -> String {
    format!(
        "Analyze this image ({}). Read any text in it (OCR) into extractedText, \
         describe what it shows, and classify it.",
        file_name
    )
}

/// User prompt for the PDF multimodal fallback.
pub fn document_prompt(file_name: &str) -> String {
    format!(
        "The attached document ({}) yielded no machine-readable text. Read it \
         visually, extract its key content, and produce metadata.",
        file_name
    )
}

/// Render extracted content as prompt text.
pub fn render_content(content: &ExtractedContent) -> String {
    match content {
        ExtractedContent::Pdf {
            text, page_count, properties,
        } => {
            let mut out = format!("PDF document, {} pages.\n", page_count);
            if let Some(title) = &properties.title {
                out.push_str(&format!("Document title: {}\n", title));
            }
            if let Some(author) = &properties.author {
                out.push_str(&format!("Document author: {}\n", author));
            }
            out.push_str(&format!("\n{}", text));
            out
        }
        ExtractedContent::Docx { text, properties } => {
            let mut out = String::from("Word document.\n");
            if let Some(title) = &properties.title {
                out.push_str(&format!("Document title: {}\n", title));
            }
            out.push_str(&format!("\n{}", text));
            out
        }
        ExtractedContent::Sheet {
            headers,
            first_rows,
            row_count,
            column_count,
        } => {
            let mut out = format!(
                "Spreadsheet with {} data rows and {} columns.\nColumns: {}\n",
                row_count,
                column_count,
                headers.join(", ")
            );
            if !first_rows.is_empty() {
                out.push_str("Sample rows:\n");
                for row in first_rows {
                    out.push_str(&format!("  {}\n", row.join(" | ")));
                }
            }
            out
        }
        ExtractedContent::Slides {
            slide_count,
            slide_titles,
            bullet_points,
        } => {
            let mut out = format!("Presentation with {} slides.\n", slide_count);
            if !slide_titles.is_empty() {
                out.push_str(&format!("Slide titles:\n  {}\n", slide_titles.join("\n  ")));
            }
            if !bullet_points.is_empty() {
                out.push_str(&format!("Bullet points:\n  {}\n", bullet_points.join("\n  ")));
            }
            out
        }
        ExtractedContent::Text { sample, total_chars } => {
            format!("Text document ({} characters).\n\n{}", total_chars, sample)
        }
        ExtractedContent::Empty => "No content could be extracted.".to_string(),
    }
}
