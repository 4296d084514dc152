//! Spreadsheet extraction: CSV and XLSX.
//!
//! CSV gets a quote-aware parser (double-quote escaping, quoted newlines).
//! XLSX is a zip archive: the shared-string table is resolved first, then
//! `A1`-style cell references are parsed into (row, column) coordinates so
//! the first rows can be reconstructed in column order and the full sheet
//! dimensions reported.

use std::collections::{BTreeMap, BTreeSet};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

use crate::extract::office;
use crate::types::config::Budgets;
use crate::types::content::ExtractedContent;

/// Extract a spreadsheet from bytes, sniffing XLSX (zip) vs CSV (text).
pub fn extract_sheet(bytes: &[u8], budgets: &Budgets) -> ExtractedContent {
    if office::is_zip(bytes) {
        extract_xlsx(bytes, budgets)
    } else {
        extract_csv(&String::from_utf8_lossy(bytes), budgets)
    }
}

/// Parse CSV text into header row, sample rows, and full counts.
pub fn extract_csv(text: &str, budgets: &Budgets) -> ExtractedContent {
    let records: Vec<Vec<String>> = parse_csv_records(text)
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].trim().is_empty()))
        .collect();

    if records.is_empty() {
        return ExtractedContent::Sheet {
            headers: Vec::new(),
            first_rows: Vec::new(),
            row_count: 0,
            column_count: 0,
        };
    }

    let column_count = records.iter().map(|r| r.len()).max().unwrap_or(0);
    let headers = records[0].clone();
    let data = &records[1..];

    debug!(
        rows = data.len(),
        columns = column_count,
        "CSV parsed"
    );

    ExtractedContent::Sheet {
        headers,
        first_rows: data.iter().take(budgets.max_sample_rows).cloned().collect(),
        row_count: data.len(),
        column_count,
    }
}

/// Quote-aware CSV record parser: comma-delimited, `""` escapes a quote
/// inside a quoted field, newlines inside quotes are literal.
pub fn parse_csv_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        field.push('"');
                        chars.next();
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

/// Parse an `A1`-style cell reference into 1-based (row, column).
pub fn parse_cell_ref(reference: &str) -> Option<(u32, u32)> {
    let letters: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    let digits = &reference[letters.len()..];

    if letters.is_empty() || digits.is_empty() {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)?;
    }

    let row: u32 = digits.parse().ok()?;
    (row > 0).then_some((row, col))
}

/// Extract the first worksheet of an XLSX archive.
fn extract_xlsx(bytes: &[u8], budgets: &Budgets) -> ExtractedContent {
    let shared = match office::read_zip_entry(bytes, "xl/sharedStrings.xml") {
        Ok(xml) => parse_shared_strings(&xml),
        Err(_) => Vec::new(),
    };

    let sheet_xml = match office::read_zip_entry(bytes, "xl/worksheets/sheet1.xml") {
        Ok(xml) => xml,
        Err(_) => {
            // Fall back to the first worksheet entry by name.
            let mut names: Vec<String> = office::list_zip_entries(bytes)
                .into_iter()
                .filter(|n| n.starts_with("xl/worksheets/") && n.ends_with(".xml"))
                .collect();
            names.sort();
            let Some(first) = names.first() else {
                warn!("XLSX archive has no worksheets");
                return ExtractedContent::Empty;
            };
            match office::read_zip_entry(bytes, first) {
                Ok(xml) => xml,
                Err(e) => {
                    warn!(error = %e, "failed to read worksheet");
                    return ExtractedContent::Empty;
                }
            }
        }
    };

    let cells = parse_worksheet(&sheet_xml, &shared);

    let mut rows: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    let mut columns: BTreeSet<u32> = BTreeSet::new();
    for (row, col, value) in cells {
        columns.insert(col);
        rows.entry(row).or_default().insert(col, value);
    }

    let row_count = rows.len();
    let column_count = columns.len();

    let mut ordered = rows.into_values();
    let headers: Vec<String> = ordered
        .next()
        .map(|r| r.into_values().collect())
        .unwrap_or_default();
    let first_rows: Vec<Vec<String>> = ordered
        .take(budgets.max_sample_rows)
        .map(|r| r.into_values().collect())
        .collect();

    debug!(row_count, column_count, "XLSX parsed");

    ExtractedContent::Sheet {
        headers,
        first_rows,
        row_count,
        column_count,
    }
}

/// Resolve the shared-string table: one concatenated string per `<si>`.
fn parse_shared_strings(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"si" => {
                    in_si = false;
                    strings.push(current.clone());
                }
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_t => {
                current.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    strings
}

/// Walk `<c>` cells, resolving shared-string values, into
/// (row, column, value) triples.
fn parse_worksheet(xml: &str, shared: &[String]) -> Vec<(u32, u32, String)> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    let mut buf = Vec::new();

    let mut cells = Vec::new();
    let mut cell_ref: Option<(u32, u32)> = None;
    let mut cell_type = String::new();
    let mut in_value = false;
    let mut value = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"c" => {
                cell_ref = None;
                cell_type.clear();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"r" => {
                            cell_ref = parse_cell_ref(&String::from_utf8_lossy(&attr.value));
                        }
                        b"t" => {
                            cell_type = String::from_utf8_lossy(&attr.value).into_owned();
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"v" => {
                in_value = true;
                value.clear();
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"v" => {
                in_value = false;
                if let Some((row, col)) = cell_ref {
                    let resolved = if cell_type == "s" {
                        value
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|i| shared.get(i))
                            .cloned()
                            .unwrap_or_default()
                    } else {
                        value.clone()
                    };
                    cells.push((row, col, resolved));
                }
            }
            Ok(Event::Text(e)) if in_value => {
                value.push_str(&e.unescape().unwrap_or_default());
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::office::build_zip;

    #[test]
    fn test_csv_headers_and_counts() {
        let content = extract_csv("a,b\n1,2\n3,4", &Budgets::default());
        match content {
            ExtractedContent::Sheet {
                headers,
                first_rows,
                row_count,
                column_count,
            } => {
                assert_eq!(headers, vec!["a", "b"]);
                assert_eq!(row_count, 2);
                assert_eq!(column_count, 2);
                assert_eq!(first_rows, vec![vec!["1", "2"], vec!["3", "4"]]);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_csv_sample_capped_at_five_rows() {
        let mut text = String::from("h1,h2\n");
        for i in 0..20 {
            text.push_str(&format!("{},{}\n", i, i * 2));
        }

        match extract_csv(&text, &Budgets::default()) {
            ExtractedContent::Sheet {
                first_rows,
                row_count,
                ..
            } => {
                assert_eq!(first_rows.len(), 5);
                assert_eq!(row_count, 20);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_csv_quoted_fields() {
        let records = parse_csv_records("name,quote\nada,\"said \"\"hi\"\", then left\"\n");
        assert_eq!(records[1][1], "said \"hi\", then left");
    }

    #[test]
    fn test_csv_quoted_newline() {
        let records = parse_csv_records("a,b\n\"line1\nline2\",x\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][0], "line1\nline2");
    }

    #[test]
    fn test_csv_ragged_rows_widen_column_count() {
        match extract_csv("a,b\n1,2,3\n", &Budgets::default()) {
            ExtractedContent::Sheet { column_count, .. } => assert_eq!(column_count, 3),
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((1, 1)));
        assert_eq!(parse_cell_ref("B3"), Some((3, 2)));
        assert_eq!(parse_cell_ref("Z10"), Some((10, 26)));
        assert_eq!(parse_cell_ref("AA2"), Some((2, 27)));
        assert_eq!(parse_cell_ref("AB100"), Some((100, 28)));
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("ABC"), None);
    }

    const SHARED_STRINGS: &str = r#"<?xml version="1.0"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
  <si><t>name</t></si>
  <si><t>score</t></si>
  <si><r><t>ada </t></r><r><t>lovelace</t></r></si>
</sst>"#;

    const WORKSHEET: &str = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="s"><v>0</v></c>
      <c r="B1" t="s"><v>1</v></c>
    </row>
    <row r="2">
      <c r="A2" t="s"><v>2</v></c>
      <c r="B2"><v>99</v></c>
    </row>
    <row r="3">
      <c r="B3"><v>42</v></c>
    </row>
  </sheetData>
</worksheet>"#;

    #[test]
    fn test_xlsx_shared_strings_and_coords() {
        let archive = build_zip(&[
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", WORKSHEET),
        ]);

        match extract_sheet(&archive, &Budgets::default()) {
            ExtractedContent::Sheet {
                headers,
                first_rows,
                row_count,
                column_count,
            } => {
                assert_eq!(headers, vec!["name", "score"]);
                // Rich-text shared string concatenates its runs.
                assert_eq!(first_rows[0], vec!["ada lovelace", "99"]);
                assert_eq!(first_rows[1], vec!["42"]);
                assert_eq!(row_count, 3);
                assert_eq!(column_count, 2);
            }
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_xlsx_without_worksheets_is_empty() {
        let archive = build_zip(&[("xl/sharedStrings.xml", SHARED_STRINGS)]);
        assert_eq!(
            extract_sheet(&archive, &Budgets::default()),
            ExtractedContent::Empty
        );
    }
}
