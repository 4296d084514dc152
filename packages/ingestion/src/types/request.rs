//! Request envelope and validation.

use serde::Deserialize;

use crate::error::{ApiError, Result};

/// Maximum accepted URL length.
pub const MAX_URL_CHARS: usize = 2048;

/// Maximum accepted file name length.
pub const MAX_FILE_NAME_CHARS: usize = 255;

/// Raw request body: URL mode or file mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub url: Option<String>,
    pub file_url: Option<String>,
    pub file_type: Option<String>,
    pub file_name: Option<String>,
}

/// A validated request, resolved to one of the two input shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeInput {
    Url(String),
    File {
        url: String,
        mime: String,
        name: String,
    },
}

impl AnalyzeRequest {
    /// URL-mode request.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// File-mode request.
    pub fn for_file(
        file_url: impl Into<String>,
        file_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            url: None,
            file_url: Some(file_url.into()),
            file_type: Some(file_type.into()),
            file_name: Some(file_name.into()),
        }
    }

    /// Validate field presence and sizes, resolving the request to one of
    /// the two input modes. Violations are collected into the `details`
    /// array so the caller sees every offending field at once.
    pub fn validate(&self) -> Result<AnalyzeInput> {
        if let Some(url) = &self.url {
            let mut bad_fields: Vec<&str> = Vec::new();
            if url.trim().is_empty() || url.chars().count() > MAX_URL_CHARS {
                bad_fields.push("url");
            }
            if !bad_fields.is_empty() {
                return Err(ApiError::invalid_input("invalid request fields", &bad_fields));
            }
            return Ok(AnalyzeInput::Url(url.clone()));
        }

        if self.file_url.is_some() || self.file_type.is_some() || self.file_name.is_some() {
            let mut bad_fields: Vec<&str> = Vec::new();

            match &self.file_url {
                Some(u) if !u.trim().is_empty() && u.chars().count() <= MAX_URL_CHARS => {}
                _ => bad_fields.push("fileUrl"),
            }
            match &self.file_type {
                Some(t) if !t.trim().is_empty() => {}
                _ => bad_fields.push("fileType"),
            }
            match &self.file_name {
                Some(n) if !n.trim().is_empty() && n.chars().count() <= MAX_FILE_NAME_CHARS => {}
                _ => bad_fields.push("fileName"),
            }

            if !bad_fields.is_empty() {
                return Err(ApiError::invalid_input(
                    "missing or invalid request fields",
                    &bad_fields,
                ));
            }

            return Ok(AnalyzeInput::File {
                url: self.file_url.clone().unwrap(),
                mime: self.file_type.clone().unwrap(),
                name: self.file_name.clone().unwrap(),
            });
        }

        Err(ApiError::invalid_input(
            "request must contain either url or fileUrl/fileType/fileName",
            &["url"],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_mode() {
        let input = AnalyzeRequest::for_url("https://example.com").validate().unwrap();
        assert_eq!(input, AnalyzeInput::Url("https://example.com".into()));
    }

    #[test]
    fn test_file_mode() {
        let input = AnalyzeRequest::for_file("https://files.example.com/a.pdf", "application/pdf", "a.pdf")
            .validate()
            .unwrap();
        assert!(matches!(input, AnalyzeInput::File { .. }));
    }

    #[test]
    fn test_missing_file_name_names_the_field() {
        let request = AnalyzeRequest {
            url: None,
            file_url: Some("https://files.example.com/a.pdf".into()),
            file_type: Some("application/pdf".into()),
            file_name: None,
        };

        let err = request.validate().unwrap_err();
        assert_eq!(err.status(), 400);
        let details = err.details.unwrap();
        assert_eq!(details.as_array().unwrap().len(), 1);
        assert_eq!(details[0], "fileName");
    }

    #[test]
    fn test_multiple_violations_all_reported() {
        let request = AnalyzeRequest {
            url: None,
            file_url: Some(String::new()),
            file_type: None,
            file_name: Some("x".repeat(300)),
        };

        let err = request.validate().unwrap_err();
        let details = err.details.unwrap();
        let fields: Vec<&str> = details
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(fields, vec!["fileUrl", "fileType", "fileName"]);
    }

    #[test]
    fn test_oversized_url_rejected() {
        let request = AnalyzeRequest::for_url(format!("https://example.com/{}", "x".repeat(2100)));
        let err = request.validate().unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_empty_body_rejected() {
        let err = AnalyzeRequest::default().validate().unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_camel_case_deserialization() {
        let request: AnalyzeRequest = serde_json::from_value(serde_json::json!({
            "fileUrl": "https://files.example.com/x.csv",
            "fileType": "text/csv",
            "fileName": "x.csv",
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
