//! Web page metadata assembled from layered sources.

/// Metadata for a web page, merged from Open Graph, Twitter Card, JSON-LD,
/// and plain HTML `<meta>` layers with fixed priority.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub site_name: Option<String>,
    /// Page type as declared by the page (e.g. `article`, `video.other`)
    pub page_type: Option<String>,
    pub published_time: Option<String>,
    pub modified_time: Option<String>,
    pub tags: Vec<String>,
}

impl WebMetadata {
    /// Merge layers in priority order: the first non-empty value per field
    /// wins. `layers` must be ordered highest-priority first.
    pub fn merge(layers: Vec<WebMetadata>) -> WebMetadata {
        let mut merged = WebMetadata::default();
        for layer in layers {
            merged.title = merged.title.or(non_empty(layer.title));
            merged.description = merged.description.or(non_empty(layer.description));
            merged.image = merged.image.or(non_empty(layer.image));
            merged.author = merged.author.or(non_empty(layer.author));
            merged.site_name = merged.site_name.or(non_empty(layer.site_name));
            merged.page_type = merged.page_type.or(non_empty(layer.page_type));
            merged.published_time = merged.published_time.or(non_empty(layer.published_time));
            merged.modified_time = merged.modified_time.or(non_empty(layer.modified_time));
            if merged.tags.is_empty() && !layer.tags.is_empty() {
                merged.tags = layer.tags;
            }
        }
        merged
    }

    /// Whether any field is populated.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.image.is_none()
            && self.author.is_none()
            && self.site_name.is_none()
            && self.page_type.is_none()
            && self.published_time.is_none()
            && self.modified_time.is_none()
            && self.tags.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_priority_first_wins() {
        let og = WebMetadata {
            title: Some("OG Title".into()),
            ..Default::default()
        };
        let twitter = WebMetadata {
            title: Some("Twitter Title".into()),
            description: Some("Twitter description".into()),
            ..Default::default()
        };

        let merged = WebMetadata::merge(vec![og, twitter]);
        assert_eq!(merged.title.as_deref(), Some("OG Title"));
        assert_eq!(merged.description.as_deref(), Some("Twitter description"));
    }

    #[test]
    fn test_merge_skips_blank_values() {
        let og = WebMetadata {
            title: Some("   ".into()),
            ..Default::default()
        };
        let meta = WebMetadata {
            title: Some("Real Title".into()),
            ..Default::default()
        };

        let merged = WebMetadata::merge(vec![og, meta]);
        assert_eq!(merged.title.as_deref(), Some("Real Title"));
    }

    #[test]
    fn test_merge_tags_from_first_non_empty_layer() {
        let a = WebMetadata::default();
        let b = WebMetadata {
            tags: vec!["rust".into()],
            ..Default::default()
        };
        let c = WebMetadata {
            tags: vec!["ignored".into()],
            ..Default::default()
        };

        let merged = WebMetadata::merge(vec![a, b, c]);
        assert_eq!(merged.tags, vec!["rust"]);
    }
}
