use serde::{Deserialize, Serialize};

pub const FALLBACK_TITLE: &str = "Product";
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x200?text=Product";

/// A single catalog entry as rendered and persisted.
///
/// All three fields are always populated; the resolver substitutes fallbacks
/// instead of leaving a field empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub title: String,
    pub image: String,
    pub url: String,
}

impl ProductRecord {
    pub fn fallback(link: &str, placeholder_image: &str) -> Self {
        Self {
            title: FALLBACK_TITLE.to_owned(),
            image: placeholder_image.to_owned(),
            url: link.to_owned(),
        }
    }

    /// Fills a blank title or image with the fallback values.
    ///
    /// Returns `None` when `url` is blank; such a record cannot be rebuilt.
    pub fn repaired(mut self, placeholder_image: &str) -> Option<Self> {
        if self.url.trim().is_empty() {
            return None;
        }
        if self.title.trim().is_empty() {
            self.title = FALLBACK_TITLE.to_owned();
        }
        if self.image.trim().is_empty() {
            self.image = placeholder_image.to_owned();
        }
        Some(self)
    }

    pub fn title_contains(&self, needle_lowercase: &str) -> bool {
        needle_lowercase.is_empty() || self.title.to_lowercase().contains(needle_lowercase)
    }
}

/// Metadata as returned by the resolve endpoint. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ScrapedMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ScrapedMetadata {
    pub fn into_record(self, link: &str, placeholder_image: &str) -> ProductRecord {
        let title = non_blank(self.title).unwrap_or_else(|| FALLBACK_TITLE.to_owned());
        let image = non_blank(self.image).unwrap_or_else(|| placeholder_image.to_owned());
        ProductRecord {
            title,
            image,
            url: link.to_owned(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_owned())
}
