//! Extraction run parameters.

use serde::{Deserialize, Serialize};
use vald_core::Watermark;

/// Hard ceiling on pages fetched by one paginated run.
pub const DEFAULT_MAX_PAGES: usize = 1000;

fn default_modified_from() -> String {
    String::from("2023-01-01T00:00:00.000Z")
}

const fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// Starting watermark for every paginated run (ISO-8601 UTC).
    #[serde(default = "default_modified_from")]
    pub modified_from: String,

    /// Only categories with exactly this name are kept. Empty keeps all.
    #[serde(default)]
    pub category: String,

    /// Restrict test extraction to one profile. Empty means all profiles.
    #[serde(default)]
    pub profile_id: String,

    /// Page ceiling per paginated run.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            modified_from: default_modified_from(),
            category: String::new(),
            profile_id: String::new(),
            max_pages: default_max_pages(),
        }
    }
}

impl ExtractConfig {
    #[must_use]
    pub fn watermark(&self) -> Watermark {
        Watermark::new(self.modified_from.clone())
    }

    #[must_use]
    pub fn category_filter(&self) -> Option<&str> {
        Some(self.category.trim()).filter(|c| !c.is_empty())
    }

    #[must_use]
    pub fn profile_filter(&self) -> Option<&str> {
        Some(self.profile_id.trim()).filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ExtractConfig::default();
        assert_eq!(config.watermark().as_str(), "2023-01-01T00:00:00.000Z");
        assert_eq!(config.max_pages, 1000);
        assert!(config.category_filter().is_none());
        assert!(config.profile_filter().is_none());
    }

    #[test]
    fn blank_filters_are_ignored() {
        let config = ExtractConfig {
            category: "  ".into(),
            profile_id: "P1".into(),
            ..Default::default()
        };
        assert!(config.category_filter().is_none());
        assert_eq!(config.profile_filter(), Some("P1"));
    }
}
