use std::collections::BTreeSet;

use scraper::Selector;

pub const DEFAULT_CONTENT_SELECTOR: &str = "div.mw-parser-output";
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 2000;

/// Section titles on pt.wikipedia (and their en.wikipedia counterparts) that
/// never name a municipality. "Índice" is the table of contents heading that
/// older skins render inside the article body.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "Referências",
    "Ver também",
    "Índice",
    "References",
    "See also",
    "Contents",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid content selector '{0}'")]
    InvalidSelector(String),
    #[error("Summary length must be greater than 0")]
    ZeroSummaryLength,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub content_selector: String,
    pub exclusions: BTreeSet<String>,
    pub summary_max_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            content_selector: DEFAULT_CONTENT_SELECTOR.to_string(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
            summary_max_chars: DEFAULT_SUMMARY_MAX_CHARS,
        }
    }
}

impl ExtractorConfig {
    /// Replaces the exclusion set entirely.
    pub fn with_exclusions<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra_exclusions<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions.extend(titles.into_iter().map(Into::into));
        self
    }

    pub fn with_content_selector(mut self, selector: impl Into<String>) -> Self {
        self.content_selector = selector.into();
        self
    }

    pub fn with_summary_max_chars(mut self, max_chars: usize) -> Self {
        self.summary_max_chars = max_chars;
        self
    }

    pub fn is_excluded(&self, title: &str) -> bool {
        self.exclusions.contains(title)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if Selector::parse(&self.content_selector).is_err() {
            return Err(ConfigError::InvalidSelector(self.content_selector));
        }
        if self.summary_max_chars == 0 {
            return Err(ConfigError::ZeroSummaryLength);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.content_selector, "div.mw-parser-output");
        assert_eq!(config.summary_max_chars, 2000);
        assert!(config.is_excluded("Referências"));
        assert!(config.is_excluded("Ver também"));
        assert!(config.is_excluded("See also"));
        assert!(config.is_excluded("Índice"));
        assert!(!config.is_excluded("Recife"));
    }

    #[test]
    fn test_exclusion_overrides() {
        let config = ExtractorConfig::default().with_extra_exclusions(["Notas"]);
        assert!(config.is_excluded("Notas"));
        assert!(config.is_excluded("Referências"));

        let config = config.with_exclusions(["Bibliografia"]);
        assert!(config.is_excluded("Bibliografia"));
        assert!(!config.is_excluded("Referências"));
    }

    #[test]
    fn test_validate_rejects_bad_selector() {
        let err = ExtractorConfig::default()
            .with_content_selector("div[")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSelector(_)));
    }

    #[test]
    fn test_validate_rejects_zero_summary_length() {
        let err = ExtractorConfig::default()
            .with_summary_max_chars(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroSummaryLength));
    }
}
