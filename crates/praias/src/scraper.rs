use crate::config::ExtractorConfig;
use crate::parser::extract;
use crate::types::{Extraction, RawDocument};

use reqwest::Client;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    url: String,
    config: ExtractorConfig,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_url(crate::DEFAULT_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, ScraperError> {
        // Wikipedia turns away requests without a browser-like agent.
        let client = Client::builder()
            .user_agent(format!(
                "Mozilla/5.0 (compatible; {}/{})",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            config: ExtractorConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// One GET, no retries. A non-2xx answer is not an error here: it comes
    /// back as a failed [`RawDocument`] so the extractor can collapse it.
    pub async fn fetch(&self, url: &str) -> Result<RawDocument, ScraperError> {
        log::info!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("{} answered with status {}", url, status);
            return Ok(RawDocument::failed(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?;

        Ok(RawDocument::new(status.as_u16(), body))
    }

    /// Fetches the configured page and extracts it. Never fails: transport
    /// errors and bad statuses both come back as [`Extraction::failure`].
    pub async fn fetch_catalog(&self) -> Extraction {
        match self.fetch(&self.url).await {
            Ok(document) => extract(&document, &self.config),
            Err(e) => {
                log::error!("Failed to fetch {}: {}", self.url, e);
                Extraction::failure()
            }
        }
    }
}
