pub mod agent;
pub mod capture;
pub mod client;
pub mod config;
pub mod error;
pub mod feedback;
pub mod filter;
pub mod graph;
pub mod mailbox;
pub mod model;
pub mod parsers;
pub mod program;
pub mod protocol;
pub mod results;
pub mod selector;
pub mod siblinks;
pub mod similar;

// Re-export commonly used types for convenience
pub use capture::{Snapshot, Source};
pub use config::{CaptureConfig, ExtractorConfig};
pub use error::{CaptureError, ClientError};
pub use protocol::{InputLink, InputResource};
pub use results::ScrapeData;

use parsers::Parser;
use std::path::Path;
use std::time::Duration;

/// Everything read from one page
#[derive(Debug, Clone)]
pub struct Page {
    pub scrape: ScrapeData,
    pub resource: InputResource,
}

impl Page {
    pub fn links(&self) -> &[InputLink] {
        self.resource.links.as_deref().unwrap_or_default()
    }
}

/// Builder for capturing and reading a page from a [`Source`]
pub struct Capture {
    source: Source,
    config: CaptureConfig,
}

impl Capture {
    /// Create a new Capture builder for the given source
    pub fn new(source: Source) -> Self {
        Self {
            source,
            config: CaptureConfig::default(),
        }
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CaptureConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load configuration from a JSON string
    pub fn with_config_str(self, json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = CaptureConfig::from_json(json)?;
        Ok(self.with_config(config))
    }

    /// Override the WebDriver server used for web sources
    pub fn with_webdriver(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    /// Set the capture timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.capture_timeout_secs = timeout_seconds;
        self
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Obtain the DOM snapshot of the source
    pub async fn snapshot(&self) -> Result<Snapshot, CaptureError> {
        match &self.source {
            Source::Web(url) => {
                capture::browser::capture(
                    url,
                    &self.config.webdriver_url,
                    Duration::from_secs(self.config.capture_timeout_secs),
                )
                .await
            }
            Source::File { path, url } => capture::file::load(path, url).await,
            Source::Html { html, url } => Ok(Snapshot::new(url.as_str(), html.as_str())),
        }
    }

    /// Capture the source and extract its summary and links
    pub async fn read(&self) -> Result<Page, CaptureError> {
        let snapshot = self.snapshot().await?;
        let result = Parser::parse_snapshot(&snapshot, &self.config.extractor)?;
        let resource = model::to_input_resource(&result.scrape, result.links);

        ::log::info!(
            "Read {}: \"{}\" with {} link(s)",
            resource.url,
            result.scrape.title,
            resource.links.as_ref().map_or(0, Vec::len)
        );

        Ok(Page {
            scrape: result.scrape,
            resource,
        })
    }
}
