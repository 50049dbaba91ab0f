use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How the textual context around a link is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Walk inline siblings around the anchor, stopping at block boundaries
    #[default]
    Inline,
    /// Grow by whole sentences until the summary falls within `min..max` characters
    Sentences { min: usize, max: usize },
}

/// Tunables for metadata extraction and link scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Images must be strictly wider than this to count as hero images
    #[serde(default = "default_hero_min_width")]
    pub hero_min_width: u32,

    /// Images must be strictly taller than this to count as hero images
    #[serde(default = "default_hero_min_height")]
    pub hero_min_height: u32,

    /// Maximum number of hero images kept
    #[serde(default = "default_hero_limit")]
    pub hero_limit: usize,

    /// Paragraphs must score above this to be used as a description
    #[serde(default = "default_description_threshold")]
    pub description_threshold: u32,

    /// URL schemes (without the trailing colon) whose links are never emitted
    #[serde(default = "default_ignored_protocols")]
    pub ignored_protocols: Vec<String>,

    /// Context extraction policy
    #[serde(default)]
    pub context: ContextPolicy,
}

/// Configuration for capturing, reading and ingesting pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// GraphQL endpoint of the knowledge server
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound on a single page capture, in seconds
    #[serde(default = "default_capture_timeout")]
    pub capture_timeout_secs: u64,

    /// Upper bound on a single knowledge-server request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_hero_min_width() -> u32 {
    480
}

fn default_hero_min_height() -> u32 {
    300
}

fn default_hero_limit() -> usize {
    4
}

fn default_description_threshold() -> u32 {
    3
}

/// Default ignored schemes: script, inline payloads and browser/extension internals
fn default_ignored_protocols() -> Vec<String> {
    [
        "javascript",
        "data",
        "blob",
        "about",
        "chrome",
        "chrome-extension",
        "moz-extension",
        "safari-web-extension",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_endpoint() -> String {
    crate::client::DEFAULT_ENDPOINT.to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_capture_timeout() -> u64 {
    45
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            hero_min_width: default_hero_min_width(),
            hero_min_height: default_hero_min_height(),
            hero_limit: default_hero_limit(),
            description_threshold: default_description_threshold(),
            ignored_protocols: default_ignored_protocols(),
            context: ContextPolicy::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            webdriver_url: default_webdriver_url(),
            capture_timeout_secs: default_capture_timeout(),
            request_timeout_secs: default_request_timeout(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply `WEBDRIVER_URL` and `UNFURL_ENDPOINT` overrides when set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                ::log::debug!("Using WebDriver from environment: {}", webdriver_url);
                self.webdriver_url = webdriver_url;
            }
        }
        if let Ok(endpoint) = std::env::var("UNFURL_ENDPOINT") {
            if !endpoint.is_empty() {
                ::log::debug!("Using knowledge server from environment: {}", endpoint);
                self.endpoint = endpoint;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CaptureConfig::from_json("{}").unwrap();
        assert_eq!(config.endpoint, "http://localhost:8080/graphql");
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert_eq!(config.capture_timeout_secs, 45);
        assert_eq!(config.extractor.hero_limit, 4);
        assert_eq!(config.extractor.hero_min_width, 480);
        assert_eq!(config.extractor.hero_min_height, 300);
        assert_eq!(config.extractor.context, ContextPolicy::Inline);
    }

    #[test]
    fn test_partial_extractor_config() {
        let json = r#"{
            "endpoint": "http://127.0.0.1:9000/graphql",
            "extractor": {
                "hero_limit": 2,
                "context": { "policy": "sentences", "min": 40, "max": 80 }
            }
        }"#;
        let config = CaptureConfig::from_json(json).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/graphql");
        assert_eq!(config.extractor.hero_limit, 2);
        assert_eq!(config.extractor.description_threshold, 3);
        assert_eq!(
            config.extractor.context,
            ContextPolicy::Sentences { min: 40, max: 80 }
        );
    }

    #[test]
    fn test_default_ignored_protocols() {
        let config = ExtractorConfig::default();
        for scheme in ["javascript", "data", "blob", "about", "chrome-extension"] {
            assert!(config.ignored_protocols.iter().any(|p| p == scheme));
        }
        assert!(!config.ignored_protocols.iter().any(|p| p == "https"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            CaptureConfig::from_json("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
