use serde::{Deserialize, Serialize};

/// Structured summary scraped from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeData {
    /// URL of the page, as captured
    pub url: String,

    /// Site icon (absolute URL), if the page declares one
    pub icon: Option<String>,

    /// Up to four representative images, curated metadata first
    pub hero: Vec<String>,

    /// Title of the page
    pub title: String,

    /// Short description of the page
    pub description: String,

    /// Name of the site the page belongs to
    pub name: String,
}

impl ScrapeData {
    /// The lead hero image, if any
    pub fn image(&self) -> Option<&str> {
        self.hero.first().map(String::as_str)
    }
}
