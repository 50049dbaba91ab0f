pub mod context;
pub mod dom;
pub mod links;
pub mod metadata;
pub mod score;
pub mod text;

#[cfg(test)]
mod tests;

use crate::capture::{ImageSizes, Snapshot};
use crate::config::ExtractorConfig;
use crate::protocol::InputLink;
use crate::results::ScrapeData;
use scraper::{ElementRef, Html};
use url::Url;

/// A parsed page: the DOM plus what the browser knew about it
pub struct Document {
    html: Html,
    url: Url,
    base: Url,
    image_sizes: ImageSizes,
}

impl Document {
    /// Parse a captured snapshot
    pub fn parse(snapshot: &Snapshot) -> Result<Self, url::ParseError> {
        let url = Url::parse(&snapshot.url)?;
        let html = Html::parse_document(&snapshot.html);
        let base = dom::document_base(&html, &url);

        Ok(Self {
            html,
            url,
            base,
            image_sizes: snapshot.image_sizes.clone(),
        })
    }

    /// Parse raw HTML served from `url`, without live image sizes
    pub fn from_html(html: &str, url: &str) -> Result<Self, url::ParseError> {
        Self::parse(&Snapshot::new(url, html))
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// URL of the page as captured
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL relative references resolve against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Natural size of an image.
    ///
    /// Sizes measured in the live page win; otherwise the `width` and
    /// `height` attributes are used.
    pub fn image_size(&self, src: &Url, img: ElementRef<'_>) -> Option<(u32, u32)> {
        if let Some(size) = self.image_sizes.get(src.as_str()) {
            return Some(size);
        }
        let width = parse_dimension(img.value().attr("width")?)?;
        let height = parse_dimension(img.value().attr("height")?)?;
        Some((width, height))
    }
}

fn parse_dimension(value: &str) -> Option<u32> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

/// What one read of a page produces
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub scrape: ScrapeData,
    pub links: Vec<InputLink>,
}

/// Runs the metadata extractor and the link scanner over a page
pub struct Parser;

impl Parser {
    /// Extract the summary and the outbound links of a parsed page
    pub fn parse(document: &Document, config: &ExtractorConfig) -> ParseResult {
        let scrape = metadata::extract(document, config);
        let links = links::scan(document, config);
        ParseResult { scrape, links }
    }

    /// Parse a snapshot and extract from it
    pub fn parse_snapshot(
        snapshot: &Snapshot,
        config: &ExtractorConfig,
    ) -> Result<ParseResult, url::ParseError> {
        let document = Document::parse(snapshot)?;
        Ok(Self::parse(&document, config))
    }
}
