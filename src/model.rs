use crate::capture::Snapshot;
use crate::config::ExtractorConfig;
use crate::filter::parse_normalized;
use crate::parsers::Parser;
use crate::protocol::{InputLink, InputResource};
use crate::results::ScrapeData;

/// Builds the `Ingest` payload for a scraped page.
///
/// The resource is identified by its URL without query or fragment, using
/// the same normalization the link scanner compares against.
pub fn to_input_resource(scrape: &ScrapeData, links: Vec<InputLink>) -> InputResource {
    let url = match parse_normalized(&scrape.url) {
        Ok(url) => url.to_string(),
        Err(e) => {
            ::log::warn!("Keeping unparsable resource url {}: {}", scrape.url, e);
            scrape.url.clone()
        }
    };

    InputResource {
        url,
        cid: None,
        icon: scrape.icon.clone(),
        image: scrape.image().map(str::to_string),
        title: scrape.title.clone(),
        description: scrape.description.clone(),
        links: Some(links),
        tags: Some(Vec::new()),
    }
}

/// Parses a snapshot, extracts its summary and links, and builds the resource
pub fn read(
    snapshot: &Snapshot,
    config: &ExtractorConfig,
) -> Result<InputResource, url::ParseError> {
    let result = Parser::parse_snapshot(snapshot, config)?;
    Ok(to_input_resource(&result.scrape, result.links))
}
