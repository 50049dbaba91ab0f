use crate::config::{ContextPolicy, ExtractorConfig};
use crate::filter::LinkFilter;
use crate::parsers::Document;
use crate::parsers::context::{inline_context, sentence_context};
use crate::parsers::dom::{body, resolve, text_of};
use crate::protocol::{InputLink, LinkKind};
use scraper::Selector;
use std::sync::LazyLock;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Scans the page for outbound links.
///
/// Hrefs are resolved the way the browser resolves them. Links to the page
/// itself (same origin and path, whatever the query or fragment) and links
/// using ignored protocols are dropped. The emitted target keeps its query
/// and fragment: a search results link does not land right without them.
pub fn scan(document: &Document, config: &ExtractorConfig) -> Vec<InputLink> {
    let filter = LinkFilter::new(document.url(), config);
    let mut links = Vec::new();

    for anchor in body(document.html()).select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let Some(target) = resolve(document.base(), href) else {
            ::log::trace!("Skipping unresolvable href: {}", href);
            continue;
        };

        if !filter.should_emit(&target) {
            continue;
        }

        let fragment = match config.context {
            ContextPolicy::Inline => inline_context(anchor, target.as_str()),
            ContextPolicy::Sentences { min, max } => sentence_context(anchor, min, max),
        };

        links.push(InputLink {
            target_url: target.to_string(),
            referrer_fragment: Some(fragment),
            referrer_location: None,
            kind: LinkKind::Inline,
            name: text_of(anchor),
            title: anchor.value().attr("title").unwrap_or("").to_string(),
            identifier: None,
        });
    }

    ::log::debug!(
        "Link scan of {} found {} link(s)",
        filter.page_url(),
        links.len()
    );
    if !links.is_empty() {
        ::log::trace!(
            "First few links: {:?}",
            links.iter().take(5).map(|l| &l.target_url).collect::<Vec<_>>()
        );
    }

    links
}
