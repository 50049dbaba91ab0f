//! Pulls a structured summary out of a page.
//!
//! Every field is resolved from an ordered list of candidate sources: social
//! and microformat metadata first, then in-page heuristics, then a fallback.
//! The first non-empty candidate wins. Within a single source candidates come
//! in document order.
//!
//! Sources used:
//! - `<title>` and headings
//! - `meta name=description`, `application-name`
//! - Twitter card tags (<https://dev.twitter.com/cards/markup>)
//! - Open Graph tags (<https://ogp.me/>)
//! - hentry microformats
//! - `link rel=icon` and friends

use crate::config::ExtractorConfig;
use crate::parsers::Document;
use crate::parsers::dom::{resolve, text_of};
use crate::parsers::score::is_qualified_description;
use crate::parsers::text::count_words;
use crate::results::ScrapeData;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

macro_rules! selector {
    ($css:expr) => {
        LazyLock::new(|| Selector::parse($css).expect("valid selector"))
    };
}

static OG_TITLE: LazyLock<Selector> =
    selector!(r#"meta[property="og:title"], meta[name="twitter:title"]"#);
static HENTRY_TITLE: LazyLock<Selector> = selector!(".entry-title, .h-entry .p-name");
static TITLE: LazyLock<Selector> = selector!("title");
static HEADINGS: LazyLock<Selector> = selector!("h1, h2, h3");

static TWITTER_DESCRIPTION: LazyLock<Selector> =
    selector!(r#"meta[name="twitter:description"]"#);
static OG_DESCRIPTION: LazyLock<Selector> = selector!(r#"meta[property="og:description"]"#);
static HENTRY_SUMMARY: LazyLock<Selector> = selector!(".entry-summary, .h-entry .p-summary");
static META_DESCRIPTION: LazyLock<Selector> = selector!(r#"meta[name="description"]"#);
static PARAGRAPHS: LazyLock<Selector> = selector!("p");

static APPLICATION_NAME: LazyLock<Selector> = selector!(r#"meta[name="application-name"]"#);
static OG_SITE_NAME: LazyLock<Selector> = selector!(r#"meta[property="og:site_name"]"#);
static TWITTER_SITE: LazyLock<Selector> = selector!(r#"meta[name="twitter:site"]"#);

static ICONS: LazyLock<Selector> = selector!(
    r#"link[rel="shortcut icon"],
       link[rel="apple-touch-icon"],
       link[rel="apple-touch-icon-precomposed"],
       link[rel="mask-icon"],
       link[rel="icon"]"#
);

static OG_IMAGES: LazyLock<Selector> =
    selector!(r#"meta[property="og:image"], meta[property="og:image:url"]"#);
static TWITTER_IMAGES: LazyLock<Selector> = selector!(
    r#"meta[name="twitter:image"],
       meta[name="twitter:image:src"],
       meta[name="twitter:image0"],
       meta[name="twitter:image1"],
       meta[name="twitter:image2"],
       meta[name="twitter:image3"]"#
);
static IMAGES: LazyLock<Selector> = selector!("img");

static TITLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[|\-:]\s").expect("valid regex"));
static TITLE_LEFT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*)[|\-:] .*").expect("valid regex"));
static TITLE_RIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^|\-]*[|\-](.*)").expect("valid regex"));

/// Scrapes a summary of the page. Never fails; missing fields fall back to
/// empty values.
pub fn extract(document: &Document, config: &ExtractorConfig) -> ScrapeData {
    let data = ScrapeData {
        url: document.url().to_string(),
        icon: scrape_icon(document),
        hero: scrape_hero_images(document, config),
        title: scrape_title(document, "").trim().to_string(),
        description: scrape_description(document, "", config.description_threshold)
            .trim()
            .to_string(),
        name: scrape_site_name(document, "").trim().to_string(),
    };

    ::log::debug!(
        "Scraped {}: title={:?}, {} hero image(s), icon={}",
        data.url,
        data.title,
        data.hero.len(),
        data.icon.is_some()
    );

    data
}

/// Yields the decoded value of every element matching `selector`, in
/// document order, skipping elements that decode to nothing.
fn query<'a, F>(
    document: &'a Document,
    selector: &'a Selector,
    decode: F,
) -> impl Iterator<Item = String> + 'a
where
    F: Fn(ElementRef<'a>) -> Option<String> + 'a,
{
    document.html().select(selector).filter_map(decode)
}

fn first(mut candidates: impl Iterator<Item = String>, fallback: &str) -> String {
    candidates
        .next()
        .unwrap_or_else(|| fallback.to_string())
}

/// Trimmed `content` of a meta element; empty content counts as absent
fn get_content(element: ElementRef<'_>) -> Option<String> {
    if element.value().name() != "meta" {
        return None;
    }
    element
        .value()
        .attr("content")
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

fn get_text(element: ElementRef<'_>) -> Option<String> {
    Some(text_of(element)).filter(|text| !text.is_empty())
}

fn get_clean_text(element: ElementRef<'_>) -> Option<String> {
    get_text(element).map(|text| clean_title(&text))
}

/// Removes separator garbage such as a trailing site name from a title.
///
/// Keeps the text before the last separator; when that leaves fewer than
/// three words, keeps the text after the first separator instead; when that
/// still leaves fewer than five words, keeps the original text.
pub fn clean_title(text: &str) -> String {
    let mut title = text.to_string();
    if TITLE_SEPARATOR.is_match(text) {
        title = TITLE_LEFT.replace_all(text, "${1}").into_owned();

        if count_words(&title) < 3 {
            title = TITLE_RIGHT.replace_all(text, "${1}").into_owned();
        }

        if count_words(&title) < 5 {
            title = text.to_string();
        }
    }

    title.trim().to_string()
}

/// Find a good title within the page.
pub fn scrape_title(document: &Document, fallback: &str) -> String {
    let candidates = query(document, &OG_TITLE, get_content)
        // Just grab the first entry title, even on a listing page: it is the
        // first thing a reader sees.
        .chain(query(document, &HENTRY_TITLE, get_text))
        .chain(query(document, &TITLE, get_clean_text))
        .chain(query(document, &HEADINGS, get_text));

    first(candidates, fallback)
}

/// Find a good description for the page.
pub fn scrape_description(document: &Document, fallback: &str, threshold: u32) -> String {
    // Social descriptions are curated for readers, not search bots, so they
    // beat `meta[name=description]`.
    let candidates = query(document, &TWITTER_DESCRIPTION, get_content)
        .chain(query(document, &OG_DESCRIPTION, get_content))
        .chain(query(document, &HENTRY_SUMMARY, get_text))
        .chain(query(document, &META_DESCRIPTION, get_content))
        .chain(query(document, &PARAGRAPHS, move |p| {
            if is_qualified_description(p, threshold) {
                get_text(p)
            } else {
                None
            }
        }));

    first(candidates, fallback)
}

/// Name of the site. Callers usually want the host as fallback.
pub fn scrape_site_name(document: &Document, fallback: &str) -> String {
    let candidates = query(document, &APPLICATION_NAME, get_content)
        .chain(query(document, &OG_SITE_NAME, get_content))
        // This one is an `@handle`.
        .chain(query(document, &TWITTER_SITE, get_content));

    first(candidates, fallback)
}

/// Absolute URL of the first declared icon
pub fn scrape_icon(document: &Document) -> Option<String> {
    query(document, &ICONS, |link| {
        let href = link.value().attr("href")?;
        resolve(document.base(), href).map(|url| url.to_string())
    })
    .next()
}

/// Up to `config.hero_limit` featured images.
///
/// Open Graph and Twitter tags are hand-curated so they come first; the
/// in-page images large enough to lead the page come last.
pub fn scrape_hero_images(document: &Document, config: &ExtractorConfig) -> Vec<String> {
    let in_page = query(document, &IMAGES, |img| {
        let src = img.value().attr("src")?;
        let url = resolve(document.base(), src)?;
        let (width, height) = document.image_size(&url, img)?;
        if width > config.hero_min_width && height > config.hero_min_height {
            Some(url.to_string())
        } else {
            None
        }
    });

    query(document, &OG_IMAGES, get_content)
        .chain(query(document, &TWITTER_IMAGES, get_content))
        .chain(in_page)
        .filter(|url| !url.is_empty())
        .take(config.hero_limit)
        .collect()
}
