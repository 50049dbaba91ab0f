//! Content scoring heuristics.
//!
//! An imperfect estimate of how "content-y" a piece of text is, meant to be
//! combined with the class-name and link-density checks below.

use crate::parsers::dom::{class_name, text_len, text_of};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Texts of this many characters or fewer never count as content
pub const MIN_CONTENT_LENGTH: usize = 25;

/// Default score a paragraph must exceed to be used as a description
pub const DEFAULT_THRESHOLD: u32 = 3;

static UNLIKELY_CONTENT_CLASSNAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)date|social|community|remark|discuss|disqus|e-?mail|rss|print|extra|share|login|sign|reply|combx|comment|com-|contact|header|menu|foot|footer|footnote|masthead|media|meta|outbrain|promo|related|scroll|shoutbox|sidebar|sponsor|shopping|tags|tool|widget|ad-break|agegate|pagination|pager|popup|tweet|twitter",
    )
    .expect("valid regex")
});

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("valid selector"));

/// Scores the content-y-ness of a string.
///
/// One point to start, one per comma-separated segment, and one per hundred
/// characters up to three.
pub fn score(text: &str) -> u32 {
    let length = text.chars().count();
    if length <= MIN_CONTENT_LENGTH {
        return 0;
    }

    let segments = text.split(',').count() as u32;
    let bulk = (length / 100).min(3) as u32;

    1 + segments + bulk
}

/// Score of an element's trimmed text
pub fn score_element(element: ElementRef<'_>) -> u32 {
    score(&text_of(element))
}

pub fn is_sufficiently_contenty(element: ElementRef<'_>, threshold: u32) -> bool {
    score_element(element) > threshold
}

/// Whether the class attribute marks the element as boilerplate
pub fn is_unlikely_candidate(element: ElementRef<'_>) -> bool {
    UNLIKELY_CONTENT_CLASSNAMES.is_match(class_name(element))
}

/// Whether the element has enough text to be content
pub fn is_sufficiently_long(element: ElementRef<'_>) -> bool {
    text_len(element) > MIN_CONTENT_LENGTH
}

/// Share of the element's text that sits inside anchors
pub fn link_density(element: ElementRef<'_>) -> f64 {
    let link_size: usize = element.select(&ANCHOR_SELECTOR).map(text_len).sum();
    let text_size = text_len(element);
    if text_size == 0 {
        return 0.0;
    }
    link_size as f64 / text_size as f64
}

pub fn is_high_link_density(element: ElementRef<'_>) -> bool {
    link_density(element) > 0.5
}

/// Whether a paragraph is good enough to describe the page
pub fn is_qualified_description(element: ElementRef<'_>, threshold: u32) -> bool {
    !is_unlikely_candidate(element)
        && is_sufficiently_long(element)
        && !is_high_link_density(element)
        && is_sufficiently_contenty(element, threshold)
}
