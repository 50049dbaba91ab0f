use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Elements that flow inline with text. Anything else bounds a context window.
pub const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "bdi", "bdo", "big", "br", "cite", "code", "data", "del", "dfn",
    "em", "font", "i", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike",
    "strong", "sub", "sup", "time", "tt", "u", "var",
];

static BASE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("base[href]").expect("valid selector"));

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

/// How a node takes part in a walk over inline content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Text,
    Inline,
    /// Comments, doctypes and processing instructions: no text, no boundary
    Skip,
    Block,
}

/// Classifies a node for inline walks
pub fn flow_of(node: NodeRef<'_, Node>) -> Flow {
    match node.value() {
        Node::Text(_) => Flow::Text,
        Node::Element(element) if is_inline_tag(element.name()) => Flow::Inline,
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => Flow::Skip,
        _ => Flow::Block,
    }
}

pub fn is_inline_tag(name: &str) -> bool {
    INLINE_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

/// Concatenated text of every descendant text node (`textContent`)
pub fn text_content(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if let Node::Text(text) = descendant.value() {
            out.push_str(text);
        }
    }
    out
}

/// Trimmed text content of an element
pub fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Character length of the trimmed text content of an element
pub fn text_len(element: ElementRef<'_>) -> usize {
    text_of(element).chars().count()
}

/// The `class` attribute, or an empty string
pub fn class_name<'a>(element: ElementRef<'a>) -> &'a str {
    element.value().attr("class").unwrap_or("")
}

/// Resolves `href` against `base`, the way a browser resolves `element.href`
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// The URL relative references on the page resolve against: a `<base href>`
/// when the page declares one, otherwise the page URL itself.
pub fn document_base(document: &Html, page_url: &Url) -> Url {
    document
        .select(&BASE_SELECTOR)
        .next()
        .and_then(|base| base.value().attr("href"))
        .and_then(|href| resolve(page_url, href))
        .unwrap_or_else(|| page_url.clone())
}

/// The `<body>` element, falling back to the document root
pub fn body(document: &Html) -> ElementRef<'_> {
    document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element())
}
