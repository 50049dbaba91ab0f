//! Annotation selectors, as stored with highlights.
//!
//! A selector locates a piece of text in a page. Offsets are in characters
//! of the page body's text content. A selector that no longer matches the
//! page is reported as an error value so the caller can fall back to
//! something less precise.

use crate::error::SelectorError;
use crate::parsers::dom::{body, text_content};
use crate::parsers::text::char_len;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Selector {
    #[serde(rename = "CssSelector")]
    Css {
        value: String,
        #[serde(rename = "refinedBy", default, skip_serializing_if = "Option::is_none")]
        refined_by: Option<Box<Selector>>,
    },
    #[serde(rename = "TextQuoteSelector")]
    TextQuote {
        exact: String,
        #[serde(default)]
        prefix: String,
        #[serde(default)]
        suffix: String,
    },
    #[serde(rename = "TextPositionSelector")]
    TextPosition { start: usize, end: usize },
}

/// A resolved piece of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRange {
    /// Character offset of the first character
    pub start: usize,
    /// Character offset past the last character
    pub end: usize,
    pub text: String,
}

/// Where a selector is evaluated: a subtree and its text
struct Scope<'a> {
    element: ElementRef<'a>,
    text: String,
    offset: usize,
}

/// Resolves `selector` against the body of `document`
pub fn resolve(selector: &Selector, document: &Html) -> Result<TextRange, SelectorError> {
    let root = body(document);
    let scope = Scope {
        element: root,
        text: text_content(*root),
        offset: 0,
    };
    resolve_in(selector, &scope)
}

fn resolve_in(selector: &Selector, scope: &Scope<'_>) -> Result<TextRange, SelectorError> {
    match selector {
        Selector::Css { value, refined_by } => {
            let css = scraper::Selector::parse(value)
                .map_err(|_| SelectorError::Malformed(value.clone()))?;
            let element = scope
                .element
                .select(&css)
                .next()
                .ok_or(SelectorError::NotFound)?;

            let inner = Scope {
                element,
                text: text_content(*element),
                offset: scope.offset + text_before(*scope.element, *element),
            };

            match refined_by {
                Some(refinement) => resolve_in(refinement, &inner),
                None => Ok(TextRange {
                    start: inner.offset,
                    end: inner.offset + char_len(&inner.text),
                    text: inner.text,
                }),
            }
        }
        Selector::TextQuote {
            exact,
            prefix,
            suffix,
        } => {
            if exact.is_empty() {
                return Err(SelectorError::Malformed("empty quote".to_string()));
            }
            let start = find_quote(&scope.text, exact, prefix, suffix)
                .ok_or(SelectorError::NotFound)?;
            let start = char_len(&scope.text[..start]);
            Ok(TextRange {
                start: scope.offset + start,
                end: scope.offset + start + char_len(exact),
                text: exact.clone(),
            })
        }
        Selector::TextPosition { start, end } => {
            let length = char_len(&scope.text);
            if start > end || *end > length {
                return Err(SelectorError::OutOfRange {
                    start: *start,
                    end: *end,
                    length,
                });
            }
            let text = scope.text.chars().skip(*start).take(end - start).collect();
            Ok(TextRange {
                start: scope.offset + start,
                end: scope.offset + end,
                text,
            })
        }
    }
}

/// Byte offset of the first occurrence of `exact` preceded by `prefix` and
/// followed by `suffix`
fn find_quote(text: &str, exact: &str, prefix: &str, suffix: &str) -> Option<usize> {
    text.match_indices(exact)
        .map(|(index, _)| index)
        .find(|&index| {
            text[..index].ends_with(prefix) && text[index + exact.len()..].starts_with(suffix)
        })
}

/// Characters of text that come before `target` inside `root`
fn text_before(root: NodeRef<'_, Node>, target: NodeRef<'_, Node>) -> usize {
    let mut count = 0;
    for node in root.descendants() {
        if node.id() == target.id() {
            break;
        }
        if let Node::Text(text) = node.value() {
            count += text.chars().count();
        }
    }
    count
}
