//! Textual context around a link.
//!
//! The inline policy renders the anchor as a Markdown link and grows it with
//! whatever inline content surrounds it, stopping at the first block-level
//! boundary on either side. The sentence policy is the older approach that
//! grows the anchor text sentence by sentence to fit a character budget.

use crate::parsers::dom::{Flow, flow_of, text_content};
use crate::parsers::text::{char_len, collapse_whitespace, limit_sentences};
use ego_tree::NodeRef;
use scraper::ElementRef;
use scraper::node::Node;
use std::collections::VecDeque;

/// Default budget of the sentence policy. Twitter card descriptions are
/// limited to 200 characters.
pub const SENTENCE_MIN: usize = 150;
pub const SENTENCE_MAX: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

impl Direction {
    fn step<'a>(self, node: NodeRef<'a, Node>) -> Option<NodeRef<'a, Node>> {
        match self {
            Direction::Backward => node.prev_sibling(),
            Direction::Forward => node.next_sibling(),
        }
    }
}

/// Context of `anchor` as a single line of Markdown-ish text, e.g.
/// `see [the docs](https://example.com/docs "Docs") for details`.
///
/// `href` is the resolved link target.
pub fn inline_context(anchor: ElementRef<'_>, href: &str) -> String {
    let token = link_token(anchor, href);

    let mut left = inline_run(*anchor, Direction::Backward);
    left.reverse();
    let right = inline_run(*anchor, Direction::Forward);

    let mut context = left.concat();
    context.push_str(&token);
    context.push_str(&right.concat());

    collapse_whitespace(&context)
}

fn link_token(anchor: ElementRef<'_>, href: &str) -> String {
    let text = collapse_whitespace(&render_inline(*anchor));
    match anchor.value().attr("title").map(str::trim) {
        Some(title) if !title.is_empty() => {
            format!("[{}]({} \"{}\")", text, href, title.replace('"', "\\\""))
        }
        _ => format!("[{}]({})", text, href),
    }
}

/// Collects the rendered text of the inline nodes next to `start`, nearest
/// first, climbing through inline ancestors and stopping at the first block.
fn inline_run(start: NodeRef<'_, Node>, direction: Direction) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = start;

    loop {
        let mut sibling = direction.step(current);
        while let Some(node) = sibling {
            match flow_of(node) {
                Flow::Text | Flow::Inline => parts.push(render_inline(node)),
                Flow::Skip => {}
                Flow::Block => return parts,
            }
            sibling = direction.step(node);
        }

        match current.parent() {
            Some(parent) if flow_of(parent) == Flow::Inline => current = parent,
            _ => return parts,
        }
    }
}

/// Text of an inline node, with `code` wrapped in backticks
fn render_inline(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    render_into(node, &mut out);
    out
}

fn render_into(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => match element.name() {
            "br" => out.push(' '),
            "code" => {
                out.push('`');
                out.push_str(&text_content(node));
                out.push('`');
            }
            _ => {
                for child in node.children() {
                    render_into(child, out);
                }
            }
        },
        _ => {}
    }
}

/// Context of `anchor` built from whole sentences, aiming for `min..max`
/// characters.
///
/// Sentences before and after the anchor are added alternately while the
/// summary is shorter than `min`, as long as each one keeps it under `max`.
/// Unlike the inline policy this walks every ancestor, so it can pull text
/// from neighbouring paragraphs.
pub fn sentence_context(anchor: ElementRef<'_>, min: usize, max: usize) -> String {
    let mut summary = text_content(*anchor);
    if char_len(&summary) > max {
        return limit_sentences(&summary, min, max);
    }

    let mut pre = Sentences::new(*anchor, Direction::Backward);
    let mut post = Sentences::new(*anchor, Direction::Forward);
    let mut pre_done = false;
    let mut post_done = false;

    while (!pre_done || !post_done) && char_len(&summary) < min {
        if !pre_done {
            match pre.next() {
                Some(sentence) if char_len(&summary) + char_len(&sentence) < max => {
                    summary.insert_str(0, &sentence);
                }
                _ => pre_done = true,
            }
        }

        if !post_done {
            match post.next() {
                Some(sentence) if char_len(&summary) + char_len(&sentence) < max => {
                    summary.push_str(&sentence);
                }
                _ => post_done = true,
            }
        }
    }

    summary
}

/// Sentences of the nodes around a starting node, nearest first.
///
/// Walks the siblings of the node, then the siblings of each ancestor in
/// turn, splitting each node's text on `.`.
struct Sentences<'a> {
    current: Option<NodeRef<'a, Node>>,
    sibling: Option<NodeRef<'a, Node>>,
    direction: Direction,
    pending: VecDeque<String>,
}

impl<'a> Sentences<'a> {
    fn new(start: NodeRef<'a, Node>, direction: Direction) -> Self {
        Self {
            current: Some(start),
            sibling: direction.step(start),
            direction,
            pending: VecDeque::new(),
        }
    }

    fn next_node(&mut self) -> Option<NodeRef<'a, Node>> {
        loop {
            if let Some(node) = self.sibling {
                self.sibling = self.direction.step(node);
                return Some(node);
            }
            let parent = self.current?.parent().filter(|p| p.value().is_element());
            self.current = parent;
            self.sibling = parent.and_then(|p| self.direction.step(p));
        }
    }

    fn split(&mut self, content: &str) {
        let text = keep_edge_whitespace(content);
        let sentences: Vec<&str> = text.split('.').collect();
        if sentences.len() == 1 {
            self.pending.push_back(text);
            return;
        }
        let ordered: Box<dyn Iterator<Item = &&str>> = match self.direction {
            Direction::Forward => Box::new(sentences.iter()),
            Direction::Backward => Box::new(sentences.iter().rev()),
        };
        for sentence in ordered {
            self.pending.push_back(format!("{}.", sentence));
        }
    }
}

impl Iterator for Sentences<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(sentence) = self.pending.pop_front() {
                return Some(sentence);
            }
            let node = self.next_node()?;
            let content = text_content(node);
            self.split(&content);
        }
    }
}

/// Trims `content`, keeping a single whitespace character on each side that
/// had any, so adjacent fragments do not run together.
fn keep_edge_whitespace(content: &str) -> String {
    let trimmed = content.trim();
    let mut text = String::new();
    if let Some(first) = content.chars().next() {
        if trimmed.chars().next() != Some(first) {
            text.push(first);
        }
    }
    text.push_str(trimmed);
    if let Some(last) = content.chars().last() {
        if text.chars().last() != Some(last) {
            text.push(last);
        }
    }
    text
}
