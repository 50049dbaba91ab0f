use crate::config::{ContextPolicy, ExtractorConfig};
use crate::parsers::Document;
use crate::parsers::links::scan;

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://example.com/page";

    fn contexts(body: &str) -> Vec<String> {
        contexts_with(body, &ExtractorConfig::default())
    }

    fn contexts_with(body: &str, config: &ExtractorConfig) -> Vec<String> {
        let html = format!("<html><body>{}</body></html>", body);
        let document = Document::from_html(&html, PAGE).unwrap();
        scan(&document, config)
            .into_iter()
            .map(|link| link.referrer_fragment.unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_context_includes_same_block_siblings() {
        let found = contexts(r#"<p>Before. <a href="x">Link</a> After.</p>"#);
        assert_eq!(found, vec!["Before. [Link](https://example.com/x) After."]);
    }

    #[test]
    fn test_context_stops_at_block_siblings() {
        let found = contexts(r#"<p>Before.</p><a href="x">Link</a><p>After.</p>"#);
        assert_eq!(found, vec!["[Link](https://example.com/x)"]);
    }

    #[test]
    fn test_context_climbs_inline_parents() {
        let found = contexts(
            r#"<div>Intro <em>see <a href="/y">this</a> now</em> and more.</div><p>Elsewhere.</p>"#,
        );
        assert_eq!(
            found,
            vec!["Intro see [this](https://example.com/y) now and more."]
        );
    }

    #[test]
    fn test_context_stops_at_block_inside_parent() {
        let found = contexts(
            r#"<div><p>Not included.</p>Left <a href="/y">link</a> right<ul><li>Nope</li></ul> nope</div>"#,
        );
        assert_eq!(found, vec!["Left [link](https://example.com/y) right"]);
    }

    #[test]
    fn test_context_renders_code_and_breaks() {
        let found = contexts(
            r#"<p>Run <code>cargo doc</code> then<br>read <a href="/docs">the docs</a></p>"#,
        );
        assert_eq!(
            found,
            vec!["Run `cargo doc` then read [the docs](https://example.com/docs)"]
        );
    }

    #[test]
    fn test_context_skips_comments() {
        let found = contexts(r#"<p>left <!-- hidden --> <a href="/c">c</a></p>"#);
        assert_eq!(found, vec!["left [c](https://example.com/c)"]);
    }

    #[test]
    fn test_context_link_title() {
        let found = contexts(r#"<p><a href="/t" title="A tip">tip</a></p>"#);
        assert_eq!(found, vec![r#"[tip](https://example.com/t "A tip")"#]);
    }

    #[test]
    fn test_context_collapses_whitespace() {
        let found = contexts("<p>\n   lots   of\n\n <a href=\"/w\">space\n here</a>  \n</p>");
        assert_eq!(found, vec!["lots of [space here](https://example.com/w)"]);
    }

    #[test]
    fn test_sentence_policy() {
        let config = ExtractorConfig {
            context: ContextPolicy::Sentences { min: 20, max: 60 },
            ..ExtractorConfig::default()
        };
        let found = contexts_with(
            r#"<p>First sentence here. Second one. <a href="/s">anchor</a> Third part.</p>"#,
            &config,
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("anchor"));
        assert!(found[0].contains("Third part."));
        assert!(found[0].chars().count() < 60);
    }

    #[test]
    fn test_sentence_policy_limits_long_anchor_text() {
        let config = ExtractorConfig {
            context: ContextPolicy::Sentences { min: 10, max: 30 },
            ..ExtractorConfig::default()
        };
        let anchor_text = "A very long anchor text. It goes on and on. And on some more.";
        let found = contexts_with(&format!(r#"<p><a href="/l">{}</a></p>"#, anchor_text), &config);
        assert!(found[0].chars().count() <= 30);
        assert_eq!(found[0], "A very long anchor text");
    }
}
