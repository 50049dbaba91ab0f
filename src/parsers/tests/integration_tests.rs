use crate::capture::Snapshot;
use crate::config::ExtractorConfig;
use crate::model;
use crate::parsers::Parser;

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Understanding the borrow checker in practice | Rust Notes</title>
  <meta property="og:site_name" content="Rust Notes">
  <meta property="og:image" content="https://cdn.example.com/cover.jpg">
  <link rel="icon" href="/favicon.png">
</head>
<body>
  <nav class="menu"><a href="/">Home</a> <a href="/about">About</a></nav>
  <article>
    <h1>Understanding the borrow checker</h1>
    <p>The borrow checker enforces a simple rule, one writer or many readers,
       and most of its error messages are variations on that theme.</p>
    <p>See <a href="https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html">the book</a>
       for the details, or <a href="javascript:share()">share this</a>.</p>
    <p><a href="#top">Back to top</a> <a href="/notes/borrow-checker?print=1">Print</a></p>
  </article>
</body>
</html>"##;

    const URL: &str = "https://notes.example.com/notes/borrow-checker?ref=home";

    #[test]
    fn test_parse_article() {
        let snapshot = Snapshot::new(URL, ARTICLE);
        let result = Parser::parse_snapshot(&snapshot, &ExtractorConfig::default()).unwrap();

        assert_eq!(
            result.scrape.title,
            "Understanding the borrow checker in practice"
        );
        assert!(result.scrape.description.starts_with("The borrow checker enforces"));
        assert_eq!(result.scrape.name, "Rust Notes");
        assert_eq!(
            result.scrape.icon.as_deref(),
            Some("https://notes.example.com/favicon.png")
        );
        assert_eq!(result.scrape.hero, vec!["https://cdn.example.com/cover.jpg"]);

        let targets: Vec<&str> = result
            .links
            .iter()
            .map(|link| link.target_url.as_str())
            .collect();
        assert_eq!(
            targets,
            vec![
                "https://notes.example.com/",
                "https://notes.example.com/about",
                "https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html",
            ]
        );

        let book = &result.links[2];
        assert_eq!(book.name, "the book");
        assert_eq!(
            book.referrer_fragment.as_deref(),
            Some(
                "See [the book](https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html) \
                 for the details, or share this."
            )
        );
    }

    #[test]
    fn test_read_builds_resource() {
        let snapshot = Snapshot::new(URL, ARTICLE);
        let resource = model::read(&snapshot, &ExtractorConfig::default()).unwrap();

        assert_eq!(resource.url, "https://notes.example.com/notes/borrow-checker");
        assert_eq!(resource.image.as_deref(), Some("https://cdn.example.com/cover.jpg"));
        assert_eq!(resource.cid, None);
        assert_eq!(resource.tags, Some(vec![]));

        // no emitted link shares the page's origin and path
        for link in resource.links.unwrap() {
            assert!(!link.target_url.starts_with(&resource.url));
            assert!(!link.target_url.starts_with("javascript:"));
        }
    }

    #[test]
    fn test_parse_result_is_deterministic() {
        let snapshot = Snapshot::new(URL, ARTICLE);
        let config = ExtractorConfig::default();
        let first = Parser::parse_snapshot(&snapshot, &config).unwrap();
        let second = Parser::parse_snapshot(&snapshot, &config).unwrap();
        assert_eq!(first.scrape, second.scrape);
        assert_eq!(first.links, second.links);
    }
}
