use crate::config::ExtractorConfig;
use url::Url;

/// Strips the query and fragment from a URL.
///
/// This is the identity of a resource: the scan base, the `url` of an
/// `InputResource` and lookups against the knowledge server all go through it.
pub fn read_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_query(None);
    normalized.set_fragment(None);
    normalized
}

/// Parses `spec` and strips its query and fragment
pub fn parse_normalized(spec: &str) -> Result<Url, url::ParseError> {
    Url::parse(spec).map(|url| read_url(&url))
}

/// Whether two URLs point at the same document, ignoring query and fragment.
///
/// Compares scheme, host and port rather than `Url::origin`: `file:` and
/// other non-special schemes have opaque origins that never compare equal.
pub fn is_same_document(target: &Url, source: &Url) -> bool {
    target.scheme() == source.scheme()
        && target.host_str() == source.host_str()
        && target.port_or_known_default() == source.port_or_known_default()
        && target.path() == source.path()
}

/// Decides which resolved anchor targets a scan keeps
#[derive(Debug, Clone)]
pub struct LinkFilter {
    page_url: Url,
    ignored_protocols: Vec<String>,
}

impl LinkFilter {
    /// Create a filter for links found on `page_url`
    pub fn new(page_url: &Url, config: &ExtractorConfig) -> Self {
        Self {
            page_url: read_url(page_url),
            ignored_protocols: config.ignored_protocols.clone(),
        }
    }

    /// Normalized URL of the page being scanned
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// Determine if a resolved link target should be emitted
    pub fn should_emit(&self, target: &Url) -> bool {
        if self.is_ignored_protocol(target) {
            ::log::trace!("Ignoring link with protocol {}: {}", target.scheme(), target);
            return false;
        }

        if is_same_document(target, &self.page_url) {
            ::log::trace!("Ignoring self link: {}", target);
            return false;
        }

        true
    }

    fn is_ignored_protocol(&self, url: &Url) -> bool {
        let scheme = url.scheme();
        self.ignored_protocols
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(scheme))
    }
}
