use thiserror::Error;

/// Failures while obtaining a page snapshot
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not connect to any WebDriver server (tried {0})")]
    WebDriver(String),

    #[error("failed while {context} {url}: {message}")]
    Navigation {
        context: &'static str,
        url: String,
        message: String,
    },

    #[error("timed out capturing {0}")]
    Timeout(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the knowledge server
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("knowledge server responded with status {0}")]
    Status(u16),

    #[error("graphql errors: {}", .0.join("; "))]
    GraphQL(Vec<String>),

    #[error("response is missing `{0}`")]
    MissingData(&'static str),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures delivering a message across the extension messaging boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Nobody is listening at the address yet; the content script has not
    /// been injected.
    #[error("could not establish connection: receiving end does not exist")]
    NoReceiver,

    #[error("channel disconnected: {0}")]
    Disconnected(String),
}

/// An annotation selector that does not resolve against the current document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("malformed selector `{0}`")]
    Malformed(String),

    #[error("selector matched nothing")]
    NotFound,

    #[error("position {start}..{end} is outside the {length} characters of text")]
    OutOfRange {
        start: usize,
        end: usize,
        length: usize,
    },
}

/// Failures loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}
