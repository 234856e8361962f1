use thiserror::Error;

/// Setup-time configuration errors. These surface before any crawling
/// starts; nothing is fetched once one of these is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The worker pool must have at least one slot.
    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    /// An exclusion or ignored-word pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A CSS selector used by the HTML parser failed to compile.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// A component was handed to the profiler without declaring any
    /// measured operations, so there would be nothing to record.
    #[error("component '{component}' declares no measured operations")]
    NoMeasuredOperations { component: String },
}

/// Per-page fetch/parse failures. These are recoverable: the crawl task
/// that hit one logs it and moves on, without affecting other branches.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The URL itself could not be parsed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP request failed outright (connection, TLS, timeout).
    #[error("request for '{url}' failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("'{url}' returned HTTP status {status}")]
    Status { url: String, status: u16 },

    /// The response is not an HTML document.
    #[error("'{url}' is not an HTML page (content type: {content_type})")]
    NotHtml { url: String, content_type: String },
}
