use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header;
use scraper::{Html, Node, Selector};
use tracing::debug;
use url::Url;

use crate::cli::config::FetcherSettings;
use crate::crawler::filter::compile_full_match;
use crate::error::{ConfigError, ParseError};
use crate::parser::{PageData, PageParser};
use crate::profiler::Measured;

/// Elements whose text is never visible on the rendered page
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Production page parser backed by an HTTP client
///
/// Fetches a URL, checks that the response is an HTML document, and
/// reduces it to the two things a crawl cares about: the page's outbound
/// links (resolved to absolute URLs) and the occurrence count of each
/// word in its visible text. Every failure is scoped to the URL being
/// parsed; the caller decides what to do with it.
pub struct HtmlPageParser {
    /// Shared HTTP client with the configured user agent and timeout
    client: reqwest::Client,

    /// Selector for anchor elements carrying an href
    link_selector: Selector,

    /// Selector for the document body
    body_selector: Selector,

    /// Words matching any of these patterns in full are not counted
    ignored_words: Vec<Regex>,
}

impl HtmlPageParser {
    /// Build a parser from the fetcher settings. Fails fast on a bad
    /// ignored-word pattern or an HTTP client that cannot be constructed.
    pub fn new(settings: &FetcherSettings) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            client,
            link_selector: compile_selector("a[href]")?,
            body_selector: compile_selector("body")?,
            ignored_words: compile_full_match(&settings.ignored_words)?,
        })
    }

    /// Collect the outbound links of a parsed document
    fn extract_links(&self, document: &Html, base: &Url) -> Vec<String> {
        let mut links = Vec::new();
        let mut seen = HashSet::new();

        for element in document.select(&self.link_selector) {
            let href = match element.value().attr("href") {
                Some(href) => href.trim(),
                None => continue,
            };

            // Skip references that never lead to another page
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("mailto:")
                || href.starts_with("javascript:")
                || href.starts_with("tel:")
            {
                continue;
            }

            let mut resolved = match base.join(href) {
                Ok(resolved) => resolved,
                Err(e) => {
                    debug!("Skipping unresolvable link '{}': {}", href, e);
                    continue;
                }
            };

            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }

            // Fragments address positions inside a page, not pages
            resolved.set_fragment(None);

            let resolved = resolved.to_string();
            if seen.insert(resolved.clone()) {
                links.push(resolved);
            }
        }

        links
    }

    /// Count the words in a document's visible text
    fn count_words(&self, document: &Html) -> HashMap<String, u64> {
        let mut counts = HashMap::new();

        let root = match document.select(&self.body_selector).next() {
            Some(body) => *body,
            None => document.tree.root(),
        };

        let mut nodes: Vec<_> = root.children().collect();
        while let Some(node) = nodes.pop() {
            match node.value() {
                Node::Text(text) => {
                    for raw in text.split(|c: char| !c.is_alphanumeric()) {
                        if raw.is_empty() {
                            continue;
                        }
                        let word = raw.to_lowercase();
                        if self.ignored_words.iter().any(|p| p.is_match(&word)) {
                            continue;
                        }
                        *counts.entry(word).or_insert(0) += 1;
                    }
                }
                Node::Element(element) => {
                    if !SKIPPED_ELEMENTS.contains(&element.name()) {
                        nodes.extend(node.children());
                    }
                }
                _ => {}
            }
        }

        counts
    }
}

#[async_trait]
impl PageParser for HtmlPageParser {
    async fn parse(&self, url: &str) -> Result<PageData, ParseError> {
        let base = Url::parse(url).map_err(|e| ParseError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(base.clone())
            .send()
            .await
            .map_err(|source| ParseError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ParseError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
            let content_type = String::from_utf8_lossy(content_type.as_bytes()).to_string();
            if !content_type.contains("html") {
                return Err(ParseError::NotHtml {
                    url: url.to_string(),
                    content_type,
                });
            }
        }

        let body = response
            .text()
            .await
            .map_err(|source| ParseError::Fetch {
                url: url.to_string(),
                source,
            })?;

        // The scraper DOM is not Send, so the whole extraction pass runs
        // synchronously between awaits
        let document = Html::parse_document(&body);
        let links = self.extract_links(&document, &base);
        let word_counts = self.count_words(&document);

        debug!(
            "Parsed {} ({} links, {} distinct words)",
            url,
            links.len(),
            word_counts.len()
        );

        Ok(PageData { links, word_counts })
    }
}

impl Measured for HtmlPageParser {
    fn component_name(&self) -> &'static str {
        "HtmlPageParser"
    }

    fn measured_operations(&self) -> &'static [&'static str] {
        &["parse"]
    }
}

fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_settings() -> FetcherSettings {
        FetcherSettings {
            user_agent: "wordcrawl-test/0.1".to_string(),
            fetch_timeout_secs: 5,
            ignored_words: vec![],
        }
    }

    fn parser_with_ignored(ignored: &[&str]) -> HtmlPageParser {
        let settings = FetcherSettings {
            ignored_words: ignored.iter().map(|s| s.to_string()).collect(),
            ..test_settings()
        };
        HtmlPageParser::new(&settings).expect("parser should build")
    }

    async fn serve_html(server: &MockServer, route: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(body.to_string(), "text/html; charset=utf-8"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn counts_visible_words_lowercased() {
        let server = MockServer::start().await;
        serve_html(
            &server,
            "/",
            "<html><body><p>Rust rust RUST makes counting easy</p></body></html>",
        )
        .await;

        let parser = parser_with_ignored(&[]);
        let page = parser
            .parse(&server.uri())
            .await
            .expect("parse should succeed");

        assert_eq!(page.word_counts.get("rust"), Some(&3));
        assert_eq!(page.word_counts.get("counting"), Some(&1));
        assert!(page.links.is_empty());
    }

    #[tokio::test]
    async fn script_and_style_text_is_not_counted() {
        let server = MockServer::start().await;
        serve_html(
            &server,
            "/",
            r#"<html><head><style>p { color: red; }</style></head>
               <body><p>visible</p><script>var hidden = 1;</script></body></html>"#,
        )
        .await;

        let parser = parser_with_ignored(&[]);
        let page = parser
            .parse(&server.uri())
            .await
            .expect("parse should succeed");

        assert_eq!(page.word_counts.get("visible"), Some(&1));
        assert_eq!(page.word_counts.get("hidden"), None);
        assert_eq!(page.word_counts.get("var"), None);
        assert_eq!(page.word_counts.get("color"), None);
    }

    #[tokio::test]
    async fn ignored_word_patterns_match_in_full() {
        let server = MockServer::start().await;
        serve_html(&server, "/", "<body>a an the theory of everything</body>").await;

        // Drop words of three letters or fewer
        let parser = parser_with_ignored(&["^.{1,3}$"]);
        let page = parser
            .parse(&server.uri())
            .await
            .expect("parse should succeed");

        assert_eq!(page.word_counts.get("a"), None);
        assert_eq!(page.word_counts.get("the"), None);
        // "theory" contains "the" but the pattern must match the whole word
        assert_eq!(page.word_counts.get("theory"), Some(&1));
        assert_eq!(page.word_counts.get("everything"), Some(&1));
    }

    #[tokio::test]
    async fn links_resolve_against_the_page_url() {
        let server = MockServer::start().await;
        serve_html(
            &server,
            "/docs/index.html",
            r#"<body>
                 <a href="chapter1.html">first</a>
                 <a href="/about">about</a>
                 <a href="https://other.example/page">external</a>
               </body>"#,
        )
        .await;

        let parser = parser_with_ignored(&[]);
        let url = format!("{}/docs/index.html", server.uri());
        let page = parser.parse(&url).await.expect("parse should succeed");

        assert_eq!(
            page.links,
            vec![
                format!("{}/docs/chapter1.html", server.uri()),
                format!("{}/about", server.uri()),
                "https://other.example/page".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn non_page_references_are_skipped_and_duplicates_collapse() {
        let server = MockServer::start().await;
        serve_html(
            &server,
            "/",
            r##"<body>
                 <a href="#section">anchor</a>
                 <a href="mailto:team@example.com">mail</a>
                 <a href="javascript:void(0)">js</a>
                 <a href="tel:+15551234">call</a>
                 <a href="ftp://files.example/archive">ftp</a>
                 <a href="/page#top">page</a>
                 <a href="/page">page again</a>
               </body>"##,
        )
        .await;

        let parser = parser_with_ignored(&[]);
        let page = parser
            .parse(&server.uri())
            .await
            .expect("parse should succeed");

        // The fragment is stripped, so both /page references are one link
        assert_eq!(page.links, vec![format!("{}/page", server.uri())]);
    }

    #[tokio::test]
    async fn non_success_status_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let parser = parser_with_ignored(&[]);
        let url = format!("{}/missing", server.uri());
        let result = parser.parse(&url).await;

        assert!(matches!(
            result,
            Err(ParseError::Status { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn non_html_content_type_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string("{\"not\": \"html\"}"),
            )
            .mount(&server)
            .await;

        let parser = parser_with_ignored(&[]);
        let url = format!("{}/data", server.uri());
        let result = parser.parse(&url).await;

        assert!(matches!(result, Err(ParseError::NotHtml { .. })));
    }

    #[tokio::test]
    async fn unparseable_url_is_rejected_without_a_request() {
        let parser = parser_with_ignored(&[]);
        let result = parser.parse("not a url").await;

        assert!(matches!(result, Err(ParseError::InvalidUrl { .. })));
    }

    #[test]
    fn bad_ignored_word_pattern_fails_construction() {
        let settings = FetcherSettings {
            ignored_words: vec!["[unclosed".to_string()],
            ..test_settings()
        };

        assert!(matches!(
            HtmlPageParser::new(&settings),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }
}
