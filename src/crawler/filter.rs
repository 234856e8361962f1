use regex::Regex;

use crate::error::ConfigError;

/// Compile a pattern list so that a match only counts when it covers the
/// whole input. Callers write plain patterns; the anchors are added here.
pub fn compile_full_match(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Filter deciding which URLs are excluded from a crawl
///
/// A URL is excluded when any configured pattern matches it in full;
/// partial matches do not count. The filter is immutable once built, so
/// concurrent tasks can share one instance without synchronization.
#[derive(Debug, Clone, Default)]
pub struct UrlFilter {
    /// Compiled exclusion patterns, in configuration order
    patterns: Vec<Regex>,
}

impl UrlFilter {
    /// Compile the configured exclusion patterns. A malformed pattern is
    /// a configuration error and aborts setup.
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            patterns: compile_full_match(patterns)?,
        })
    }

    /// Check whether a URL matches any exclusion pattern
    pub fn is_excluded(&self, url: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_must_cover_the_whole_url() {
        let filter = UrlFilter::new(&[r"https://example\.com/private".to_string()])
            .expect("pattern should compile");

        assert!(filter.is_excluded("https://example.com/private"));

        // A pattern matching only part of the URL does not exclude it
        assert!(!filter.is_excluded("https://example.com/private/report"));
        assert!(!filter.is_excluded("http://mirror.net/https://example.com/private"));
    }

    #[test]
    fn any_pattern_in_the_list_can_exclude() {
        let filter = UrlFilter::new(&[
            r".*\.pdf".to_string(),
            r"https://example\.com/admin.*".to_string(),
        ])
        .expect("patterns should compile");

        assert!(filter.is_excluded("https://example.com/report.pdf"));
        assert!(filter.is_excluded("https://example.com/admin/users"));
        assert!(!filter.is_excluded("https://example.com/about"));
    }

    #[test]
    fn empty_pattern_list_excludes_nothing() {
        let filter = UrlFilter::new(&[]).expect("empty list is valid");
        assert!(!filter.is_excluded("https://example.com/"));
    }

    #[test]
    fn patterns_with_explicit_anchors_still_work() {
        let filter = UrlFilter::new(&[r"^https://example\.com/old$".to_string()])
            .expect("pattern should compile");

        assert!(filter.is_excluded("https://example.com/old"));
        assert!(!filter.is_excluded("https://example.com/older"));
    }

    #[test]
    fn malformed_pattern_is_a_config_error() {
        let result = UrlFilter::new(&["[unclosed".to_string()]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPattern { pattern, .. }) if pattern == "[unclosed"
        ));
    }
}
