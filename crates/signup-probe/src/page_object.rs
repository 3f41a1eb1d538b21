//! Page Object Model support.
//!
//! A page object owns a [`BasePage`] and names the elements of one page. The
//! [`PageObject`] trait gives the fixture a uniform way to tell whether the
//! page it opened is the one the test expects.

use crate::base_page::BasePage;
use async_trait::async_trait;

/// Trait for page objects representing a page of the application.
///
/// # Example
///
/// ```ignore
/// struct LoginPage {
///     base: BasePage,
/// }
///
/// #[async_trait]
/// impl PageObject for LoginPage {
///     fn url_pattern(&self) -> &str {
///         "/login.php"
///     }
///
///     fn base(&self) -> &BasePage {
///         &self.base
///     }
///
///     fn base_mut(&mut self) -> &mut BasePage {
///         &mut self.base
///     }
///
///     async fn is_loaded(&self) -> bool {
///         self.base.is_visible(&Selector::css("#email")).await
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// URL path pattern of this page (e.g. `/r.php`, `/users/*`)
    fn url_pattern(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Shared page operations
    fn base(&self) -> &BasePage;

    /// Shared page operations, mutably
    fn base_mut(&mut self) -> &mut BasePage;

    /// Whether the page's landmark elements are present
    async fn is_loaded(&self) -> bool;

    /// Whether the current URL matches [`Self::url_pattern`]
    async fn is_at_expected_url(&self) -> bool {
        match self.base().current_url().await {
            Ok(url) => UrlMatcher::new(self.url_pattern()).matches(&url),
            Err(_) => false,
        }
    }
}

/// URL path matcher for page objects
///
/// Only the path is compared: scheme, host, query and fragment are ignored.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<UrlSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UrlSegment {
    Literal(String),
    Wildcard,
}

impl UrlMatcher {
    /// Create a matcher; `*` matches exactly one path segment
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|s| {
                if s == "*" {
                    UrlSegment::Wildcard
                } else {
                    UrlSegment::Literal(s.to_string())
                }
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Get the pattern string
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Check if a URL's path matches the pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path: Vec<&str> = split_path(path_of(url)).collect();
        path.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(&path)
                .all(|(segment, actual)| match segment {
                    UrlSegment::Literal(lit) => lit == actual,
                    UrlSegment::Wildcard => true,
                })
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Path component of an absolute or relative URL
fn path_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path_start = if url.contains("://") {
        without_scheme.find('/').unwrap_or(without_scheme.len())
    } else {
        0
    };
    let path = &without_scheme[path_start..];
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_absolute_url_with_query() {
        let matcher = UrlMatcher::new("/r.php");
        assert!(matcher.matches("https://www.facebook.com/r.php?entry_point=login"));
        assert!(!matcher.matches("https://www.facebook.com/confirmemail.php"));
    }

    #[test]
    fn test_matches_relative_path() {
        let matcher = UrlMatcher::new("/r.php");
        assert!(matcher.matches("/r.php#top"));
        assert!(!matcher.matches("/"));
    }

    #[test]
    fn test_wildcard_segment() {
        let matcher = UrlMatcher::new("/checkpoint/*");
        assert!(matcher.matches("https://www.facebook.com/checkpoint/828281030927956"));
        assert!(!matcher.matches("https://www.facebook.com/checkpoint"));
        assert!(!matcher.matches("https://www.facebook.com/checkpoint/a/b"));
        assert_eq!(matcher.pattern(), "/checkpoint/*");
    }

    #[test]
    fn test_host_only_url_has_empty_path() {
        assert_eq!(path_of("https://www.facebook.com"), "");
        assert!(UrlMatcher::new("/").matches("https://www.facebook.com"));
    }
}
