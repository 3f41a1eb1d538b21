//! Selector abstraction for addressing elements of the remote page.
//!
//! Two selector engines are supported, matching the strings a page object
//! declares:
//!
//! - **CSS / attribute selectors** such as `input[name="firstname"]` or
//!   `[role="alert"]`
//! - **Text selectors** written `text=Create a new account`, matched
//!   case-insensitively against whitespace-normalized text content, resolving
//!   to the innermost element that contains the text
//!
//! A selector resolves to zero or more elements in document order. Strictness
//! (exactly one match for an action) is enforced by the driver, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default polling interval for auto-waiting (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., `select[name="birthday_day"]`)
    Css(String),
    /// Text content selector (e.g., `text=Create a new account`)
    Text(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse a selector string, recognizing the `text=` engine prefix.
    ///
    /// Anything without a prefix is treated as CSS.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("text=") {
            Some(text) => Self::Text(unquote(text.trim()).to_string()),
            None => Self::Css(raw.trim().to_string()),
        }
    }

    /// Normalized needle used for text matching
    #[must_use]
    pub fn normalized_text(text: &str) -> String {
        text.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// JavaScript expression evaluating to an `Array` of matching elements
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(css) => format!(
                "Array.from(document.querySelectorAll({}))",
                js_string(css)
            ),
            Self::Text(text) => format!(
                "(() => {{ \
                    const needle = {}; \
                    const norm = s => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase(); \
                    return Array.from(document.querySelectorAll('body, body *')).filter(el => \
                        norm(el.textContent).includes(needle) && \
                        !Array.from(el.children).some(c => norm(c.textContent).includes(needle))); \
                }})()",
                js_string(&Self::normalized_text(text))
            ),
        }
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("{}.length", self.to_query())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::Text(text) => write!(f, "text={text}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// Encode a string as a JavaScript string literal
#[must_use]
pub fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
