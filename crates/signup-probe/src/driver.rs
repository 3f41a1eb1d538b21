//! PageDriver - Abstract Browser Page Trait
//!
//! The primitive operations a page object needs from one browser page. Two
//! implementations exist:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────┐   ┌──────────────────────────┐  │
//! │  │  ChromiumDriver         │   │  MockDriver              │  │
//! │  │  (feature = "browser")  │   │  (unit tests, dry runs)  │  │
//! │  │  CDP via chromiumoxide  │   │  in-memory signup DOM    │  │
//! │  └─────────────────────────┘   └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Driver operations are immediate: they never wait for an element to appear.
//! Auto-waiting and timeouts live one layer up, in [`crate::BasePage`].
//! Actions (`fill`, `click`, ...) are strict and fail unless the selector
//! resolves to exactly one element.

use crate::locator::Selector;
use crate::result::ProbeResult;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Snapshot of one matched element, taken in a single round-trip
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    /// Text content (untrimmed)
    pub text: String,
    /// Current value for form controls
    pub value: Option<String>,
    /// Whether the element renders with a non-empty box
    pub visible: bool,
    /// Whether the element accepts interaction
    pub enabled: bool,
    /// Checked state for radios and checkboxes
    pub checked: bool,
    /// All attributes as authored
    pub attributes: BTreeMap<String, String>,
}

impl ElementSnapshot {
    /// Create a snapshot for a tag
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    /// Get an attribute value
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether the control is marked required
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.attributes.contains_key("required")
            || self.attribute("aria-required") == Some("true")
    }

    /// Accessible name: `aria-label`, falling back to text content
    #[must_use]
    pub fn accessible_name(&self) -> String {
        self.attribute("aria-label")
            .map_or_else(|| self.text.clone(), str::to_string)
    }
}

/// Abstract driver trait for one browser page
///
/// A page is single-owner: mutating operations take `&mut self`, so the
/// borrow checker rules out two logical tasks driving the same page.
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to URL and wait for the given load state
    async fn goto(&mut self, url: &str, wait_until: LoadState, timeout: Duration)
        -> ProbeResult<()>;

    /// Reload the current page
    async fn reload(&mut self, timeout: Duration) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Get the document title
    async fn title(&self) -> ProbeResult<String>;

    /// Snapshot every element matching the selector, in document order
    async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>>;

    /// Replace the value of an input with `value`
    async fn fill(&mut self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Append `text` to an input as if typed
    async fn type_text(&mut self, selector: &Selector, text: &str) -> ProbeResult<()>;

    /// Select the option whose value (or label) is `value`
    async fn select_option(&mut self, selector: &Selector, value: &str) -> ProbeResult<()>;

    /// Click element
    async fn click(&mut self, selector: &Selector) -> ProbeResult<()>;

    /// Focus element
    async fn focus(&mut self, selector: &Selector) -> ProbeResult<()>;

    /// Take a PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Close the page
    async fn close(&mut self) -> ProbeResult<()>;
}

/// Source of fresh pages, one per test attempt
#[async_trait]
pub trait PageFactory: Send + Sync {
    /// Allocate a new page
    async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>>;
}
