//! Generic page operations shared by every page object.
//!
//! [`BasePage`] owns one [`PageDriver`] and layers the behaviour tests rely
//! on over the driver's immediate primitives:
//!
//! - hard operations auto-wait for their element (visible, enabled, exactly
//!   one match) within the action timeout and surface the underlying error
//! - soft queries (`read_text`, `is_visible`, `is_enabled`) never fail
//! - every hard operation is recorded in the attempt's action trace, and
//!   optionally followed by a filmstrip frame

use crate::config::PageSettings;
use crate::driver::{ElementSnapshot, PageDriver};
use crate::locator::Selector;
use crate::result::{ProbeError, ProbeResult};
use crate::tracing_support::{ExecutionTracer, Filmstrip, TraceArchive};
use crate::wait::{poll_until, ElementState, LoadState, WaitOptions};
use std::path::Path;
use std::time::Duration;

/// Shared base of the page objects
#[derive(Debug)]
pub struct BasePage {
    driver: Box<dyn PageDriver>,
    settings: PageSettings,
    tracer: ExecutionTracer,
    filmstrip: Option<Filmstrip>,
}

impl BasePage {
    /// Wrap a fresh page
    #[must_use]
    pub fn new(driver: Box<dyn PageDriver>, settings: PageSettings) -> Self {
        Self {
            driver,
            settings,
            tracer: ExecutionTracer::new("page"),
            filmstrip: None,
        }
    }

    /// Name the action trace after a test
    #[must_use]
    pub fn with_trace_name(mut self, test_name: &str) -> Self {
        self.tracer = ExecutionTracer::new(test_name);
        self
    }

    /// Capture a frame after every hard operation
    #[must_use]
    pub fn with_filmstrip(mut self, enabled: bool) -> Self {
        self.filmstrip = enabled.then(Filmstrip::default);
        self
    }

    /// Page settings
    #[must_use]
    pub const fn settings(&self) -> &PageSettings {
        &self.settings
    }

    /// Trace recorded so far
    #[must_use]
    pub fn trace(&self) -> TraceArchive {
        self.tracer.archive()
    }

    /// Take the captured filmstrip, leaving an empty one behind
    pub fn take_filmstrip(&mut self) -> Option<Filmstrip> {
        self.filmstrip.as_mut().map(std::mem::take)
    }

    fn action_wait(&self) -> WaitOptions {
        WaitOptions::with_timeout(self.settings.timeouts.action_ms)
    }

    async fn finish<T: Send>(
        &mut self,
        handle: usize,
        name: &str,
        result: ProbeResult<T>,
    ) -> ProbeResult<T> {
        self.tracer
            .finish(handle, result.as_ref().err().map(ToString::to_string));
        if self.filmstrip.is_some() {
            match self.driver.screenshot().await {
                Ok(png) => {
                    let elapsed = self.tracer.elapsed_ms();
                    if let Some(strip) = self.filmstrip.as_mut() {
                        strip.push(name, elapsed, png);
                    }
                }
                Err(e) => tracing::debug!(error = %e, "filmstrip frame skipped"),
            }
        }
        result
    }

    /// Wait until exactly one match is visible and enabled
    async fn wait_actionable(&self, selector: &Selector) -> ProbeResult<()> {
        let driver = &self.driver;
        poll_until(
            self.action_wait(),
            format!("{selector} to be actionable"),
            || async move {
                let Some(found) = still_loading(selector, driver.query_all(selector).await)?
                else {
                    return Ok(None);
                };
                match found.as_slice() {
                    [one] => Ok((one.visible && one.enabled).then_some(())),
                    [] => Ok(None),
                    many => Err(ProbeError::element(
                        selector,
                        format!("strict mode violation: {} elements match", many.len()),
                    )),
                }
            },
        )
        .await
    }

    /// Wait until exactly one match is attached and return it
    async fn wait_single(&self, selector: &Selector) -> ProbeResult<ElementSnapshot> {
        let driver = &self.driver;
        poll_until(
            self.action_wait(),
            format!("{selector} to be attached"),
            || async move {
                let Some(mut found) = still_loading(selector, driver.query_all(selector).await)?
                else {
                    return Ok(None);
                };
                match found.len() {
                    0 => Ok(None),
                    1 => Ok(found.pop()),
                    n => Err(ProbeError::element(
                        selector,
                        format!("strict mode violation: {n} elements match"),
                    )),
                }
            },
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Navigate to `url` and wait for `wait_until`
    ///
    /// Transport failures and timeouts are logged and returned unchanged.
    pub async fn navigate_to(&mut self, url: &str, wait_until: LoadState) -> ProbeResult<()> {
        let handle = self.tracer.begin("goto", Some(url.to_string()));
        let timeout = Duration::from_millis(self.settings.timeouts.navigation_ms);
        let result = self.driver.goto(url, wait_until, timeout).await;
        match &result {
            Ok(()) => tracing::debug!(%url, %wait_until, "navigated"),
            Err(e) => tracing::error!(%url, error = %e, "navigation error"),
        }
        self.finish(handle, "goto", result).await
    }

    /// Open the signup entry point (`load`, which implies `domcontentloaded`)
    pub async fn navigate_to_signup(&mut self) -> ProbeResult<()> {
        let url = self.settings.signup_url();
        self.navigate_to(&url, LoadState::Load).await
    }

    /// Open the home page and wait for the network to settle
    pub async fn navigate_home(&mut self) -> ProbeResult<()> {
        let url = self.settings.base_url.clone();
        self.navigate_to(&url, LoadState::NetworkIdle).await
    }

    /// Reload the current page
    pub async fn reload(&mut self) -> ProbeResult<()> {
        let handle = self.tracer.begin("reload", None);
        let timeout = Duration::from_millis(self.settings.timeouts.navigation_ms);
        let result = self.driver.reload(timeout).await;
        self.finish(handle, "reload", result).await
    }

    /// Current URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Document title
    pub async fn title(&self) -> ProbeResult<String> {
        self.driver.title().await
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    /// Replace the value of an input
    pub async fn fill_field(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
        let handle = self.tracer.begin("fill", Some(selector.to_string()));
        let result = match self.wait_actionable(selector).await {
            Ok(()) => self.driver.fill(selector, value).await,
            Err(e) => Err(e),
        };
        self.finish(handle, "fill", result).await
    }

    /// Empty an input
    pub async fn clear_field(&mut self, selector: &Selector) -> ProbeResult<()> {
        self.fill_field(selector, "").await
    }

    /// Focus an input and type `text` one character at a time
    pub async fn type_slowly(
        &mut self,
        selector: &Selector,
        text: &str,
        delay: Duration,
    ) -> ProbeResult<()> {
        let handle = self.tracer.begin("type", Some(selector.to_string()));
        let result = self.type_chars(selector, text, delay).await;
        self.finish(handle, "type", result).await
    }

    async fn type_chars(&mut self, selector: &Selector, text: &str, delay: Duration) -> ProbeResult<()> {
        self.wait_actionable(selector).await?;
        self.driver.focus(selector).await?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            self.driver.type_text(selector, ch.encode_utf8(&mut buf)).await?;
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    /// Choose an option of a `<select>` by value or label
    pub async fn select_option(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
        let handle = self.tracer.begin("select", Some(selector.to_string()));
        let result = match self.wait_actionable(selector).await {
            Ok(()) => self.driver.select_option(selector, value).await,
            Err(e) => Err(e),
        };
        self.finish(handle, "select", result).await
    }

    /// Click an element
    pub async fn click(&mut self, selector: &Selector) -> ProbeResult<()> {
        let handle = self.tracer.begin("click", Some(selector.to_string()));
        let result = match self.wait_actionable(selector).await {
            Ok(()) => self.driver.click(selector).await,
            Err(e) => Err(e),
        };
        self.finish(handle, "click", result).await
    }

    /// Focus an element
    pub async fn focus(&mut self, selector: &Selector) -> ProbeResult<()> {
        let handle = self.tracer.begin("focus", Some(selector.to_string()));
        let result = match self.wait_single(selector).await {
            Ok(_) => self.driver.focus(selector).await,
            Err(e) => Err(e),
        };
        self.finish(handle, "focus", result).await
    }

    // ------------------------------------------------------------------------
    // Waits
    // ------------------------------------------------------------------------

    /// Wait for the selector to reach `state`
    pub async fn wait_for_state(
        &mut self,
        selector: &Selector,
        state: ElementState,
        timeout_ms: u64,
    ) -> ProbeResult<()> {
        let handle = self
            .tracer
            .begin(&format!("wait:{}", state.describe()), Some(selector.to_string()));
        let driver = &self.driver;
        let result = poll_until(
            WaitOptions::with_timeout(timeout_ms),
            format!("{selector} to be {}", state.describe()),
            || async move {
                let Some(found) = still_loading(selector, driver.query_all(selector).await)?
                else {
                    return Ok(None);
                };
                let reached = match state {
                    ElementState::Attached => !found.is_empty(),
                    ElementState::Detached => found.is_empty(),
                    ElementState::Visible => found.iter().any(|e| e.visible),
                    ElementState::Hidden => !found.iter().any(|e| e.visible),
                    ElementState::Enabled => found.iter().any(|e| e.visible && e.enabled),
                };
                Ok(reached.then_some(()))
            },
        )
        .await;
        self.tracer
            .finish(handle, result.as_ref().err().map(ToString::to_string));
        result
    }

    /// Wait for a visible match
    pub async fn wait_for_visible(&mut self, selector: &Selector, timeout_ms: u64) -> ProbeResult<()> {
        self.wait_for_state(selector, ElementState::Visible, timeout_ms)
            .await
    }

    /// Wait until no match is visible
    pub async fn wait_for_hidden(&mut self, selector: &Selector, timeout_ms: u64) -> ProbeResult<()> {
        self.wait_for_state(selector, ElementState::Hidden, timeout_ms)
            .await
    }

    /// Wait for a visible, enabled match
    pub async fn wait_for_enabled(&mut self, selector: &Selector, timeout_ms: u64) -> ProbeResult<()> {
        self.wait_for_state(selector, ElementState::Enabled, timeout_ms)
            .await
    }

    // ------------------------------------------------------------------------
    // Soft queries
    // ------------------------------------------------------------------------

    async fn first(&self, selector: &Selector) -> Option<ElementSnapshot> {
        self.driver
            .query_all(selector)
            .await
            .ok()
            .and_then(|found| found.into_iter().next())
    }

    /// Text content of the first match, empty when absent
    pub async fn read_text(&self, selector: &Selector) -> String {
        self.first(selector).await.map(|e| e.text).unwrap_or_default()
    }

    /// Whether the first match is visible; false on any error
    pub async fn is_visible(&self, selector: &Selector) -> bool {
        self.first(selector).await.is_some_and(|e| e.visible)
    }

    /// Whether the first match is enabled; false on any error
    pub async fn is_enabled(&self, selector: &Selector) -> bool {
        self.first(selector).await.is_some_and(|e| e.enabled)
    }

    // ------------------------------------------------------------------------
    // Hard queries
    // ------------------------------------------------------------------------

    /// Current value of a form control
    pub async fn input_value(&self, selector: &Selector) -> ProbeResult<String> {
        let element = self.wait_single(selector).await?;
        element.value.ok_or_else(|| {
            ProbeError::element(selector, "element is not an input, textarea or select")
        })
    }

    /// Checked state of a radio or checkbox
    pub async fn is_checked(&self, selector: &Selector) -> ProbeResult<bool> {
        Ok(self.wait_single(selector).await?.checked)
    }

    /// Attribute of the single match, `None` when not set
    pub async fn attribute(&self, selector: &Selector, name: &str) -> ProbeResult<Option<String>> {
        let element = self.wait_single(selector).await?;
        Ok(element.attribute(name).map(str::to_string))
    }

    /// Number of matches right now
    pub async fn count(&self, selector: &Selector) -> ProbeResult<usize> {
        Ok(self.driver.query_all(selector).await?.len())
    }

    /// Number of visible matches
    pub async fn count_visible(&self, selector: &Selector) -> ProbeResult<usize> {
        Ok(self
            .driver
            .query_all(selector)
            .await?
            .iter()
            .filter(|e| e.visible)
            .count())
    }

    /// Text content of every visible match in document order
    pub async fn visible_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        Ok(self
            .driver
            .query_all(selector)
            .await?
            .into_iter()
            .filter(|e| e.visible)
            .map(|e| e.text)
            .collect())
    }

    /// Text content of every match in document order
    pub async fn all_text_contents(&self, selector: &Selector) -> ProbeResult<Vec<String>> {
        Ok(self
            .driver
            .query_all(selector)
            .await?
            .into_iter()
            .map(|e| e.text)
            .collect())
    }

    /// Whether a control carries `required` / `aria-required`
    pub async fn is_required(&self, selector: &Selector) -> ProbeResult<bool> {
        Ok(self.wait_single(selector).await?.is_required())
    }

    /// `aria-label`, falling back to text content
    pub async fn accessible_name(&self, selector: &Selector) -> ProbeResult<String> {
        Ok(self.wait_single(selector).await?.accessible_name())
    }

    /// Text content of the whole page
    pub async fn page_content(&self) -> ProbeResult<String> {
        Ok(self
            .all_text_contents(&Selector::css("body"))
            .await?
            .join("\n"))
    }

    /// Error text shown for a field: a following `.error` sibling or an alert
    ///
    /// Returns `None` when nothing visible matches.
    pub async fn error_message_for(&self, field: &Selector) -> ProbeResult<Option<String>> {
        let candidates = match field {
            Selector::Css(css) => Selector::css(format!(
                "{css} + .error, {css} ~ .error, [role=\"alert\"]"
            )),
            Selector::Text(_) => Selector::css("[role=\"alert\"]"),
        };
        Ok(self
            .driver
            .query_all(&candidates)
            .await?
            .into_iter()
            .find(|e| e.visible)
            .map(|e| e.text))
    }

    // ------------------------------------------------------------------------
    // Screenshots and lifecycle
    // ------------------------------------------------------------------------

    /// PNG of the viewport
    pub async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Write a PNG of the viewport to `path`
    pub async fn save_screenshot(&self, path: &Path) -> ProbeResult<()> {
        let png = self.screenshot().await?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, png).await?;
        Ok(())
    }

    /// Close the page
    pub async fn close(&mut self) -> ProbeResult<()> {
        self.driver.close().await
    }
}

/// A page error while waiting means the document is being replaced (for
/// example "Execution context was destroyed" mid-navigation); poll again.
fn still_loading(
    selector: &Selector,
    result: ProbeResult<Vec<ElementSnapshot>>,
) -> ProbeResult<Option<Vec<ElementSnapshot>>> {
    match result {
        Ok(found) => Ok(Some(found)),
        Err(ProbeError::PageError { message }) => {
            tracing::debug!(selector = %selector, error = %message, "query failed while waiting, retrying");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::mock::{MockDriver, MockElement};
    use tempfile::TempDir;

    fn fast_settings() -> PageSettings {
        PageSettings {
            timeouts: Timeouts {
                test_ms: 2_000,
                navigation_ms: 500,
                action_ms: 200,
                expect_ms: 200,
                heading_ms: 200,
            },
            ..PageSettings::default()
        }
    }

    async fn signup_page() -> BasePage {
        let mut page = BasePage::new(Box::new(MockDriver::signup_form()), fast_settings());
        page.navigate_to_signup().await.unwrap();
        page
    }

    fn first_name() -> Selector {
        Selector::css("input[name=\"firstname\"]")
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_to_signup() {
            let page = signup_page().await;
            assert_eq!(
                page.current_url().await.unwrap(),
                "https://www.facebook.com/r.php?entry_point=login"
            );
            assert!(page.title().await.unwrap().contains("Sign up"));
        }

        #[tokio::test]
        async fn test_navigation_error_is_surfaced() {
            let mut page = BasePage::new(
                Box::new(MockDriver::signup_form().unreachable()),
                fast_settings(),
            );
            let err = page.navigate_home().await.unwrap_err();
            assert!(err.is_navigation());
            assert_eq!(page.trace().failed_actions().len(), 1);
        }

        #[tokio::test]
        async fn test_reload_keeps_url() {
            let mut page = signup_page().await;
            let before = page.current_url().await.unwrap();
            page.reload().await.unwrap();
            assert_eq!(page.current_url().await.unwrap(), before);
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test]
        async fn test_fill_and_read_value() {
            let mut page = signup_page().await;
            page.fill_field(&first_name(), "Jean-Paul").await.unwrap();
            assert_eq!(page.input_value(&first_name()).await.unwrap(), "Jean-Paul");
            page.clear_field(&first_name()).await.unwrap();
            assert_eq!(page.input_value(&first_name()).await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_type_slowly_appends() {
            let mut page = signup_page().await;
            page.fill_field(&first_name(), "Jo").await.unwrap();
            page.type_slowly(&first_name(), "hn", Duration::from_millis(1))
                .await
                .unwrap();
            assert_eq!(page.input_value(&first_name()).await.unwrap(), "John");
        }

        #[tokio::test]
        async fn test_action_on_missing_element_times_out() {
            let mut page = signup_page().await;
            let err = page
                .click(&Selector::css("button[name=\"nope\"]"))
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_action_strict_mode() {
            let mut page = signup_page().await;
            let err = page
                .click(&Selector::css("input[name=\"sex\"]"))
                .await
                .unwrap_err();
            assert!(err.to_string().contains("strict mode violation"));
        }

        #[tokio::test]
        async fn test_actions_are_traced() {
            let mut page = signup_page().await;
            page.fill_field(&first_name(), "A").await.unwrap();
            page.click(&Selector::css("input[value=\"1\"]")).await.unwrap();
            let trace = page.trace();
            let names: Vec<&str> = trace.actions.iter().map(|a| a.name.as_str()).collect();
            assert_eq!(names, vec!["goto", "fill", "click"]);
        }

        #[tokio::test]
        async fn test_filmstrip_frames_per_action() {
            let mut page = BasePage::new(Box::new(MockDriver::signup_form()), fast_settings())
                .with_filmstrip(true);
            page.navigate_to_signup().await.unwrap();
            page.fill_field(&first_name(), "John").await.unwrap();
            let strip = page.take_filmstrip().unwrap();
            assert_eq!(strip.frames().len(), 2);
            assert_eq!(strip.frames()[1].action, "fill");
        }
    }

    mod query_tests {
        use super::*;

        #[tokio::test]
        async fn test_soft_queries_never_fail() {
            let page = BasePage::new(Box::new(MockDriver::signup_form()), fast_settings());
            assert_eq!(page.read_text(&first_name()).await, "");
            assert!(!page.is_visible(&first_name()).await);
            assert!(!page.is_enabled(&first_name()).await);
        }

        #[tokio::test]
        async fn test_wait_for_visible_times_out() {
            let mut page = signup_page().await;
            let err = page
                .wait_for_visible(&Selector::css("[role=\"alert\"]"), 50)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_wait_for_hidden_when_absent() {
            let mut page = signup_page().await;
            page.wait_for_hidden(&Selector::css("[role=\"alert\"]"), 50)
                .await
                .unwrap();
        }

        #[tokio::test]
        async fn test_required_and_accessible_name() {
            let page = signup_page().await;
            assert!(page.is_required(&first_name()).await.unwrap());
            assert_eq!(page.accessible_name(&first_name()).await.unwrap(), "First name");
            assert_eq!(
                page.attribute(&first_name(), "placeholder").await.unwrap().as_deref(),
                Some("First name")
            );
            assert_eq!(page.attribute(&first_name(), "maxlength").await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_count_and_text_contents() {
            let page = signup_page().await;
            assert_eq!(page.count(&Selector::css("input[name=\"sex\"]")).await.unwrap(), 3);
            let headings = page
                .all_text_contents(&Selector::text("Create a new account"))
                .await
                .unwrap();
            assert_eq!(headings, vec!["Create a new account".to_string()]);
        }

        #[tokio::test]
        async fn test_error_message_for_sibling() {
            let driver = MockDriver::new()
                .with_element(MockElement::input("email"))
                .with_element(
                    MockElement::new("span")
                        .attr("class", "error")
                        .with_text("Invalid email"),
                );
            let mut page = BasePage::new(Box::new(driver), fast_settings());
            page.navigate_home().await.unwrap();
            let field = Selector::css("input[name=\"email\"]");
            assert_eq!(
                page.error_message_for(&field).await.unwrap().as_deref(),
                Some("Invalid email")
            );
            let other = Selector::css("input[name=\"phone\"]");
            assert_eq!(page.error_message_for(&other).await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_save_screenshot() {
            let dir = TempDir::new().unwrap();
            let page = signup_page().await;
            let path = dir.path().join("shots").join("form.png");
            page.save_screenshot(&path).await.unwrap();
            assert!(path.exists());
        }
    }

    mod transient_failure_tests {
        use super::*;
        use async_trait::async_trait;
        use std::sync::atomic::{AtomicU32, Ordering};

        /// Driver whose first `query_all` calls fail as if the page were navigating
        #[derive(Debug)]
        struct NavigatingDriver {
            inner: MockDriver,
            failures_left: AtomicU32,
        }

        impl NavigatingDriver {
            fn failing(failures: u32) -> Self {
                Self {
                    inner: MockDriver::signup_form(),
                    failures_left: AtomicU32::new(failures),
                }
            }
        }

        #[async_trait]
        impl PageDriver for NavigatingDriver {
            async fn goto(
                &mut self,
                url: &str,
                wait_until: LoadState,
                timeout: Duration,
            ) -> ProbeResult<()> {
                self.inner.goto(url, wait_until, timeout).await
            }

            async fn reload(&mut self, timeout: Duration) -> ProbeResult<()> {
                self.inner.reload(timeout).await
            }

            async fn current_url(&self) -> ProbeResult<String> {
                self.inner.current_url().await
            }

            async fn title(&self) -> ProbeResult<String> {
                self.inner.title().await
            }

            async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
                let left = self.failures_left.load(Ordering::SeqCst);
                if left > 0 {
                    self.failures_left.store(left - 1, Ordering::SeqCst);
                    return Err(ProbeError::PageError {
                        message: "Execution context was destroyed".to_string(),
                    });
                }
                self.inner.query_all(selector).await
            }

            async fn fill(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
                self.inner.fill(selector, value).await
            }

            async fn type_text(&mut self, selector: &Selector, text: &str) -> ProbeResult<()> {
                self.inner.type_text(selector, text).await
            }

            async fn select_option(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
                self.inner.select_option(selector, value).await
            }

            async fn click(&mut self, selector: &Selector) -> ProbeResult<()> {
                self.inner.click(selector).await
            }

            async fn focus(&mut self, selector: &Selector) -> ProbeResult<()> {
                self.inner.focus(selector).await
            }

            async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
                self.inner.screenshot().await
            }

            async fn close(&mut self) -> ProbeResult<()> {
                self.inner.close().await
            }
        }

        async fn navigated(failures: u32) -> BasePage {
            let mut driver = NavigatingDriver::failing(0);
            driver
                .goto(
                    "https://www.facebook.com/r.php?entry_point=login",
                    LoadState::Load,
                    Duration::from_millis(100),
                )
                .await
                .unwrap();
            driver.failures_left.store(failures, Ordering::SeqCst);
            let mut settings = fast_settings();
            settings.timeouts.action_ms = 2_000;
            BasePage::new(Box::new(driver), settings)
        }

        #[tokio::test]
        async fn test_wait_for_visible_survives_destroyed_context() {
            let mut page = navigated(1).await;
            page.wait_for_visible(&first_name(), 2_000).await.unwrap();
        }

        #[tokio::test]
        async fn test_wait_for_visible_still_times_out() {
            let mut page = navigated(1).await;
            let err = page
                .wait_for_visible(&Selector::css("[role=\"alert\"]"), 100)
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }

        #[tokio::test]
        async fn test_actions_retry_after_page_error() {
            let mut page = navigated(2).await;
            page.fill_field(&first_name(), "John").await.unwrap();
            assert_eq!(page.input_value(&first_name()).await.unwrap(), "John");
        }

        #[tokio::test]
        async fn test_strict_mode_violation_is_not_retried() {
            let mut page = navigated(1).await;
            // Visible wait accepts any visible match
            page.wait_for_visible(&Selector::css("input[name=\"sex\"]"), 2_000)
                .await
                .unwrap();
            let err = page
                .click(&Selector::css("input[name=\"sex\"]"))
                .await
                .unwrap_err();
            assert!(!err.is_timeout());
            assert!(err.to_string().contains("strict mode violation"));
        }
    }
}
