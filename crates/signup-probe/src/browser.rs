//! Browser control for the signup suite.
//!
//! A [`BrowserProfile`] describes one browser project (channel, launch
//! arguments, user agent, viewport). When compiled with the `browser` feature,
//! [`Browser`] launches it through chromiumoxide and hands out
//! [`ChromiumDriver`] pages over the Chrome `DevTools` Protocol. Without the
//! feature, launching fails with a clear message and only the mock driver is
//! available.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Launch arguments shared by every profile
pub const COMMON_ARGS: [&str; 3] = [
    "--disable-blink-features=AutomationControlled",
    "--disable-features=TranslateUI",
    "--disable-sync",
];

/// Desktop Chrome 120 user agent presented by both profiles
pub const DESKTOP_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Browser project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserProfile {
    /// Project name (`chromium`, `edge`)
    pub name: String,
    /// Release channel (`chrome`, `msedge`)
    pub channel: String,
    /// Extra launch arguments
    pub args: Vec<String>,
    /// User agent override
    pub user_agent: Option<String>,
    /// Run without a visible window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to the browser binary (None = resolve from channel)
    pub executable: Option<PathBuf>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::chromium()
    }
}

impl BrowserProfile {
    /// Desktop Chrome profile
    #[must_use]
    pub fn chromium() -> Self {
        Self {
            name: "chromium".to_string(),
            channel: "chrome".to_string(),
            args: COMMON_ARGS.iter().map(|a| (*a).to_string()).collect(),
            user_agent: Some(DESKTOP_CHROME_UA.to_string()),
            headless: false,
            viewport_width: 1280,
            viewport_height: 720,
            executable: None,
            sandbox: true,
        }
    }

    /// Desktop Edge profile
    #[must_use]
    pub fn edge() -> Self {
        let mut profile = Self::chromium();
        profile.name = "edge".to_string();
        profile.channel = "msedge".to_string();
        profile
            .args
            .extend(["--no-first-run", "--no-default-browser-check"].map(String::from));
        profile
    }

    /// Look up a built-in profile by project name
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "chromium" | "chrome" => Some(Self::chromium()),
            "edge" | "msedge" => Some(Self::edge()),
            _ => None,
        }
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set the browser binary
    #[must_use]
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Browser binary to launch: explicit path, else the channel's binary on `PATH`
    #[must_use]
    pub fn resolve_executable(&self) -> Option<PathBuf> {
        if self.executable.is_some() {
            return self.executable.clone();
        }
        let candidates: &[&str] = match self.channel.as_str() {
            "msedge" => &["microsoft-edge-stable", "microsoft-edge", "msedge"],
            "chrome" => &["google-chrome-stable", "google-chrome"],
            _ => &[],
        };
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .flat_map(|dir| candidates.iter().map(move |c| dir.join(c)))
            .find(|p| p.is_file())
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(
    clippy::significant_drop_tightening,
    clippy::missing_errors_doc,
    clippy::items_after_statements
)]
mod cdp {
    use super::BrowserProfile;
    use crate::driver::{ElementSnapshot, PageDriver, PageFactory};
    use crate::locator::{js_string, Selector};
    use crate::result::{ProbeError, ProbeResult};
    use crate::wait::{poll_until, LoadState, WaitOptions, NETWORK_IDLE_THRESHOLD_MS};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use serde::Deserialize;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::time::Instant;

    fn page_error(e: impl std::fmt::Display) -> ProbeError {
        ProbeError::PageError {
            message: e.to_string(),
        }
    }

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        profile: BrowserProfile,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a browser for `profile`
        pub async fn launch(profile: BrowserProfile) -> ProbeResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(profile.viewport_width, profile.viewport_height)
                .args(profile.args.iter().cloned());

            if !profile.headless {
                builder = builder.with_head();
            }

            if !profile.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(path) = profile.resolve_executable() {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunchError {
                    message: format!("{} ({}): {e}", profile.name, profile.channel),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            tracing::info!(project = %profile.name, channel = %profile.channel, headless = profile.headless, "browser launched");

            Ok(Self {
                profile,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Get the profile this browser was launched with
        #[must_use]
        pub const fn profile(&self) -> &BrowserProfile {
            &self.profile
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            let mut browser = self.inner.lock().await;
            browser
                .close()
                .await
                .map_err(|e| ProbeError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            let _ = browser.wait().await;
            self.handle.abort();
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for Browser {
        async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
            let browser = self.inner.lock().await;
            let page = browser.new_page("about:blank").await.map_err(page_error)?;
            if let Some(ua) = &self.profile.user_agent {
                let _ = page.set_user_agent(ua.as_str()).await.map_err(page_error)?;
            }
            Ok(Box::new(ChromiumDriver { page, closed: false }))
        }
    }

    #[derive(Debug, Deserialize)]
    struct ActionOutcome {
        ok: bool,
        error: Option<String>,
    }

    /// One browser page driven over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        page: CdpPage,
        closed: bool,
    }

    impl ChromiumDriver {
        /// Evaluate `script` (which must produce a JSON string) and decode it
        async fn eval_json<T: DeserializeOwned>(&self, script: &str) -> ProbeResult<T> {
            let params = EvaluateParams::builder()
                .expression(script)
                .await_promise(true)
                .return_by_value(true)
                .build()
                .map_err(page_error)?;
            let raw: String = self
                .page
                .evaluate_expression(params)
                .await
                .map_err(page_error)?
                .into_value()
                .map_err(page_error)?;
            Ok(serde_json::from_str(&raw)?)
        }

        /// Run `body` against the single element matched by `selector`.
        ///
        /// `body` sees the element as `el` and may `return fail('reason')`.
        async fn act(&self, selector: &Selector, body: &str) -> ProbeResult<()> {
            let script = format!(
                "(() => {{ \
                    const fail = error => JSON.stringify({{ ok: false, error }}); \
                    const els = {query}; \
                    if (els.length === 0) return fail('no element matches'); \
                    if (els.length > 1) return fail(`strict mode violation: ${{els.length}} elements match`); \
                    const el = els[0]; \
                    if (el.disabled) return fail('element is disabled'); \
                    {body} \
                    return JSON.stringify({{ ok: true }}); \
                }})()",
                query = selector.to_query(),
            );
            let outcome: ActionOutcome = self.eval_json(&script).await?;
            if outcome.ok {
                Ok(())
            } else {
                Err(ProbeError::element(
                    selector,
                    outcome.error.unwrap_or_else(|| "action failed".to_string()),
                ))
            }
        }

        async fn ready_state(&self) -> ProbeResult<String> {
            self.eval_json("JSON.stringify(document.readyState)").await
        }

        async fn resource_count(&self) -> ProbeResult<usize> {
            self.eval_json("JSON.stringify(performance.getEntriesByType('resource').length)")
                .await
        }

        async fn wait_for_load_state(&self, state: LoadState, deadline: Instant) -> ProbeResult<()> {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let options = WaitOptions::with_timeout(remaining.as_millis() as u64);
            poll_until(options, format!("load state {state}"), || async {
                let ready = self.ready_state().await?;
                Ok(state.ready_states().contains(&ready.as_str()).then_some(()))
            })
            .await?;

            if state == LoadState::NetworkIdle {
                let quiet = Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS);
                let mut last = self.resource_count().await?;
                let mut quiet_since = Instant::now();
                loop {
                    let now = Instant::now();
                    if now.duration_since(quiet_since) >= quiet {
                        break;
                    }
                    if now >= deadline {
                        return Err(ProbeError::timeout(
                            options.timeout_ms,
                            "network to become idle",
                        ));
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    let count = self.resource_count().await?;
                    if count != last {
                        last = count;
                        quiet_since = Instant::now();
                    }
                }
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn goto(
            &mut self,
            url: &str,
            wait_until: LoadState,
            timeout: Duration,
        ) -> ProbeResult<()> {
            let deadline = Instant::now() + timeout;
            match tokio::time::timeout_at(deadline, self.page.goto(url)).await {
                Err(_) => {
                    return Err(ProbeError::timeout(
                        timeout.as_millis() as u64,
                        format!("navigation to {url}"),
                    ))
                }
                Ok(Err(e)) => {
                    return Err(ProbeError::NavigationError {
                        url: url.to_string(),
                        message: e.to_string(),
                    })
                }
                Ok(Ok(_)) => {}
            }
            self.wait_for_load_state(wait_until, deadline).await
        }

        async fn reload(&mut self, timeout: Duration) -> ProbeResult<()> {
            let deadline = Instant::now() + timeout;
            let url = self.current_url().await?;
            match tokio::time::timeout_at(deadline, self.page.reload()).await {
                Err(_) => Err(ProbeError::timeout(timeout.as_millis() as u64, "reload")),
                Ok(Err(e)) => Err(ProbeError::NavigationError {
                    url,
                    message: e.to_string(),
                }),
                Ok(Ok(_)) => self.wait_for_load_state(LoadState::Load, deadline).await,
            }
        }

        async fn current_url(&self) -> ProbeResult<String> {
            Ok(self
                .page
                .url()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn title(&self) -> ProbeResult<String> {
            Ok(self
                .page
                .get_title()
                .await
                .map_err(page_error)?
                .unwrap_or_default())
        }

        async fn query_all(&self, selector: &Selector) -> ProbeResult<Vec<ElementSnapshot>> {
            let script = format!(
                "JSON.stringify({query}.map(el => {{ \
                    const r = el.getBoundingClientRect(); \
                    const s = window.getComputedStyle(el); \
                    const attributes = {{}}; \
                    for (const a of el.attributes) attributes[a.name] = a.value; \
                    return {{ \
                        tag: el.tagName.toLowerCase(), \
                        text: el.textContent || '', \
                        value: typeof el.value === 'string' ? el.value : null, \
                        visible: r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none', \
                        enabled: !el.disabled, \
                        checked: !!el.checked, \
                        attributes \
                    }}; \
                }}))",
                query = selector.to_query(),
            );
            self.eval_json(&script).await
        }

        async fn fill(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
            let body = format!(
                "if (!(el instanceof HTMLInputElement || el instanceof HTMLTextAreaElement)) \
                     return fail('element is not an input'); \
                 el.focus(); \
                 Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set.call(el, {}); \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                js_string(value)
            );
            self.act(selector, &body).await
        }

        async fn type_text(&mut self, selector: &Selector, text: &str) -> ProbeResult<()> {
            self.act(selector, "el.focus();").await?;
            let _ = self
                .page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(|e| ProbeError::element(selector, e.to_string()))?;
            Ok(())
        }

        async fn select_option(&mut self, selector: &Selector, value: &str) -> ProbeResult<()> {
            let body = format!(
                "if (!(el instanceof HTMLSelectElement)) return fail('element is not a <select>'); \
                 const wanted = {}; \
                 const option = Array.from(el.options).find(o => o.value === wanted || o.label.trim() === wanted); \
                 if (!option) return fail(`no option \"${{wanted}}\"`); \
                 el.value = option.value; \
                 el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
                js_string(value)
            );
            self.act(selector, &body).await
        }

        async fn click(&mut self, selector: &Selector) -> ProbeResult<()> {
            self.act(
                selector,
                "el.scrollIntoView({ block: 'center' }); el.focus(); el.click();",
            )
            .await
        }

        async fn focus(&mut self, selector: &Selector) -> ProbeResult<()> {
            self.act(selector, "el.focus();").await
        }

        async fn screenshot(&self) -> ProbeResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| ProbeError::ScreenshotError {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| ProbeError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn close(&mut self) -> ProbeResult<()> {
            if self.closed {
                return Ok(());
            }
            self.closed = true;
            self.page.clone().close().await.map_err(page_error)
        }
    }
}

// ============================================================================
// Fallback (when `browser` feature is NOT enabled)
// ============================================================================

#[cfg(not(feature = "browser"))]
mod unavailable {
    use super::BrowserProfile;
    use crate::driver::{PageDriver, PageFactory};
    use crate::result::{ProbeError, ProbeResult};
    use async_trait::async_trait;

    fn not_compiled(profile: &BrowserProfile) -> ProbeError {
        ProbeError::BrowserLaunchError {
            message: format!(
                "cannot launch {}: built without the 'browser' feature (use --dry-run for the mock page)",
                profile.name
            ),
        }
    }

    /// Browser handle (launch always fails without the `browser` feature)
    #[derive(Debug)]
    pub struct Browser {
        profile: BrowserProfile,
    }

    impl Browser {
        /// Launch a browser (always fails in this build)
        pub async fn launch(profile: BrowserProfile) -> ProbeResult<Self> {
            Err(not_compiled(&profile))
        }

        /// Get the profile this browser was launched with
        #[must_use]
        pub const fn profile(&self) -> &BrowserProfile {
            &self.profile
        }

        /// Close the browser
        pub async fn close(self) -> ProbeResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for Browser {
        async fn new_page(&self) -> ProbeResult<Box<dyn PageDriver>> {
            Err(not_compiled(&self.profile))
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, ChromiumDriver};

#[cfg(not(feature = "browser"))]
pub use unavailable::Browser;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromium_profile() {
        let profile = BrowserProfile::chromium();
        assert_eq!(profile.channel, "chrome");
        assert_eq!(profile.args.len(), 3);
        assert!(profile
            .args
            .contains(&"--disable-blink-features=AutomationControlled".to_string()));
        assert!(profile.user_agent.as_deref().unwrap().contains("Chrome/120"));
        assert!(!profile.headless);
    }

    #[test]
    fn test_edge_profile_extends_chromium_args() {
        let profile = BrowserProfile::edge();
        assert_eq!(profile.channel, "msedge");
        assert_eq!(&profile.args[..3], &BrowserProfile::chromium().args[..]);
        assert!(profile.args.contains(&"--no-first-run".to_string()));
        assert!(profile
            .args
            .contains(&"--no-default-browser-check".to_string()));
        assert_eq!(profile.user_agent, BrowserProfile::chromium().user_agent);
    }

    #[test]
    fn test_named_profiles() {
        assert_eq!(BrowserProfile::named("edge").unwrap().name, "edge");
        assert_eq!(BrowserProfile::named("chromium").unwrap().name, "chromium");
        assert!(BrowserProfile::named("firefox").is_none());
    }

    #[test]
    fn test_explicit_executable_wins() {
        let profile = BrowserProfile::edge().with_executable("/opt/edge/msedge");
        assert_eq!(
            profile.resolve_executable(),
            Some(PathBuf::from("/opt/edge/msedge"))
        );
    }

    #[test]
    fn test_profile_yaml_defaults() {
        let profile: BrowserProfile =
            serde_yaml_ng::from_str("name: chromium\nheadless: true\n").unwrap();
        assert!(profile.headless);
        assert_eq!(profile.viewport_width, 1280);
        assert_eq!(profile.channel, "chrome");
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_launch_without_feature_fails() {
        let err = Browser::launch(BrowserProfile::chromium()).await.unwrap_err();
        assert!(err.to_string().contains("browser"));
    }
}
