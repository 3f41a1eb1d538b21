//! Wait mechanisms for synchronizing with the remote page.
//!
//! Navigation waits on a [`LoadState`]; element waits poll a condition until it
//! holds or a deadline passes. Every wait carries an explicit timeout and
//! surfaces [`ProbeError::Timeout`] when it elapses.

use crate::locator::DEFAULT_POLL_INTERVAL_MS;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Quiet window used to approximate network idle (500ms)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for the network to be quiet
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// `document.readyState` values that satisfy this state
    #[must_use]
    pub const fn ready_states(&self) -> &'static [&'static str] {
        match self {
            Self::DomContentLoaded => &["interactive", "complete"],
            Self::Load | Self::NetworkIdle => &["complete"],
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// Element states an element wait can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementState {
    /// At least one match exists in the DOM
    Attached,
    /// No match exists in the DOM
    Detached,
    /// At least one match is visible
    Visible,
    /// No match is visible (or none exists)
    Hidden,
    /// At least one match is visible and enabled
    Enabled,
}

impl ElementState {
    /// Human-readable description for error messages
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Attached => "attached",
            Self::Detached => "detached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Enabled => "enabled",
        }
    }
}

/// Options for polling waits
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create wait options with the given timeout
    #[must_use]
    pub const fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn poll_every(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Poll `check` until it yields `Some`, or fail with a timeout naming `what`.
///
/// The condition is evaluated at least once, even with a zero timeout. Errors
/// returned by `check` abort the wait immediately.
pub async fn poll_until<T, F, Fut>(
    options: WaitOptions,
    what: impl Into<String>,
    mut check: F,
) -> ProbeResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let deadline = Instant::now() + options.timeout();
    loop {
        if let Some(value) = check().await? {
            return Ok(value);
        }
        let now = Instant::now();
        if now >= deadline {
            return Err(ProbeError::timeout(options.timeout_ms, what));
        }
        let remaining = deadline - now;
        tokio::time::sleep(options.poll_interval().min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_load_state_ready_states() {
        assert_eq!(LoadState::DomContentLoaded.ready_states().len(), 2);
        assert_eq!(LoadState::Load.ready_states(), &["complete"]);
        assert_eq!(LoadState::NetworkIdle.to_string(), "networkidle");
    }

    #[test]
    fn test_load_state_serde() {
        let state: LoadState = serde_json::from_str("\"domcontentloaded\"").unwrap();
        assert_eq!(state, LoadState::DomContentLoaded);
    }

    #[tokio::test]
    async fn test_poll_until_succeeds_after_retries() {
        let calls = AtomicU32::new(0);
        let value = poll_until(WaitOptions::with_timeout(1_000).poll_every(5), "counter", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok((n >= 3).then_some(n)) }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn test_poll_until_times_out() {
        let err = poll_until(WaitOptions::with_timeout(30).poll_every(5), "nothing", || async {
            Ok::<Option<()>, ProbeError>(None)
        })
        .await
        .unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("nothing"));
    }

    #[tokio::test]
    async fn test_poll_until_checks_once_with_zero_timeout() {
        let value = poll_until(WaitOptions::with_timeout(0), "immediate", || async {
            Ok(Some(7))
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_poll_until_propagates_errors() {
        let err = poll_until(WaitOptions::with_timeout(1_000), "broken", || async {
            Err::<Option<()>, _>(ProbeError::assertion("boom"))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ProbeError::AssertionFailed { .. }));
    }
}
