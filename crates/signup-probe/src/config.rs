//! Suite configuration.
//!
//! Values come from three layers: built-in defaults, an optional YAML file,
//! and command-line overrides applied by the caller. Under a CI environment
//! (`CI` set) the suite runs on one worker and refuses `only`-marked cases.

use crate::browser::BrowserProfile;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default application under test
pub const DEFAULT_BASE_URL: &str = "https://www.facebook.com";

/// Path of the signup entry point, relative to the base URL
pub const DEFAULT_SIGNUP_PATH: &str = "/r.php?entry_point=login";

/// Timeouts in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Whole test, all hooks included
    pub test_ms: u64,
    /// Each navigation
    pub navigation_ms: u64,
    /// Each element action (fill, click, select, ...)
    pub action_ms: u64,
    /// Default for expectation waits such as the error-message wait
    pub expect_ms: u64,
    /// Fixture wait for the signup heading, then again for the fallback field
    pub heading_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            test_ms: 120_000,
            navigation_ms: 60_000,
            action_ms: 15_000,
            expect_ms: 5_000,
            heading_ms: 15_000,
        }
    }
}

/// When an artifact is recorded and when it is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMode {
    /// Never record
    Off,
    /// Record and keep for every attempt
    On,
    /// Record every attempt, keep only failed ones
    OnlyOnFailure,
    /// Same as `OnlyOnFailure`, for continuously recorded artifacts
    RetainOnFailure,
    /// Record and keep the first retry only
    OnFirstRetry,
}

impl CaptureMode {
    /// Whether attempt `attempt` (0-based) should record this artifact
    #[must_use]
    pub const fn records(self, attempt: u32) -> bool {
        match self {
            Self::Off => false,
            Self::On | Self::OnlyOnFailure | Self::RetainOnFailure => true,
            Self::OnFirstRetry => attempt == 1,
        }
    }

    /// Whether a recorded artifact is written out
    #[must_use]
    pub const fn keeps(self, attempt: u32, failed: bool) -> bool {
        match self {
            Self::Off => false,
            Self::On => true,
            Self::OnlyOnFailure | Self::RetainOnFailure => failed,
            Self::OnFirstRetry => attempt == 1,
        }
    }
}

/// Artifact policy for failed attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactPolicy {
    /// Action trace (`trace.json`)
    pub trace: CaptureMode,
    /// Final screenshot (`screenshot.png`)
    pub screenshot: CaptureMode,
    /// Per-action frames (`filmstrip/`)
    pub filmstrip: CaptureMode,
}

impl Default for ArtifactPolicy {
    fn default() -> Self {
        Self {
            trace: CaptureMode::OnFirstRetry,
            screenshot: CaptureMode::OnlyOnFailure,
            filmstrip: CaptureMode::RetainOnFailure,
        }
    }
}

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReporterKind {
    /// `index.html` bundle in the output directory
    Html,
    /// Live console list
    List,
    /// `results.json` in the output directory
    Json,
}

impl fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html => "html",
            Self::List => "list",
            Self::Json => "json",
        })
    }
}

impl FromStr for ReporterKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "list" => Ok(Self::List),
            "json" => Ok(Self::Json),
            other => Err(ProbeError::ConfigError {
                message: format!("unknown reporter '{other}' (expected html, list or json)"),
            }),
        }
    }
}

/// What a page object needs to know about the application under test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    /// Base URL
    pub base_url: String,
    /// Signup entry point path
    pub signup_path: String,
    /// Timeouts
    pub timeouts: Timeouts,
}

impl Default for PageSettings {
    fn default() -> Self {
        SuiteConfig::default().page_settings()
    }
}

impl PageSettings {
    /// Absolute signup URL
    #[must_use]
    pub fn signup_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.signup_path
        )
    }
}

/// Full suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Application base URL
    pub base_url: String,
    /// Signup entry point path
    pub signup_path: String,
    /// Timeouts
    pub timeouts: Timeouts,
    /// Extra attempts after a failure
    pub retries: u32,
    /// Concurrent tests
    pub workers: usize,
    /// Run browsers headless
    pub headless: bool,
    /// Report and artifact directory
    pub output_dir: PathBuf,
    /// Report formats
    pub reporters: Vec<ReporterKind>,
    /// Artifact capture policy
    pub artifacts: ArtifactPolicy,
    /// Browser projects
    pub projects: Vec<BrowserProfile>,
    /// Fail the run when a case is marked `only`
    pub forbid_only: bool,
    /// Substring filter over test id and title
    pub grep: Option<String>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            signup_path: DEFAULT_SIGNUP_PATH.to_string(),
            timeouts: Timeouts::default(),
            retries: 1,
            workers: 4,
            headless: false,
            output_dir: PathBuf::from("test-results"),
            reporters: vec![ReporterKind::Html, ReporterKind::List, ReporterKind::Json],
            artifacts: ArtifactPolicy::default(),
            projects: vec![BrowserProfile::chromium(), BrowserProfile::edge()],
            forbid_only: false,
            grep: None,
        }
    }
}

/// Whether the process runs under continuous integration
#[must_use]
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok_and(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
}

impl SuiteConfig {
    /// Defaults adjusted for the current environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_ci(is_ci())
    }

    /// Apply CI adjustments (one worker, `forbid_only`)
    #[must_use]
    pub fn with_ci(mut self, ci: bool) -> Self {
        if ci {
            self.workers = 1;
            self.forbid_only = true;
        }
        self
    }

    /// Parse YAML, filling unspecified fields from the defaults
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file; under CI, keys the file leaves unset get CI values
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ProbeError::ConfigError {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        let config = Self::from_yaml_with_ci(&yaml, is_ci())?;
        tracing::debug!(path = %path.display(), workers = config.workers, "loaded suite config");
        Ok(config)
    }

    /// Parse YAML and apply CI adjustments to the top-level keys it does not set
    pub fn from_yaml_with_ci(yaml: &str, ci: bool) -> ProbeResult<Self> {
        let mut config = Self::from_yaml(yaml)?;
        if ci {
            let keys: serde_yaml_ng::Value = serde_yaml_ng::from_str(yaml)?;
            if keys.get("workers").is_none() {
                config.workers = 1;
            }
            if keys.get("forbid_only").is_none() {
                config.forbid_only = true;
            }
        }
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject values the runner cannot work with
    pub fn validate(&self) -> ProbeResult<()> {
        let fail = |message: String| Err(ProbeError::ConfigError { message });
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return fail(format!("base_url must be http(s): {}", self.base_url));
        }
        if self.workers == 0 {
            return fail("workers must be at least 1".to_string());
        }
        let t = &self.timeouts;
        if [t.test_ms, t.navigation_ms, t.action_ms, t.expect_ms, t.heading_ms].contains(&0) {
            return fail("timeouts must be positive".to_string());
        }
        if self.projects.is_empty() {
            return fail("at least one project is required".to_string());
        }
        let mut seen = HashSet::new();
        for project in &self.projects {
            if !seen.insert(project.name.as_str()) {
                return fail(format!("duplicate project '{}'", project.name));
            }
        }
        Ok(())
    }

    /// Settings handed to page objects
    #[must_use]
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            base_url: self.base_url.clone(),
            signup_path: self.signup_path.clone(),
            timeouts: self.timeouts,
        }
    }

    /// Projects to run: all when `names` is empty, else the named ones
    pub fn select_projects(&self, names: &[String]) -> ProbeResult<Vec<BrowserProfile>> {
        if names.is_empty() {
            return Ok(self.projects.clone());
        }
        names
            .iter()
            .map(|name| {
                self.projects
                    .iter()
                    .find(|p| &p.name == name)
                    .cloned()
                    .ok_or_else(|| ProbeError::ConfigError {
                        message: format!("unknown project '{name}'"),
                    })
            })
            .collect()
    }

    /// Set headless on every project
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        for project in &mut self.projects {
            project.headless = headless;
        }
        self
    }
}
