//! Test reporting.
//!
//! Collects one [`TestResultEntry`] per case and project and renders the
//! three report formats: an HTML bundle (`index.html` linking the attempt
//! artifacts), a console list and a JSON document (`results.json`).

use crate::config::ReporterKind;
use crate::result::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// HTML report file name inside the output directory
pub const HTML_REPORT: &str = "index.html";

/// JSON report file name inside the output directory
pub const JSON_REPORT: &str = "results.json";

/// Final status of a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    /// Passed on the first attempt
    Passed,
    /// Failed on every attempt
    Failed,
    /// Failed, then passed on a retry
    Flaky,
}

impl TestStatus {
    /// Check if status counts as passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed | Self::Flaky)
    }

    /// Check if status is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed => "fail",
            Self::Flaky => "flaky",
        }
    }

    const fn symbol(self) -> &'static str {
        match self {
            Self::Passed => "ok",
            Self::Failed => "x",
            Self::Flaky => "~",
        }
    }
}

/// Kind of artifact attached to an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Screenshot,
    Trace,
    Filmstrip,
}

/// Artifact written for an attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Path relative to the output directory
    pub path: PathBuf,
}

/// One execution of a test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 0 for the first run, 1 for the first retry
    pub attempt: u32,
    pub passed: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub attachments: Vec<Attachment>,
}

/// Result of one test case in one project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResultEntry {
    /// Stable case id (e.g. `TC_FN_001`)
    pub id: String,
    pub title: String,
    /// Describe-block style group
    pub group: String,
    /// Browser project name
    pub project: String,
    pub status: TestStatus,
    /// Duration summed over all attempts
    pub duration_ms: u64,
    /// Error of the last failed attempt
    pub error: Option<String>,
    pub attempts: Vec<AttemptRecord>,
}

impl TestResultEntry {
    /// Derive the final status from the attempts in execution order
    #[must_use]
    pub fn from_attempts(
        id: impl Into<String>,
        title: impl Into<String>,
        group: impl Into<String>,
        project: impl Into<String>,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let last_passed = attempts.last().is_some_and(|a| a.passed);
        let status = match (last_passed, attempts.len()) {
            (true, 1) => TestStatus::Passed,
            (true, _) => TestStatus::Flaky,
            (false, _) => TestStatus::Failed,
        };
        let error = attempts.iter().rev().find_map(|a| a.error.clone());
        Self {
            id: id.into(),
            title: title.into(),
            group: group.into(),
            project: project.into(),
            status,
            duration_ms: attempts.iter().map(|a| a.duration_ms).sum(),
            error,
            attempts,
        }
    }

    /// Retries used
    #[must_use]
    pub fn retries(&self) -> usize {
        self.attempts.len().saturating_sub(1)
    }

    /// Every artifact over all attempts
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.attempts.iter().flat_map(|a| a.attachments.iter())
    }

    /// `[project] group › title`
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("[{}] {} › {}", self.project, self.group, self.title)
    }
}

/// Counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub flaky: usize,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    suite: &'a str,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    stats: RunStats,
    results: &'a [TestResultEntry],
}

/// Collected results of one run
#[derive(Debug, Clone)]
pub struct Reporter {
    suite_name: String,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    results: Vec<TestResultEntry>,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new("signup-probe")
    }
}

impl Reporter {
    /// Create an empty reporter; the run starts now
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
            started_at: Utc::now(),
            duration_ms: 0,
            results: Vec::new(),
        }
    }

    /// Record a case result
    pub fn record(&mut self, result: TestResultEntry) {
        self.results.push(result);
    }

    /// Set the wall-clock duration of the run
    pub fn finish(&mut self, duration_ms: u64) {
        self.duration_ms = duration_ms;
    }

    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    #[must_use]
    pub fn results(&self) -> &[TestResultEntry] {
        &self.results
    }

    /// Failed results
    #[must_use]
    pub fn failures(&self) -> Vec<&TestResultEntry> {
        self.results
            .iter()
            .filter(|r| r.status.is_failed())
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> RunStats {
        let count = |status: TestStatus| self.results.iter().filter(|r| r.status == status).count();
        RunStats {
            total: self.results.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            flaky: count(TestStatus::Flaky),
        }
    }

    /// True when nothing failed; flaky results count as passing
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.status.is_passed())
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        let s = self.stats();
        format!(
            "{}: {} passed, {} failed, {} flaky ({} total) in {:.1}s",
            self.suite_name,
            s.passed,
            s.failed,
            s.flaky,
            s.total,
            self.duration_ms as f64 / 1000.0
        )
    }

    /// Render the console list report
    #[must_use]
    pub fn render_list(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            let _ = writeln!(
                out,
                "  {:>2} {} ({}ms){}",
                result.status.symbol(),
                result.display_name(),
                result.duration_ms,
                if result.retries() > 0 {
                    format!(" [retries: {}]", result.retries())
                } else {
                    String::new()
                }
            );
        }
        for failure in self.failures() {
            let _ = writeln!(out, "\n  {}", failure.display_name());
            if let Some(error) = &failure.error {
                for line in error.lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
        }
        let _ = writeln!(out, "\n  {}", self.summary());
        out
    }

    /// Render the JSON report
    pub fn render_json(&self) -> ProbeResult<String> {
        let report = JsonReport {
            suite: &self.suite_name,
            started_at: self.started_at,
            duration_ms: self.duration_ms,
            stats: self.stats(),
            results: &self.results,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Render the HTML report
    #[must_use]
    pub fn render_html(&self) -> String {
        let stats = self.stats();
        let mut html = String::new();

        html.push_str(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Signup Probe Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.flaky { background: #fff3e0; border-left: 4px solid #ff9800; }
        .error { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .attempt { margin-left: 20px; font-size: 0.9em; }
    </style>
</head>
<body>
"#,
        );

        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{}</h1>
    <h2>{} passed, {} failed, {} flaky of {}</h2>
    <p>Started {} | Duration: {:.2}s</p>
</div>
"#,
            escape_html(&self.suite_name),
            stats.passed,
            stats.failed,
            stats.flaky,
            stats.total,
            self.started_at.to_rfc3339(),
            self.duration_ms as f64 / 1000.0
        );

        for result in &self.results {
            let _ = writeln!(
                html,
                r#"<div class="test {}">
    <strong>{}</strong> <code>{}</code> - {:?} ({}ms)"#,
                result.status.css_class(),
                escape_html(&result.display_name()),
                escape_html(&result.id),
                result.status,
                result.duration_ms
            );
            if let Some(error) = &result.error {
                let _ = writeln!(html, r#"    <div class="error">{}</div>"#, escape_html(error));
            }
            for attempt in result.attempts.iter().filter(|a| !a.attachments.is_empty()) {
                let _ = write!(html, r#"    <div class="attempt">attempt {}:"#, attempt.attempt);
                for attachment in &attempt.attachments {
                    let href = attachment.path.to_string_lossy().replace('\\', "/");
                    let _ = write!(
                        html,
                        r#" <a href="{}">{:?}</a>"#,
                        escape_html(&href),
                        attachment.kind
                    );
                }
                html.push_str("</div>\n");
            }
            html.push_str("</div>\n");
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    /// Write the file-based reports among `kinds` into `output_dir`
    ///
    /// The list report has no file and is left to the caller.
    pub fn write_reports(
        &self,
        kinds: &[ReporterKind],
        output_dir: &Path,
    ) -> ProbeResult<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)?;
        let mut written = Vec::new();
        for kind in kinds {
            let (name, body) = match kind {
                ReporterKind::Html => (HTML_REPORT, self.render_html()),
                ReporterKind::Json => (JSON_REPORT, self.render_json()?),
                ReporterKind::List => continue,
            };
            let path = output_dir.join(name);
            std::fs::write(&path, body)?;
            tracing::info!(path = %path.display(), reporter = %kind, "report written");
            written.push(path);
        }
        Ok(written)
    }
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn attempt(n: u32, passed: bool) -> AttemptRecord {
        AttemptRecord {
            attempt: n,
            passed,
            duration_ms: 10,
            error: (!passed).then(|| format!("boom on attempt {n}")),
            attachments: Vec::new(),
        }
    }

    fn entry(id: &str, attempts: Vec<AttemptRecord>) -> TestResultEntry {
        TestResultEntry::from_attempts(id, "should accept <value>", "First Name", "chromium", attempts)
    }

    mod status_tests {
        use super::*;

        #[test]
        fn test_passed_first_time() {
            let e = entry("TC_1", vec![attempt(0, true)]);
            assert_eq!(e.status, TestStatus::Passed);
            assert_eq!(e.retries(), 0);
            assert!(e.error.is_none());
        }

        #[test]
        fn test_fail_then_pass_is_flaky() {
            let e = entry("TC_1", vec![attempt(0, false), attempt(1, true)]);
            assert_eq!(e.status, TestStatus::Flaky);
            assert!(e.status.is_passed());
            assert_eq!(e.duration_ms, 20);
            assert_eq!(e.error.as_deref(), Some("boom on attempt 0"));
        }

        #[test]
        fn test_failed_keeps_last_error() {
            let e = entry("TC_1", vec![attempt(0, false), attempt(1, false)]);
            assert_eq!(e.status, TestStatus::Failed);
            assert_eq!(e.error.as_deref(), Some("boom on attempt 1"));
        }
    }

    mod reporter_tests {
        use super::*;

        fn sample() -> Reporter {
            let mut reporter = Reporter::new("signup");
            reporter.record(entry("TC_1", vec![attempt(0, true)]));
            reporter.record(entry("TC_2", vec![attempt(0, false), attempt(1, false)]));
            reporter.record(entry("TC_3", vec![attempt(0, false), attempt(1, true)]));
            reporter.finish(1_500);
            reporter
        }

        #[test]
        fn test_stats() {
            let stats = sample().stats();
            assert_eq!(
                stats,
                RunStats {
                    total: 3,
                    passed: 1,
                    failed: 1,
                    flaky: 1
                }
            );
            assert!(!sample().all_passed());
            assert_eq!(sample().failures().len(), 1);
        }

        #[test]
        fn test_empty_run_passes() {
            assert!(Reporter::default().all_passed());
        }

        #[test]
        fn test_list_report() {
            let list = sample().render_list();
            assert!(list.contains("[chromium] First Name › should accept <value>"));
            assert!(list.contains("[retries: 1]"));
            assert!(list.contains("boom on attempt 1"));
            assert!(list.contains("1 passed, 1 failed, 1 flaky (3 total) in 1.5s"));
        }

        #[test]
        fn test_html_escapes_titles() {
            let html = sample().render_html();
            assert!(html.contains("should accept &lt;value&gt;"));
            assert!(!html.contains("<value>"));
            assert!(html.contains(r#"class="test flaky""#));
        }

        #[test]
        fn test_html_links_attachments() {
            let mut reporter = Reporter::new("signup");
            let mut failed = attempt(0, false);
            failed.attachments.push(Attachment {
                kind: AttachmentKind::Screenshot,
                path: PathBuf::from("chromium/tc_1/attempt-0/screenshot.png"),
            });
            reporter.record(entry("TC_1", vec![failed]));
            let html = reporter.render_html();
            assert!(html.contains(r#"href="chromium/tc_1/attempt-0/screenshot.png""#));
        }

        #[test]
        fn test_json_report() {
            let json: serde_json::Value =
                serde_json::from_str(&sample().render_json().unwrap()).unwrap();
            assert_eq!(json["stats"]["flaky"], 1);
            assert_eq!(json["results"][2]["status"], "flaky");
            assert_eq!(json["results"][1]["attempts"].as_array().unwrap().len(), 2);
        }

        #[test]
        fn test_write_reports_skips_list() {
            let dir = TempDir::new().unwrap();
            let written = sample()
                .write_reports(
                    &[ReporterKind::Html, ReporterKind::List, ReporterKind::Json],
                    &dir.path().join("out"),
                )
                .unwrap();
            assert_eq!(written.len(), 2);
            assert!(dir.path().join("out").join(HTML_REPORT).exists());
            assert!(dir.path().join("out").join(JSON_REPORT).exists());
        }
    }
}
