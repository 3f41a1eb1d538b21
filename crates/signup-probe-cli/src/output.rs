//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use signup_probe::{Reporter, RunListener, TestCase, TestResultEntry, TestStatus};
use std::path::Path;

/// Live progress for a suite run
///
/// Implements [`RunListener`], so the runner drives it from worker tasks.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: ProgressBar,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Print every finished test, not only failures
    pub verbose: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool, verbose: bool) -> Self {
        let progress_bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=>-"),
            );
            pb
        };
        Self {
            term: Term::stderr(),
            progress_bar,
            use_color,
            quiet,
            verbose,
        }
    }

    fn status_prefix(&self, status: TestStatus) -> String {
        let (symbol, plain, style) = match status {
            TestStatus::Passed => ("✓", "PASS", Style::new().green().bold()),
            TestStatus::Failed => ("✗", "FAIL", Style::new().red().bold()),
            TestStatus::Flaky => ("~", "FLAKY", Style::new().yellow().bold()),
        };
        if self.use_color {
            style.apply_to(symbol).to_string()
        } else {
            plain.to_string()
        }
    }

    /// One line for a finished test
    #[must_use]
    pub fn result_line(&self, result: &TestResultEntry) -> String {
        let mut line = format!(
            "{} {} ({}ms)",
            self.status_prefix(result.status),
            result.display_name(),
            result.duration_ms
        );
        if result.retries() > 0 {
            line.push_str(&format!(" [retries: {}]", result.retries()));
        }
        line
    }

    /// Write a line above the progress bar
    fn line(&self, message: &str) {
        if self.progress_bar.is_hidden() {
            let _ = self.term.write_line(message);
        } else {
            self.progress_bar.println(message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print the paths of written reports
    pub fn reports_written(&self, paths: &[impl AsRef<Path>]) {
        for path in paths {
            self.info(&format!("report written to {}", path.as_ref().display()));
        }
    }

    /// Print the run summary
    pub fn summary(&self, reporter: &Reporter) {
        let stats = reporter.stats();
        if self.quiet && stats.failed == 0 {
            return;
        }

        let line = reporter.summary();
        let styled = if !self.use_color {
            line
        } else if stats.failed > 0 {
            Style::new().red().bold().apply_to(line).to_string()
        } else {
            Style::new().green().bold().apply_to(line).to_string()
        };
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }
}

impl RunListener for ProgressReporter {
    fn on_run_start(&self, total: usize, workers: usize) {
        self.progress_bar.set_length(total as u64);
        self.progress_bar
            .set_message(format!("running on {workers} worker(s)"));
    }

    fn on_attempt_start(&self, project: &str, case: &TestCase, attempt: u32) {
        if attempt > 1 && !self.quiet {
            let prefix = if self.use_color {
                style("↻").yellow().bold().to_string()
            } else {
                "RETRY".to_string()
            };
            self.line(&format!(
                "{prefix} [{project}] {} (attempt {attempt})",
                case.full_title()
            ));
        }
        self.progress_bar.set_message(case.id);
    }

    fn on_test_end(&self, result: &TestResultEntry) {
        self.progress_bar.inc(1);
        // Failures are printed even in quiet mode
        if result.status.is_failed() || (self.verbose && !self.quiet) {
            self.line(&self.result_line(result));
        }
    }

    fn on_run_end(&self, _reporter: &Reporter) {
        self.progress_bar.finish_and_clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use signup_probe::AttemptRecord;

    fn entry(passes: &[bool]) -> TestResultEntry {
        let attempts = passes
            .iter()
            .enumerate()
            .map(|(i, passed)| AttemptRecord {
                attempt: u32::try_from(i + 1).unwrap(),
                passed: *passed,
                duration_ms: 10,
                error: (!passed).then(|| "boom".to_string()),
                attachments: Vec::new(),
            })
            .collect();
        TestResultEntry::from_attempts(
            "TC_GN_001",
            "should select Female gender",
            "Gender Field Tests",
            "chromium",
            attempts,
        )
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_quiet_reporter_hides_bar() {
            let reporter = ProgressReporter::new(false, true, false);
            assert!(reporter.progress_bar.is_hidden());
        }

        #[test]
        fn test_plain_result_lines() {
            let reporter = ProgressReporter::new(false, true, false);
            let line = reporter.result_line(&entry(&[true]));
            assert!(line.starts_with("PASS "));
            assert!(line.contains("[chromium] Gender Field Tests › should select Female gender"));

            let line = reporter.result_line(&entry(&[false, true]));
            assert!(line.starts_with("FLAKY "));
            assert!(line.ends_with("[retries: 1]"));

            assert!(reporter.result_line(&entry(&[false, false])).starts_with("FAIL "));
        }

        #[test]
        fn test_listener_counts_progress() {
            let reporter = ProgressReporter::new(false, true, false);
            reporter.on_run_start(3, 1);
            reporter.on_test_end(&entry(&[true]));
            reporter.on_test_end(&entry(&[false]));
            assert_eq!(reporter.progress_bar.position(), 2);
            assert_eq!(reporter.progress_bar.length(), Some(3));
        }
    }
}
