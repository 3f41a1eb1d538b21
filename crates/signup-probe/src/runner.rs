//! Suite runner.
//!
//! Runs every selected [`TestCase`] once per [`Project`] on a bounded worker
//! pool. Each attempt gets a fresh page and fixture, runs under the test
//! timeout and writes artifacts according to the [`ArtifactPolicy`]. A failed
//! attempt is retried up to `retries` times; a case that fails and then
//! passes is reported as flaky.

use crate::config::{ArtifactPolicy, PageSettings, SuiteConfig};
use crate::driver::PageFactory;
use crate::fixture::{Fixture, FixtureOptions, SignupFixture};
use crate::reporter::{Attachment, AttachmentKind, AttemptRecord, Reporter, TestResultEntry};
use crate::result::{ProbeError, ProbeResult};
use crate::signup_page::SignupPage;
use futures::future::BoxFuture;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Future returned by a test body
pub type TestFuture<'a> = BoxFuture<'a, ProbeResult<()>>;

/// Test body: receives the signup page after fixture setup
pub type TestBody = for<'a> fn(&'a mut SignupPage) -> TestFuture<'a>;

/// A single test case
#[derive(Clone, Copy)]
pub struct TestCase {
    /// Stable id, e.g. `TC_FN_001`
    pub id: &'static str,
    pub title: &'static str,
    /// Describe-block style group, e.g. `First Name Field Validation`
    pub group: &'static str,
    /// Restrict the run to `only` cases
    pub only: bool,
    pub body: TestBody,
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("group", &self.group)
            .field("only", &self.only)
            .finish()
    }
}

impl TestCase {
    #[must_use]
    pub const fn new(
        id: &'static str,
        title: &'static str,
        group: &'static str,
        body: TestBody,
    ) -> Self {
        Self {
            id,
            title,
            group,
            only: false,
            body,
        }
    }

    /// Mark as focused
    #[must_use]
    pub const fn only(mut self) -> Self {
        self.only = true;
        self
    }

    /// `group › title`
    #[must_use]
    pub fn full_title(&self) -> String {
        format!("{} › {}", self.group, self.title)
    }

    /// Case-insensitive substring match over id, group and title
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        let pattern = pattern.to_lowercase();
        [self.id, self.group, self.title]
            .iter()
            .any(|s| s.to_lowercase().contains(&pattern))
    }

    /// Directory-safe name
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.id.len() + self.title.len() + 1);
        for c in format!("{}-{}", self.id, self.title).chars() {
            if c.is_ascii_alphanumeric() {
                slug.push(c.to_ascii_lowercase());
            } else if !slug.ends_with('-') {
                slug.push('-');
            }
        }
        slug.trim_end_matches('-').chars().take(80).collect()
    }
}

/// Filter cases by `grep` and `only` markers
///
/// When any case is marked `only`, just those run. With `forbid_only` set the
/// presence of such a case is an error.
pub fn select_cases(
    cases: Vec<TestCase>,
    grep: Option<&str>,
    forbid_only: bool,
) -> ProbeResult<Vec<TestCase>> {
    let focused: Vec<&TestCase> = cases.iter().filter(|c| c.only).collect();
    if forbid_only && !focused.is_empty() {
        let ids: Vec<&str> = focused.iter().map(|c| c.id).collect();
        return Err(ProbeError::ConfigError {
            message: format!("focused tests are forbidden: {}", ids.join(", ")),
        });
    }
    let any_focused = !focused.is_empty();
    Ok(cases
        .into_iter()
        .filter(|c| !any_focused || c.only)
        .filter(|c| grep.map_or(true, |g| c.matches(g)))
        .collect())
}

/// A browser project: a name plus a source of fresh pages
#[derive(Clone)]
pub struct Project {
    pub name: String,
    pub factory: Arc<dyn PageFactory>,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project").field("name", &self.name).finish()
    }
}

impl Project {
    #[must_use]
    pub fn new(name: impl Into<String>, factory: Arc<dyn PageFactory>) -> Self {
        Self {
            name: name.into(),
            factory,
        }
    }
}

/// Observer of run progress
pub trait RunListener: Send + Sync {
    /// Called once before any test starts
    fn on_run_start(&self, _total: usize, _workers: usize) {}

    /// Called before every attempt
    fn on_attempt_start(&self, _project: &str, _case: &TestCase, _attempt: u32) {}

    /// Called when a case has its final status
    fn on_test_end(&self, _result: &TestResultEntry) {}

    /// Called once after the last test
    fn on_run_end(&self, _reporter: &Reporter) {}
}

/// Listener that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentListener;

impl RunListener for SilentListener {}

/// Everything a worker needs, shared across tasks
#[derive(Debug, Clone)]
struct RunSettings {
    page: PageSettings,
    retries: u32,
    output_dir: PathBuf,
    artifacts: ArtifactPolicy,
}

/// Runs test cases against projects
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    settings: Arc<RunSettings>,
    workers: usize,
    grep: Option<String>,
    forbid_only: bool,
}

impl SuiteRunner {
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            settings: Arc::new(RunSettings {
                page: config.page_settings(),
                retries: config.retries,
                output_dir: config.output_dir.clone(),
                artifacts: config.artifacts,
            }),
            workers: config.workers.max(1),
            grep: config.grep.clone(),
            forbid_only: config.forbid_only,
        }
    }

    /// Run `cases` on every project
    ///
    /// Results are ordered by project, then by case order.
    pub async fn run(
        &self,
        projects: &[Project],
        cases: Vec<TestCase>,
        listener: Arc<dyn RunListener>,
    ) -> ProbeResult<Reporter> {
        let cases = select_cases(cases, self.grep.as_deref(), self.forbid_only)?;
        let started = Instant::now();
        let mut reporter = Reporter::new("signup-probe");
        listener.on_run_start(cases.len() * projects.len(), self.workers);
        tracing::info!(
            tests = cases.len(),
            projects = projects.len(),
            workers = self.workers,
            "starting run"
        );

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        for (p, project) in projects.iter().enumerate() {
            for (c, case) in cases.iter().enumerate() {
                let semaphore = Arc::clone(&semaphore);
                let settings = Arc::clone(&self.settings);
                let listener = Arc::clone(&listener);
                let project = project.clone();
                let case = *case;
                tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    let result = run_case(&settings, &project, &case, listener.as_ref()).await;
                    listener.on_test_end(&result);
                    ((p, c), result)
                });
            }
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(done) => results.push(done),
                Err(e) => {
                    return Err(ProbeError::PageError {
                        message: format!("test worker panicked: {e}"),
                    })
                }
            }
        }
        results.sort_by_key(|(order, _)| *order);
        for (_, result) in results {
            reporter.record(result);
        }
        reporter.finish(started.elapsed().as_millis() as u64);
        tracing::info!(summary = %reporter.summary(), "run finished");
        listener.on_run_end(&reporter);
        Ok(reporter)
    }
}

async fn run_case(
    settings: &RunSettings,
    project: &Project,
    case: &TestCase,
    listener: &dyn RunListener,
) -> TestResultEntry {
    let mut attempts = Vec::new();
    for attempt in 0..=settings.retries {
        if attempt > 0 {
            tracing::info!(id = case.id, project = %project.name, attempt, "retrying");
        }
        listener.on_attempt_start(&project.name, case, attempt);
        let record = run_attempt(settings, project, case, attempt).await;
        let passed = record.passed;
        attempts.push(record);
        if passed {
            break;
        }
    }
    TestResultEntry::from_attempts(case.id, case.title, case.group, &project.name, attempts)
}

async fn run_attempt(
    settings: &RunSettings,
    project: &Project,
    case: &TestCase,
    attempt: u32,
) -> AttemptRecord {
    let started = Instant::now();
    let relative_dir = PathBuf::from(&project.name)
        .join(case.slug())
        .join(format!("attempt-{attempt}"));
    let options = FixtureOptions {
        test_name: format!("{} {}", case.id, case.full_title()),
        filmstrip: settings.artifacts.filmstrip.records(attempt),
    };

    let mut fixture =
        match SignupFixture::acquire(project.factory.as_ref(), settings.page.clone(), &options).await
        {
            Ok(fixture) => fixture,
            Err(e) => {
                return AttemptRecord {
                    attempt,
                    passed: false,
                    duration_ms: started.elapsed().as_millis() as u64,
                    error: Some(e.to_string()),
                    attachments: Vec::new(),
                }
            }
        };

    let test_ms = settings.page.timeouts.test_ms;
    let outcome = match tokio::time::timeout(
        Duration::from_millis(test_ms),
        execute(&mut fixture, case.body),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(ProbeError::timeout(test_ms, format!("test \"{}\"", case.title))),
    };
    let failed = outcome.is_err();
    if let Err(e) = &outcome {
        tracing::warn!(id = case.id, project = %project.name, attempt, error = %e, "attempt failed");
    }

    let attachments = capture_artifacts(
        &mut fixture,
        settings.artifacts,
        &settings.output_dir,
        &relative_dir,
        attempt,
        failed,
    )
    .await;

    if let Err(e) = fixture.teardown().await {
        tracing::warn!(id = case.id, error = %e, "teardown failed");
    }

    AttemptRecord {
        attempt,
        passed: !failed,
        duration_ms: started.elapsed().as_millis() as u64,
        error: outcome.err().map(|e| e.to_string()),
        attachments,
    }
}

async fn execute(fixture: &mut SignupFixture, body: TestBody) -> ProbeResult<()> {
    fixture.setup().await?;
    body(fixture.page_mut()?).await
}

/// Write the artifacts the policy keeps; capture errors are logged, not raised
async fn capture_artifacts(
    fixture: &mut SignupFixture,
    policy: ArtifactPolicy,
    output_dir: &Path,
    relative_dir: &Path,
    attempt: u32,
    failed: bool,
) -> Vec<Attachment> {
    let mut attachments = Vec::new();
    let dir = output_dir.join(relative_dir);
    let base = fixture.base_mut();

    if policy.screenshot.keeps(attempt, failed) {
        let path = dir.join("screenshot.png");
        match base.save_screenshot(&path).await {
            Ok(()) => attachments.push(Attachment {
                kind: AttachmentKind::Screenshot,
                path: relative_dir.join("screenshot.png"),
            }),
            Err(e) => tracing::warn!(error = %e, "screenshot capture failed"),
        }
    }

    if policy.trace.records(attempt) && policy.trace.keeps(attempt, failed) {
        match base.trace().save_json(&dir.join("trace.json")) {
            Ok(()) => attachments.push(Attachment {
                kind: AttachmentKind::Trace,
                path: relative_dir.join("trace.json"),
            }),
            Err(e) => tracing::warn!(error = %e, "trace capture failed"),
        }
    }

    if policy.filmstrip.keeps(attempt, failed) {
        if let Some(filmstrip) = base.take_filmstrip().filter(|f| !f.is_empty()) {
            match filmstrip.save(&dir.join("filmstrip")) {
                Ok(_) => attachments.push(Attachment {
                    kind: AttachmentKind::Filmstrip,
                    path: relative_dir.join("filmstrip"),
                }),
                Err(e) => tracing::warn!(error = %e, "filmstrip capture failed"),
            }
        }
    }

    attachments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CaptureMode, Timeouts};
    use crate::mock::{MockDriver, MockPageFactory};
    use crate::reporter::TestStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn passing(page: &mut SignupPage) -> TestFuture<'_> {
        Box::pin(async move {
            page.enter_first_name("John").await?;
            Ok(())
        })
    }

    fn failing(_page: &mut SignupPage) -> TestFuture<'_> {
        Box::pin(async { Err(ProbeError::assertion("expected failure")) })
    }

    static FLAKY_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn flaky(_page: &mut SignupPage) -> TestFuture<'_> {
        Box::pin(async {
            if FLAKY_CALLS.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(ProbeError::assertion("first attempt fails"))
            } else {
                Ok(())
            }
        })
    }

    fn hanging(_page: &mut SignupPage) -> TestFuture<'_> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
    }

    fn config(dir: &Path) -> SuiteConfig {
        SuiteConfig {
            timeouts: Timeouts {
                test_ms: 2_000,
                navigation_ms: 500,
                action_ms: 300,
                expect_ms: 300,
                heading_ms: 300,
            },
            workers: 2,
            output_dir: dir.to_path_buf(),
            ..SuiteConfig::default()
        }
    }

    fn mock_project(name: &str) -> Project {
        Project::new(name, Arc::new(MockPageFactory::signup_form()))
    }

    mod selection_tests {
        use super::*;

        fn cases() -> Vec<TestCase> {
            vec![
                TestCase::new("TC_FN_001", "should accept valid name", "First Name", passing),
                TestCase::new("TC_SN_001", "should accept valid surname", "Surname", passing),
            ]
        }

        #[test]
        fn test_grep_matches_id_and_title() {
            let by_id = select_cases(cases(), Some("tc_sn"), false).unwrap();
            assert_eq!(by_id.len(), 1);
            assert_eq!(by_id[0].id, "TC_SN_001");
            let by_title = select_cases(cases(), Some("valid"), false).unwrap();
            assert_eq!(by_title.len(), 2);
        }

        #[test]
        fn test_only_restricts_run() {
            let mut all = cases();
            all[1] = all[1].only();
            let selected = select_cases(all, None, false).unwrap();
            assert_eq!(selected.len(), 1);
            assert_eq!(selected[0].id, "TC_SN_001");
        }

        #[test]
        fn test_forbid_only_rejects_focused() {
            let mut all = cases();
            all[0] = all[0].only();
            let err = select_cases(all, None, true).unwrap_err();
            assert!(err.to_string().contains("TC_FN_001"));
        }

        #[test]
        fn test_slug_is_directory_safe() {
            let case = TestCase::new("TC_FN_001", "should accept: a name!", "g", passing);
            assert_eq!(case.slug(), "tc-fn-001-should-accept-a-name");
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_passing_case_on_each_project() {
            let dir = TempDir::new().unwrap();
            let runner = SuiteRunner::new(&config(dir.path()));
            let reporter = runner
                .run(
                    &[mock_project("chromium"), mock_project("edge")],
                    vec![TestCase::new("TC_1", "passes", "g", passing)],
                    Arc::new(SilentListener),
                )
                .await
                .unwrap();
            let results = reporter.results();
            assert_eq!(results.len(), 2);
            assert_eq!(results[0].project, "chromium");
            assert_eq!(results[1].project, "edge");
            assert!(reporter.all_passed());
            assert!(results[0].attempts[0].attachments.is_empty());
        }

        #[tokio::test]
        async fn test_failure_is_retried_with_artifacts() {
            let dir = TempDir::new().unwrap();
            let runner = SuiteRunner::new(&config(dir.path()));
            let reporter = runner
                .run(
                    &[mock_project("chromium")],
                    vec![TestCase::new("TC_2", "fails", "g", failing)],
                    Arc::new(SilentListener),
                )
                .await
                .unwrap();
            let result = &reporter.results()[0];
            assert_eq!(result.status, TestStatus::Failed);
            assert_eq!(result.attempts.len(), 2);
            assert!(result.error.as_deref().unwrap().contains("expected failure"));

            let first: Vec<AttachmentKind> =
                result.attempts[0].attachments.iter().map(|a| a.kind).collect();
            assert_eq!(first, vec![AttachmentKind::Screenshot, AttachmentKind::Filmstrip]);
            let retry: Vec<AttachmentKind> =
                result.attempts[1].attachments.iter().map(|a| a.kind).collect();
            assert!(retry.contains(&AttachmentKind::Trace));
            for attachment in result.attachments() {
                assert!(dir.path().join(&attachment.path).exists());
            }
        }

        #[tokio::test]
        async fn test_fail_then_pass_is_flaky() {
            let dir = TempDir::new().unwrap();
            let runner = SuiteRunner::new(&config(dir.path()));
            let reporter = runner
                .run(
                    &[mock_project("chromium")],
                    vec![TestCase::new("TC_3", "flaky", "g", flaky)],
                    Arc::new(SilentListener),
                )
                .await
                .unwrap();
            assert_eq!(reporter.results()[0].status, TestStatus::Flaky);
            assert!(reporter.all_passed());
        }

        #[tokio::test]
        async fn test_test_timeout() {
            let dir = TempDir::new().unwrap();
            let mut cfg = config(dir.path());
            cfg.timeouts.test_ms = 100;
            cfg.retries = 0;
            let reporter = SuiteRunner::new(&cfg)
                .run(
                    &[mock_project("chromium")],
                    vec![TestCase::new("TC_4", "hangs", "g", hanging)],
                    Arc::new(SilentListener),
                )
                .await
                .unwrap();
            let result = &reporter.results()[0];
            assert_eq!(result.status, TestStatus::Failed);
            assert!(result.error.as_deref().unwrap().contains("Timed out after 100ms"));
        }

        #[tokio::test]
        async fn test_setup_failure_skips_body() {
            let dir = TempDir::new().unwrap();
            let mut cfg = config(dir.path());
            cfg.retries = 0;
            cfg.artifacts.screenshot = CaptureMode::Off;
            cfg.artifacts.filmstrip = CaptureMode::Off;
            let unreachable = Project::new(
                "chromium",
                Arc::new(MockPageFactory::new(MockDriver::signup_form().unreachable())),
            );
            let reporter = SuiteRunner::new(&cfg)
                .run(
                    &[unreachable],
                    vec![TestCase::new("TC_5", "passes", "g", passing)],
                    Arc::new(SilentListener),
                )
                .await
                .unwrap();
            let result = &reporter.results()[0];
            assert_eq!(result.status, TestStatus::Failed);
            assert!(result.error.as_deref().unwrap().contains("ERR_NAME_NOT_RESOLVED"));
        }

        #[derive(Default)]
        struct Recorder {
            events: Mutex<Vec<String>>,
        }

        impl RunListener for Recorder {
            fn on_run_start(&self, total: usize, _workers: usize) {
                self.events.lock().unwrap().push(format!("start:{total}"));
            }

            fn on_test_end(&self, result: &TestResultEntry) {
                self.events.lock().unwrap().push(format!("end:{}", result.id));
            }

            fn on_run_end(&self, _reporter: &Reporter) {
                self.events.lock().unwrap().push("done".to_string());
            }
        }

        #[tokio::test]
        async fn test_listener_sees_every_case() {
            let dir = TempDir::new().unwrap();
            let recorder = Arc::new(Recorder::default());
            SuiteRunner::new(&config(dir.path()))
                .run(
                    &[mock_project("chromium")],
                    vec![
                        TestCase::new("TC_A", "a", "g", passing),
                        TestCase::new("TC_B", "b", "g", passing),
                    ],
                    recorder.clone(),
                )
                .await
                .unwrap();
            let events = recorder.events.lock().unwrap().clone();
            assert_eq!(events.first().map(String::as_str), Some("start:2"));
            assert_eq!(events.last().map(String::as_str), Some("done"));
            assert_eq!(events.iter().filter(|e| e.starts_with("end:")).count(), 2);
        }
    }
}
