//! Runs the whole signup suite against the in-memory form.

use signup_probe::{
    specs, CaptureMode, MockDriver, MockPageFactory, Project, ReporterKind, SilentListener,
    SuiteConfig, SuiteRunner, TestStatus, Timeouts, HTML_REPORT, JSON_REPORT,
};
use std::sync::Arc;
use tempfile::TempDir;

fn fast_config(output: &TempDir) -> SuiteConfig {
    SuiteConfig {
        timeouts: Timeouts {
            test_ms: 10_000,
            navigation_ms: 1_000,
            action_ms: 500,
            expect_ms: 400,
            heading_ms: 500,
        },
        retries: 0,
        workers: 4,
        output_dir: output.path().to_path_buf(),
        ..SuiteConfig::default()
    }
}

#[tokio::test]
async fn test_every_case_passes_against_mock_form() {
    let output = TempDir::new().unwrap();
    let config = fast_config(&output);
    let project = Project::new("chromium", Arc::new(MockPageFactory::signup_form()));

    let reporter = SuiteRunner::new(&config)
        .run(&[project], specs::all(), Arc::new(SilentListener))
        .await
        .unwrap();

    let failures: Vec<String> = reporter
        .failures()
        .iter()
        .map(|r| format!("{}: {}", r.id, r.error.clone().unwrap_or_default()))
        .collect();
    assert!(failures.is_empty(), "failed cases:\n{}", failures.join("\n"));
    assert_eq!(reporter.results().len(), specs::all().len());
}

#[tokio::test]
async fn test_grep_runs_one_group_on_two_projects() {
    let output = TempDir::new().unwrap();
    let mut config = fast_config(&output);
    config.grep = Some("TC_GN_".to_string());
    let factory = Arc::new(MockPageFactory::signup_form());
    let projects = [
        Project::new("chromium", factory.clone()),
        Project::new("edge", factory),
    ];

    let reporter = SuiteRunner::new(&config)
        .run(&projects, specs::all(), Arc::new(SilentListener))
        .await
        .unwrap();

    let gender_cases = specs::all()
        .iter()
        .filter(|c| c.id.starts_with("TC_GN_"))
        .count();
    assert_eq!(reporter.results().len(), gender_cases * 2);
    assert!(reporter.all_passed());
}

#[tokio::test]
async fn test_unreachable_site_fails_every_case_with_reports() {
    let output = TempDir::new().unwrap();
    let mut config = fast_config(&output);
    config.grep = Some("TC_FN_00".to_string());
    config.retries = 1;
    config.artifacts.filmstrip = CaptureMode::Off;
    let project = Project::new(
        "chromium",
        Arc::new(MockPageFactory::new(MockDriver::signup_form().unreachable())),
    );

    let reporter = SuiteRunner::new(&config)
        .run(&[project], specs::all(), Arc::new(SilentListener))
        .await
        .unwrap();

    assert!(!reporter.results().is_empty());
    for result in reporter.results() {
        assert_eq!(result.status, TestStatus::Failed, "{}", result.id);
        assert_eq!(result.attempts.len(), 2);
    }

    let written = reporter
        .write_reports(&[ReporterKind::Html, ReporterKind::Json], output.path())
        .unwrap();
    assert_eq!(written.len(), 2);
    let json = std::fs::read_to_string(output.path().join(JSON_REPORT)).unwrap();
    assert!(json.contains("ERR_NAME_NOT_RESOLVED"));
    assert!(output.path().join(HTML_REPORT).exists());
}
