//! signup-probe: page objects and fixtures for end-to-end tests of an
//! account signup form.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────┐   ┌────────────┐   ┌──────────┐   ┌────────────┐
//! │ Runner   │──►│ Fixture │──►│ SignupPage │──►│ BasePage │──►│ PageDriver │
//! │ (retries,│   │ (setup, │   │ (locators, │   │ (waits,  │   │ CDP / mock │
//! │ reports) │   │ teardown│   │ semantics) │   │ trace)   │   │            │
//! └──────────┘   └─────────┘   └────────────┘   └──────────┘   └────────────┘
//! ```
//!
//! Real browsers are driven over the Chrome DevTools Protocol when the
//! `browser` feature is enabled. Without it, [`MockPageFactory`] serves an
//! in-memory model of the form so the whole suite can be dry-run.

// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
mod base_page;
mod browser;
mod driver;
mod fixture;
mod form_data;
mod page_object;
mod reporter;
mod result;
mod signup_page;

pub mod config;
pub mod locator;
/// In-memory page driver used by unit tests and dry runs
pub mod mock;
pub mod runner;
/// Signup form test cases
pub mod specs;
pub mod test_data;
pub mod tracing_support;
pub mod wait;

pub use assertion::{Assertion, AssertionResult};
pub use base_page::BasePage;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::{Browser, BrowserProfile, COMMON_ARGS, DESKTOP_CHROME_UA};
pub use config::{
    ArtifactPolicy, CaptureMode, PageSettings, ReporterKind, SuiteConfig, Timeouts,
};
pub use driver::{ElementSnapshot, PageDriver, PageFactory};
pub use fixture::{Fixture, FixtureOptions, FixtureState, SignupFixture};
pub use form_data::{DateOfBirth, Gender, Month, SignupFormData};
pub use locator::Selector;
pub use mock::{MockDriver, MockPageFactory};
pub use page_object::{PageObject, UrlMatcher};
pub use reporter::{
    Attachment, AttachmentKind, AttemptRecord, Reporter, RunStats, TestResultEntry, TestStatus,
    HTML_REPORT, JSON_REPORT,
};
pub use result::{ProbeError, ProbeResult};
pub use runner::{
    select_cases, Project, RunListener, SilentListener, SuiteRunner, TestBody, TestCase,
    TestFuture,
};
pub use signup_page::{locators, DateField, FormField, SignupPage};
pub use wait::{ElementState, LoadState};
