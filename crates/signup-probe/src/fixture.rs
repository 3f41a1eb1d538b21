//! Per-test fixture lifecycle.
//!
//! A fixture owns exactly one page. Setup opens the signup form on it and
//! teardown closes it. When setup fails the error is logged and returned so
//! the runner never hands a half-initialized page to a test body.

use crate::base_page::BasePage;
use crate::config::PageSettings;
use crate::driver::PageFactory;
use crate::page_object::PageObject;
use crate::result::{ProbeError, ProbeResult};
use crate::signup_page::SignupPage;
use async_trait::async_trait;

/// Trait for fixtures that are set up before a test body and torn down after.
#[async_trait]
pub trait Fixture: Send {
    /// Set up the fixture before test execution.
    ///
    /// # Errors
    ///
    /// Returns an error if fixture setup fails.
    async fn setup(&mut self) -> ProbeResult<()>;

    /// Tear down the fixture after test execution.
    ///
    /// # Errors
    ///
    /// Returns an error if fixture teardown fails.
    async fn teardown(&mut self) -> ProbeResult<()>;

    /// Get the fixture name for logging/debugging.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Current lifecycle state
    fn state(&self) -> FixtureState;
}

/// State of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// Page acquired, not set up.
    Registered,
    /// Fixture has been set up successfully.
    SetUp,
    /// Fixture has been torn down.
    TornDown,
    /// Fixture setup failed.
    Failed,
}

/// Options for one fixture instance
#[derive(Debug, Clone, Default)]
pub struct FixtureOptions {
    /// Name recorded in the action trace
    pub test_name: String,
    /// Capture a frame after every page action
    pub filmstrip: bool,
}

/// Signup page bound to a fresh browser page
#[derive(Debug)]
pub struct SignupFixture {
    page: SignupPage,
    state: FixtureState,
}

impl SignupFixture {
    /// Acquire a fresh page from `factory` without navigating.
    pub async fn acquire(
        factory: &dyn PageFactory,
        settings: PageSettings,
        options: &FixtureOptions,
    ) -> ProbeResult<Self> {
        let driver = factory.new_page().await?;
        let base = BasePage::new(driver, settings)
            .with_trace_name(&options.test_name)
            .with_filmstrip(options.filmstrip);
        Ok(Self {
            page: SignupPage::new(base),
            state: FixtureState::Registered,
        })
    }

    /// Acquire a page and set it up in one step.
    pub async fn start(
        factory: &dyn PageFactory,
        settings: PageSettings,
        options: &FixtureOptions,
    ) -> ProbeResult<Self> {
        let mut fixture = Self::acquire(factory, settings, options).await?;
        fixture.setup().await?;
        Ok(fixture)
    }

    /// The page object, available once setup succeeded
    pub fn page_mut(&mut self) -> ProbeResult<&mut SignupPage> {
        match self.state {
            FixtureState::SetUp => Ok(&mut self.page),
            state => Err(ProbeError::FixtureError {
                message: format!("signup page is not available in state {state:?}"),
            }),
        }
    }

    /// The page object in any state, for artifact capture
    #[must_use]
    pub const fn page(&self) -> &SignupPage {
        &self.page
    }

    /// Shared page operations in any state, for artifact capture
    pub fn base_mut(&mut self) -> &mut BasePage {
        self.page.base_mut()
    }
}

#[async_trait]
impl Fixture for SignupFixture {
    async fn setup(&mut self) -> ProbeResult<()> {
        if self.state == FixtureState::SetUp {
            return Ok(());
        }
        match self.page.open().await {
            Ok(()) => {
                self.state = FixtureState::SetUp;
                tracing::debug!(page = self.page.page_name(), "fixture set up");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to navigate to signup form");
                self.state = FixtureState::Failed;
                Err(e)
            }
        }
    }

    async fn teardown(&mut self) -> ProbeResult<()> {
        if self.state == FixtureState::TornDown {
            return Ok(());
        }
        self.state = FixtureState::TornDown;
        let result = self.page.base_mut().close().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "failed to close page during teardown");
        }
        result
    }

    fn name(&self) -> &str {
        "signup"
    }

    fn state(&self) -> FixtureState {
        self.state
    }
}
