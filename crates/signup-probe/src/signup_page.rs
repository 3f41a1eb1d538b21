//! Page object for the account signup form.

use crate::base_page::BasePage;
use crate::form_data::{Gender, Month, SignupFormData};
use crate::locator::Selector;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use async_trait::async_trait;

/// Selector strings of the signup form
pub mod locators {
    pub const FIRST_NAME: &str = "input[name=\"firstname\"]";
    pub const SURNAME: &str = "input[name=\"lastname\"]";
    pub const DAY: &str = "select[name=\"birthday_day\"]";
    pub const MONTH: &str = "select[name=\"birthday_month\"]";
    pub const YEAR: &str = "select[name=\"birthday_year\"]";
    pub const FEMALE: &str = "input[value=\"1\"]";
    pub const MALE: &str = "input[value=\"2\"]";
    pub const CUSTOM: &str = "input[value=\"-1\"]";
    pub const EMAIL: &str = "input[name=\"reg_email__\"]";
    pub const PASSWORD: &str = "input[name=\"reg_passwd__\"]";
    pub const SIGNUP_BUTTON: &str = "button[name=\"websubmit\"]";
    pub const HEADING: &str = "text=Create a new account";
    pub const ERROR_MESSAGES: &str = "[role=\"alert\"]";
    pub const FIELD_ERRORS: &str = ".fb_error";
}

/// Text inputs of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FirstName,
    Surname,
    Email,
    Password,
}

impl FormField {
    /// All text inputs in page order
    pub const ALL: [Self; 4] = [Self::FirstName, Self::Surname, Self::Email, Self::Password];

    /// Locator of the input
    #[must_use]
    pub fn selector(self) -> Selector {
        Selector::parse(match self {
            Self::FirstName => locators::FIRST_NAME,
            Self::Surname => locators::SURNAME,
            Self::Email => locators::EMAIL,
            Self::Password => locators::PASSWORD,
        })
    }
}

/// Date-of-birth dropdowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateField {
    Day,
    Month,
    Year,
}

impl DateField {
    /// Locator of the dropdown
    #[must_use]
    pub fn selector(self) -> Selector {
        Selector::parse(match self {
            Self::Day => locators::DAY,
            Self::Month => locators::MONTH,
            Self::Year => locators::YEAR,
        })
    }
}

impl Gender {
    /// Locator of the radio for this option
    #[must_use]
    pub fn selector(self) -> Selector {
        Selector::parse(match self {
            Self::Female => locators::FEMALE,
            Self::Male => locators::MALE,
            Self::Custom => locators::CUSTOM,
        })
    }
}

/// Signup form page object
///
/// Operations only drive and observe the form. Whether a value is acceptable
/// is decided by the application and read back through the error regions.
#[derive(Debug)]
pub struct SignupPage {
    base: BasePage,
}

impl SignupPage {
    /// Wrap a base page
    #[must_use]
    pub const fn new(base: BasePage) -> Self {
        Self { base }
    }

    /// Give back the base page
    #[must_use]
    pub fn into_base(self) -> BasePage {
        self.base
    }

    /// Default timeout for expectation waits
    #[must_use]
    pub const fn expect_timeout_ms(&self) -> u64 {
        self.base.settings().timeouts.expect_ms
    }

    /// Open the signup form and wait for it to render
    ///
    /// Waits for the heading first and falls back to the first-name input,
    /// since the heading is not rendered for every locale.
    pub async fn open(&mut self) -> ProbeResult<()> {
        self.base.navigate_to_signup().await?;
        let timeout = self.base.settings().timeouts.heading_ms;
        if let Err(e) = self
            .base
            .wait_for_visible(&Selector::parse(locators::HEADING), timeout)
            .await
        {
            tracing::debug!(error = %e, "heading not found, waiting for first name input");
            self.base
                .wait_for_visible(&FormField::FirstName.selector(), timeout)
                .await?;
        }
        Ok(())
    }

    /// Whether the signup heading is visible
    pub async fn is_signup_form_displayed(&self) -> bool {
        self.base
            .is_visible(&Selector::parse(locators::HEADING))
            .await
    }

    // ------------------------------------------------------------------------
    // Text inputs
    // ------------------------------------------------------------------------

    /// Replace the value of a text input
    pub async fn enter(&mut self, field: FormField, value: &str) -> ProbeResult<()> {
        self.base.fill_field(&field.selector(), value).await
    }

    /// Current value of a text input
    pub async fn value_of(&self, field: FormField) -> ProbeResult<String> {
        self.base.input_value(&field.selector()).await
    }

    /// Whether a text input is visible
    pub async fn is_field_visible(&self, field: FormField) -> bool {
        self.base.is_visible(&field.selector()).await
    }

    /// Whether a text input is enabled
    pub async fn is_field_enabled(&self, field: FormField) -> bool {
        self.base.is_enabled(&field.selector()).await
    }

    /// Empty a text input
    pub async fn clear(&mut self, field: FormField) -> ProbeResult<()> {
        self.base.clear_field(&field.selector()).await
    }

    /// Focus a text input
    pub async fn focus(&mut self, field: FormField) -> ProbeResult<()> {
        self.base.focus(&field.selector()).await
    }

    /// `placeholder` attribute of a text input
    pub async fn placeholder(&self, field: FormField) -> ProbeResult<Option<String>> {
        self.base.attribute(&field.selector(), "placeholder").await
    }

    /// Error text shown next to a field, if any
    pub async fn error_message_for(&self, field: FormField) -> ProbeResult<Option<String>> {
        self.base.error_message_for(&field.selector()).await
    }

    /// Type into the first name field, replacing its value
    pub async fn enter_first_name(&mut self, first_name: &str) -> ProbeResult<()> {
        self.enter(FormField::FirstName, first_name).await
    }

    /// Type into the surname field
    pub async fn enter_surname(&mut self, surname: &str) -> ProbeResult<()> {
        self.enter(FormField::Surname, surname).await
    }

    /// Type into the mobile-or-email field
    pub async fn enter_email(&mut self, email: &str) -> ProbeResult<()> {
        self.enter(FormField::Email, email).await
    }

    /// Type into the new-password field
    pub async fn enter_password(&mut self, password: &str) -> ProbeResult<()> {
        self.enter(FormField::Password, password).await
    }

    /// Current first name value
    pub async fn first_name_value(&self) -> ProbeResult<String> {
        self.value_of(FormField::FirstName).await
    }

    /// Current surname value
    pub async fn surname_value(&self) -> ProbeResult<String> {
        self.value_of(FormField::Surname).await
    }

    /// Current mobile-or-email value
    pub async fn email_value(&self) -> ProbeResult<String> {
        self.value_of(FormField::Email).await
    }

    /// Current password value, read back unmasked
    pub async fn password_value(&self) -> ProbeResult<String> {
        self.value_of(FormField::Password).await
    }

    // ------------------------------------------------------------------------
    // Date of birth and gender
    // ------------------------------------------------------------------------

    /// Select the birthday day ("1".."31")
    pub async fn select_day(&mut self, day: &str) -> ProbeResult<()> {
        self.base.select_option(&DateField::Day.selector(), day).await
    }

    /// Select the birthday month by its option value
    pub async fn select_month(&mut self, month: Month) -> ProbeResult<()> {
        self.base
            .select_option(&DateField::Month.selector(), &month.option_value())
            .await
    }

    /// Select the birthday year
    pub async fn select_year(&mut self, year: &str) -> ProbeResult<()> {
        self.base.select_option(&DateField::Year.selector(), year).await
    }

    /// Selected option value of a date dropdown
    pub async fn selected(&self, field: DateField) -> ProbeResult<String> {
        self.base.input_value(&field.selector()).await
    }

    /// Click the radio for `gender`
    pub async fn select_gender(&mut self, gender: Gender) -> ProbeResult<()> {
        self.base.click(&gender.selector()).await
    }

    /// Currently checked gender, if any
    pub async fn selected_gender(&self) -> ProbeResult<Option<Gender>> {
        for gender in Gender::ALL {
            if self.base.is_checked(&gender.selector()).await? {
                return Ok(Some(gender));
            }
        }
        Ok(None)
    }

    // ------------------------------------------------------------------------
    // Whole form
    // ------------------------------------------------------------------------

    /// Fill every field in page order; gender is skipped when `None`
    pub async fn fill_signup_form(&mut self, data: &SignupFormData) -> ProbeResult<()> {
        self.enter_first_name(&data.first_name).await?;
        self.enter_surname(&data.surname).await?;
        self.select_day(&data.date_of_birth.day).await?;
        self.select_month(data.date_of_birth.month).await?;
        self.select_year(&data.date_of_birth.year).await?;
        if let Some(gender) = data.gender {
            self.select_gender(gender).await?;
        }
        self.enter_email(&data.email).await?;
        self.enter_password(&data.password).await
    }

    /// Click the signup button
    pub async fn submit(&mut self) -> ProbeResult<()> {
        self.base
            .click(&Selector::parse(locators::SIGNUP_BUTTON))
            .await
    }

    /// Fill the form, then submit it
    pub async fn submit_signup(&mut self, data: &SignupFormData) -> ProbeResult<()> {
        self.fill_signup_form(data).await?;
        self.submit().await
    }

    /// Whether the signup button accepts clicks
    pub async fn is_signup_button_enabled(&self) -> bool {
        self.base
            .is_enabled(&Selector::parse(locators::SIGNUP_BUTTON))
            .await
    }

    // ------------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------------

    /// Wait until an error region becomes visible
    pub async fn wait_for_error_message(&mut self, timeout_ms: u64) -> ProbeResult<()> {
        self.base
            .wait_for_visible(&Selector::parse(locators::ERROR_MESSAGES), timeout_ms)
            .await
    }

    /// Whether any error region is visible; false on any error
    pub async fn has_error_messages(&self) -> bool {
        self.error_count().await.is_ok_and(|n| n > 0)
    }

    /// Number of visible error regions
    pub async fn error_count(&self) -> ProbeResult<usize> {
        self.base
            .count_visible(&Selector::parse(locators::ERROR_MESSAGES))
            .await
    }

    /// Trimmed, non-empty text of every visible error region in document order
    pub async fn error_messages(&self) -> ProbeResult<Vec<String>> {
        Ok(self
            .base
            .visible_text_contents(&Selector::parse(locators::ERROR_MESSAGES))
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }

    /// Trimmed text of the inline `.fb_error` markers
    pub async fn field_error_messages(&self) -> ProbeResult<Vec<String>> {
        Ok(self
            .base
            .all_text_contents(&Selector::parse(locators::FIELD_ERRORS))
            .await?
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }
}

#[async_trait]
impl PageObject for SignupPage {
    fn url_pattern(&self) -> &str {
        "/r.php"
    }

    fn page_name(&self) -> &str {
        "signup"
    }

    fn base(&self) -> &BasePage {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BasePage {
        &mut self.base
    }

    async fn is_loaded(&self) -> bool {
        self.is_signup_form_displayed().await || self.is_field_visible(FormField::FirstName).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PageSettings, Timeouts};
    use crate::form_data::DateOfBirth;
    use crate::mock::{MockDriver, MockElement};
    use proptest::prelude::*;

    fn fast_settings() -> PageSettings {
        PageSettings {
            timeouts: Timeouts {
                test_ms: 2_000,
                navigation_ms: 500,
                action_ms: 200,
                expect_ms: 300,
                heading_ms: 200,
            },
            ..PageSettings::default()
        }
    }

    async fn open_with(driver: MockDriver) -> SignupPage {
        let mut page = SignupPage::new(BasePage::new(Box::new(driver), fast_settings()));
        page.open().await.unwrap();
        page
    }

    async fn open() -> SignupPage {
        open_with(MockDriver::signup_form()).await
    }

    fn valid_data() -> SignupFormData {
        SignupFormData::new(
            "John",
            "Smith",
            DateOfBirth::new("15", "Mar", "2000").unwrap(),
            Some(Gender::Male),
            "testuser@example.com",
            "MyPass123!",
        )
    }

    mod open_tests {
        use super::*;

        #[tokio::test]
        async fn test_open_shows_form() {
            let page = open().await;
            assert!(page.is_signup_form_displayed().await);
            assert!(page.is_loaded().await);
            assert!(page.is_at_expected_url().await);
        }

        #[tokio::test]
        async fn test_open_falls_back_to_first_name() {
            let page = open_with(MockDriver::signup_form().without_text("Create a new account")).await;
            assert!(!page.is_signup_form_displayed().await);
            assert!(page.is_field_visible(FormField::FirstName).await);
        }

        #[tokio::test]
        async fn test_open_fails_on_empty_page() {
            let mut page = SignupPage::new(BasePage::new(Box::new(MockDriver::new()), fast_settings()));
            assert!(page.open().await.unwrap_err().is_timeout());
        }
    }

    mod field_tests {
        use super::*;

        #[tokio::test]
        async fn test_every_field_is_visible_and_enabled() {
            let page = open().await;
            for field in FormField::ALL {
                assert!(page.is_field_visible(field).await, "{field:?}");
                assert!(page.is_field_enabled(field).await, "{field:?}");
            }
            assert!(page.is_signup_button_enabled().await);
        }

        #[tokio::test]
        async fn test_placeholders() {
            let page = open().await;
            assert_eq!(
                page.placeholder(FormField::FirstName).await.unwrap().as_deref(),
                Some("First name")
            );
            assert_eq!(
                page.placeholder(FormField::Surname).await.unwrap().as_deref(),
                Some("Surname")
            );
        }

        #[tokio::test]
        async fn test_clear_and_focus() {
            let mut page = open().await;
            page.enter_surname("Smith").await.unwrap();
            page.focus(FormField::Surname).await.unwrap();
            page.clear(FormField::Surname).await.unwrap();
            assert_eq!(page.surname_value().await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_date_selection_read_back() {
            let mut page = open().await;
            page.select_day("29").await.unwrap();
            page.select_month(Month::Feb).await.unwrap();
            page.select_year("2000").await.unwrap();
            assert_eq!(page.selected(DateField::Day).await.unwrap(), "29");
            assert_eq!(page.selected(DateField::Month).await.unwrap(), "2");
            assert_eq!(page.selected(DateField::Year).await.unwrap(), "2000");
        }

        #[tokio::test]
        async fn test_gender_selection() {
            let mut page = open().await;
            assert_eq!(page.selected_gender().await.unwrap(), None);
            for gender in Gender::ALL {
                page.select_gender(gender).await.unwrap();
                assert_eq!(page.selected_gender().await.unwrap(), Some(gender));
                assert!(page.is_signup_form_displayed().await);
            }
        }
    }

    mod round_trip_tests {
        use super::*;
        use crate::test_data::test_data;

        #[tokio::test]
        async fn test_every_valid_value_reads_back_unchanged() {
            let data = test_data();
            let first_names = &data.valid_first_names;
            let surnames = &data.valid_surnames;
            let emails = &data.emails;
            let passwords = &data.passwords;
            let values: Vec<(FormField, &String)> = [
                &first_names.standard,
                &first_names.with_space,
                &first_names.single_char,
                &first_names.lowercase,
                &first_names.mixed_case,
                &first_names.hyphenated,
            ]
            .into_iter()
            .map(|v| (FormField::FirstName, v))
            .chain(
                [
                    &surnames.standard,
                    &surnames.compound,
                    &surnames.single_char,
                    &surnames.lowercase,
                    &surnames.mixed_case,
                    &surnames.hyphenated,
                    &surnames.with_apostrophe,
                ]
                .into_iter()
                .map(|v| (FormField::Surname, v)),
            )
            .chain(
                [
                    &emails.valid,
                    &emails.with_subdomain,
                    &emails.with_plus,
                    &emails.with_dot,
                    &emails.with_numbers,
                    &emails.uppercase,
                ]
                .into_iter()
                .map(|v| (FormField::Email, v)),
            )
            .chain(
                [
                    &passwords.strong,
                    &passwords.min_length,
                    &passwords.letters_only,
                    &passwords.numbers_only,
                    &passwords.with_special,
                    &passwords.with_space,
                    &passwords.long_password,
                    &passwords.unicode,
                ]
                .into_iter()
                .map(|v| (FormField::Password, v)),
            )
            .collect();

            let mut page = open().await;
            for (field, value) in values {
                page.enter(field, value).await.unwrap();
                assert_eq!(&page.value_of(field).await.unwrap(), value, "{field:?}");
            }
        }
    }

    mod submit_tests {
        use super::*;

        #[tokio::test]
        async fn test_empty_first_name_raises_error() {
            let mut page = open().await;
            page.submit_signup(&valid_data().with_first_name("")).await.unwrap();
            page.wait_for_error_message(page.expect_timeout_ms())
                .await
                .unwrap();
            assert!(page.has_error_messages().await);
            let messages = page.error_messages().await.unwrap();
            assert_eq!(messages.len(), page.error_count().await.unwrap());
            assert!(messages.iter().all(|m| !m.is_empty() && m == m.trim()));
        }

        #[tokio::test]
        async fn test_hidden_alerts_are_not_errors() {
            let stale = MockElement::new("div")
                .attr("role", "alert")
                .with_text("stale hidden error")
                .hidden();
            let page = open_with(MockDriver::signup_form().with_element(stale)).await;

            assert!(!page.has_error_messages().await);
            assert_eq!(page.error_count().await.unwrap(), 0);
            assert!(page.error_messages().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_valid_submission_has_no_errors() {
            let mut page = open().await;
            page.submit_signup(&valid_data()).await.unwrap();
            let err = page.wait_for_error_message(100).await.unwrap_err();
            assert!(err.is_timeout());
            assert!(!page.has_error_messages().await);
            assert!(page.field_error_messages().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_no_gender_leaves_radios_unchecked() {
            let mut page = open().await;
            page.fill_signup_form(&valid_data().with_gender(None))
                .await
                .unwrap();
            assert_eq!(page.selected_gender().await.unwrap(), None);
        }

        #[tokio::test]
        async fn test_error_for_field() {
            let mut page = open().await;
            page.submit().await.unwrap();
            let message = page.error_message_for(FormField::FirstName).await.unwrap();
            assert!(message.is_some());
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_text_value_roundtrip(value in "[A-Za-z0-9 @.'-]{0,40}") {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let read = rt.block_on(async {
                let mut page = open().await;
                page.enter(FormField::Email, &value).await.unwrap();
                page.value_of(FormField::Email).await.unwrap()
            });
            prop_assert_eq!(read, value);
        }
    }
}
