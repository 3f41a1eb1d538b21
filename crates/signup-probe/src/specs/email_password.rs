use super::{complete_form, error_surfaces};
use crate::assertion::Assertion;
use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::runner::{TestCase, TestFuture};
use crate::signup_page::{FormField, SignupPage};
use crate::test_data::test_data;

const EMAIL: &str = "Email Field Tests";
const PASSWORD: &str = "Password Field Tests";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new("TC_EMAIL_001", "should accept valid email format", EMAIL, valid_email),
        TestCase::new("TC_EMAIL_002", "should accept email with subdomain", EMAIL, email_with_subdomain),
        TestCase::new("TC_EMAIL_003", "should accept email with plus tag", EMAIL, email_with_plus),
        TestCase::new("TC_EMAIL_004", "should accept email with dot in local part", EMAIL, email_with_dot),
        TestCase::new("TC_EMAIL_005", "should accept uppercase email", EMAIL, uppercase_email),
        TestCase::new("TC_EMAIL_008", "should reject email without @ symbol", EMAIL, email_missing_at),
        TestCase::new("TC_EMAIL_009", "should reject email without domain", EMAIL, email_missing_domain),
        TestCase::new("TC_PWD_001", "should accept strong password", PASSWORD, strong_password),
        TestCase::new("TC_PWD_002", "should accept password of minimum length", PASSWORD, min_length_password),
        TestCase::new("TC_PWD_003", "should reject password less than 6 characters", PASSWORD, short_password),
        TestCase::new("TC_PWD_004", "should accept a long password", PASSWORD, long_password),
        TestCase::new("TC_PWD_005", "should keep unicode characters in password", PASSWORD, unicode_password),
        TestCase::new("TC_PWD_006", "should mask the password field", PASSWORD, masked_password),
    ]
}

async fn email_round_trip(page: &mut SignupPage, email: &str) -> ProbeResult<()> {
    page.enter_email(email).await?;
    Assertion::equals(email, page.email_value().await?.as_str()).check()
}

async fn password_round_trip(page: &mut SignupPage, password: &str) -> ProbeResult<()> {
    page.enter_password(password).await?;
    Assertion::equals(password, page.password_value().await?.as_str()).check()
}

fn valid_email(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { email_round_trip(page, &test_data().emails.valid).await })
}

fn email_with_subdomain(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { email_round_trip(page, &test_data().emails.with_subdomain).await })
}

fn email_with_plus(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { email_round_trip(page, &test_data().emails.with_plus).await })
}

fn email_with_dot(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { email_round_trip(page, &test_data().emails.with_dot).await })
}

fn uppercase_email(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { email_round_trip(page, &test_data().emails.uppercase).await })
}

fn email_missing_at(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let email = &test_data().invalid_emails.missing_at;

        page.enter_email(email).await?;
        page.submit().await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error message").check()?;
        Assertion::is_true(page.has_error_messages().await, "expected an error message").check()
    })
}

fn email_missing_domain(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let mut form = complete_form()?;
        form.email = test_data().invalid_emails.missing_domain.clone();

        page.submit_signup(&form).await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error message").check()?;
        let messages = page.error_messages().await?;
        Assertion::has_length(&messages, page.error_count().await?).check()
    })
}

fn strong_password(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { password_round_trip(page, &test_data().passwords.strong).await })
}

fn min_length_password(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let password = &test_data().passwords.min_length;
        password_round_trip(page, password).await?;
        Assertion::equals(&6, &password.chars().count()).check()
    })
}

fn short_password(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let mut form = complete_form()?;
        form.surname = "Doe".to_string();
        form.password = test_data().invalid_passwords.less_than_minimum.clone();

        page.fill_signup_form(&form).await?;
        page.submit().await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error message").check()?;
        Assertion::is_true(page.has_error_messages().await, "expected an error message").check()
    })
}

fn long_password(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { password_round_trip(page, &test_data().passwords.long_password).await })
}

fn unicode_password(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { password_round_trip(page, &test_data().passwords.unicode).await })
}

fn masked_password(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let input_type = page
            .base()
            .attribute(&FormField::Password.selector(), "type")
            .await?;
        Assertion::equals(&Some("password".to_string()), &input_type).check()
    })
}
