use super::error_surfaces;
use crate::assertion::Assertion;
use crate::runner::{TestCase, TestFuture};
use crate::signup_page::{FormField, SignupPage};
use crate::test_data::{scenarios, test_data};

const GROUP: &str = "Form Submission Tests";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new("TC_SUBMIT_001", "should successfully submit valid form", GROUP, valid_registration),
        TestCase::new("TC_SUBMIT_002", "should show errors when submitting an empty form", GROUP, empty_form),
        TestCase::new("TC_SUBMIT_003", "should report every error of an invalid registration", GROUP, invalid_registration),
        TestCase::new("TC_SUBMIT_004", "should keep entered values after a rejected submission", GROUP, values_survive_rejection),
        TestCase::new("TC_SUBMIT_005", "should reject form with underage user", GROUP, underage),
    ]
}

fn valid_registration(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let form = &scenarios().valid_registration;

        page.submit_signup(form).await?;

        // No confirmation page is assumed; success is the absence of errors.
        Assertion::is_false(
            error_surfaces(page).await?,
            "no error should surface after a valid submission",
        )
        .check()
    })
}

fn empty_form(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        page.submit().await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error message").check()?;
        Assertion::is_true(page.error_count().await? > 0, "expected at least one error").check()
    })
}

fn invalid_registration(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let form = &scenarios().invalid_registration;

        page.submit_signup(form).await?;
        Assertion::is_true(error_surfaces(page).await?, "expected an error message").check()?;

        let messages = page.error_messages().await?;
        Assertion::has_length(&messages, page.error_count().await?)
            .context("error messages vs alert count")
            .check()?;
        Assertion::all_trimmed_non_empty(&messages).check()
    })
}

fn values_survive_rejection(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let form = scenarios()
            .valid_registration
            .clone()
            .with_gender(None);

        page.submit_signup(&form).await?;
        error_surfaces(page).await?;

        for (field, expected) in [
            (FormField::FirstName, &form.first_name),
            (FormField::Surname, &form.surname),
            (FormField::Email, &form.email),
        ] {
            Assertion::equals(expected.as_str(), page.value_of(field).await?.as_str())
                .context(&format!("{field:?}"))
                .check()?;
        }
        Ok(())
    })
}

fn underage(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let data = test_data();
        let mut form = scenarios().valid_registration.clone().with_gender(None);
        form.date_of_birth = data.invalid_dates.underage.clone();

        page.fill_signup_form(&form).await?;
        page.submit().await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error message").check()?;
        Assertion::is_true(page.has_error_messages().await, "expected an error message").check()
    })
}
