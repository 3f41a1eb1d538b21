use super::{baseline_form, error_surfaces};
use crate::assertion::Assertion;
use crate::runner::{TestCase, TestFuture};
use crate::signup_page::{FormField, SignupPage};
use crate::test_data::{test_data, NAME_MAX_LENGTH};

const GROUP: &str = "First Name Field Tests";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new("TC_FN_001", "should accept valid first name with alphabetic characters", GROUP, valid_first_name),
        TestCase::new("TC_FN_002", "should accept first name with spaces for compound names", GROUP, first_name_with_space),
        TestCase::new("TC_FN_003", "should not register a first name with special characters", GROUP, special_characters),
        TestCase::new("TC_FN_004", "should not register a first name with numbers", GROUP, numbers),
        TestCase::new("TC_FN_005", "should show error when first name is empty on submission", GROUP, empty_first_name),
        TestCase::new("TC_FN_006", "should accept single character first name", GROUP, single_character),
        TestCase::new("TC_FN_007", "should handle first name exceeding maximum length", GROUP, exceeds_max_length),
        TestCase::new("TC_FN_008", "should accept lowercase letters in first name", GROUP, lowercase),
        TestCase::new("TC_FN_009", "should accept mixed case first name", GROUP, mixed_case),
        TestCase::new("TC_FN_010", "should accept hyphenated first names", GROUP, hyphenated),
    ]
}

/// Enter `first_name` and check it reads back unchanged
async fn round_trip(page: &mut SignupPage, first_name: &str) -> crate::result::ProbeResult<String> {
    page.enter_first_name(first_name).await?;
    let entered = page.first_name_value().await?;
    Assertion::equals(first_name, entered.as_str()).check()?;
    Ok(entered)
}

fn valid_first_name(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().valid_first_names.standard;

        round_trip(page, first_name).await?;

        Assertion::is_true(
            page.is_field_visible(FormField::FirstName).await,
            "first name field should be visible",
        )
        .check()
    })
}

fn first_name_with_space(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().valid_first_names.with_space;

        let entered = round_trip(page, first_name).await?;

        Assertion::contains(&entered, " ").check()
    })
}

fn special_characters(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().invalid_first_names.with_special_chars;
        let form = baseline_form()?.with_first_name(first_name.as_str());

        page.fill_signup_form(&form).await?;
        page.submit().await?;

        // Input is not validated on entry; the registration must not go through.
        Assertion::is_true(
            error_surfaces(page).await?,
            "expected an error after submitting special characters",
        )
        .check()?;
        Assertion::is_true(
            page.is_signup_form_displayed().await,
            "signup form should still be displayed after submitting special characters",
        )
        .check()
    })
}

fn numbers(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().invalid_first_names.with_numbers;
        let form = baseline_form()?.with_first_name(first_name.as_str());

        page.submit_signup(&form).await?;

        Assertion::is_true(
            error_surfaces(page).await?,
            "expected an error after submitting numbers",
        )
        .check()?;
        Assertion::is_true(
            page.is_signup_form_displayed().await,
            "signup form should still be displayed after submitting numbers",
        )
        .check()
    })
}

fn empty_first_name(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().invalid_first_names.empty;

        let form = baseline_form()?.with_first_name(first_name.as_str());
        page.fill_signup_form(&form).await?;
        page.submit().await?;

        let timeout = page.expect_timeout_ms();
        page.wait_for_error_message(timeout).await?;
        Assertion::is_true(page.has_error_messages().await, "expected an error message").check()
    })
}

fn single_character(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().valid_first_names.single_char;

        let entered = round_trip(page, first_name).await?;

        Assertion::equals(&1, &entered.chars().count()).check()
    })
}

fn exceeds_max_length(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().invalid_first_names.exceeds_max_length;

        page.enter_first_name(first_name).await?;
        let entered = page.first_name_value().await?;

        // The form may truncate on input or accept and validate on submit.
        Assertion::at_most_chars(&entered, first_name.chars().count()).check()?;
        if entered.chars().count() < first_name.chars().count() {
            Assertion::at_most_chars(&entered, NAME_MAX_LENGTH).check()?;
        }
        Ok(())
    })
}

fn lowercase(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().valid_first_names.lowercase;

        let entered = round_trip(page, first_name).await?;

        Assertion::matches(&entered, "^[a-z]+$").check()
    })
}

fn mixed_case(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().valid_first_names.mixed_case;

        let entered = round_trip(page, first_name).await?;

        Assertion::matches(&entered, "[A-Z]").check()?;
        Assertion::matches(&entered, "[a-z]").check()
    })
}

fn hyphenated(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let first_name = &test_data().valid_first_names.hyphenated;

        let entered = round_trip(page, first_name).await?;

        Assertion::contains(&entered, "-").check()
    })
}
