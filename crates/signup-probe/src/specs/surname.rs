use super::{baseline_form, error_surfaces};
use crate::assertion::Assertion;
use crate::result::ProbeResult;
use crate::runner::{TestCase, TestFuture};
use crate::signup_page::{FormField, SignupPage};
use crate::test_data::{test_data, NAME_MAX_LENGTH};

const GROUP: &str = "Surname Field Tests";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new("TC_SN_001", "should accept valid surname with alphabetic characters", GROUP, valid_surname),
        TestCase::new("TC_SN_002", "should accept surname with spaces for compound surnames", GROUP, compound),
        TestCase::new("TC_SN_003", "should not register a surname with special characters", GROUP, special_characters),
        TestCase::new("TC_SN_004", "should not register a surname with numbers", GROUP, numbers),
        TestCase::new("TC_SN_005", "should show error when surname is empty on submission", GROUP, empty_surname),
        TestCase::new("TC_SN_006", "should accept single character surname", GROUP, single_character),
        TestCase::new("TC_SN_007", "should accept lowercase surname", GROUP, lowercase),
        TestCase::new("TC_SN_008", "should accept mixed case surname", GROUP, mixed_case),
        TestCase::new("TC_SN_009", "should accept hyphenated surnames", GROUP, hyphenated),
        TestCase::new("TC_SN_010", "should accept surnames with apostrophes", GROUP, apostrophe),
        TestCase::new("TC_SN_011", "should handle surname exceeding maximum length", GROUP, exceeds_max_length),
    ]
}

async fn round_trip(page: &mut SignupPage, surname: &str) -> ProbeResult<String> {
    page.enter_surname(surname).await?;
    let entered = page.surname_value().await?;
    Assertion::equals(surname, entered.as_str()).check()?;
    Ok(entered)
}

fn valid_surname(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let surname = &test_data().valid_surnames.standard;

        round_trip(page, surname).await?;

        Assertion::is_true(
            page.is_field_visible(FormField::Surname).await,
            "surname field should be visible",
        )
        .check()
    })
}

fn compound(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let surname = &test_data().valid_surnames.compound;
        let entered = round_trip(page, surname).await?;
        Assertion::contains(&entered, " ").check()
    })
}

fn special_characters(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let surname = &test_data().invalid_surnames.with_special_chars;

        let form = baseline_form()?.with_surname(surname.as_str());
        page.fill_signup_form(&form).await?;
        page.submit().await?;

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
        let surname = &test_data().invalid_surnames.with_numbers;

        let form = baseline_form()?.with_surname(surname.as_str());
        page.submit_signup(&form).await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error after submitting numbers")
            .check()?;
        Assertion::is_true(
            page.is_signup_form_displayed().await,
            "signup form should still be displayed after submitting numbers",
        )
        .check()
    })
}

fn empty_surname(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let form = baseline_form()?.with_surname(test_data().invalid_surnames.empty.as_str());

        page.submit_signup(&form).await?;

        let timeout = page.expect_timeout_ms();
        page.wait_for_error_message(timeout).await?;
        let messages = page.error_messages().await?;
        Assertion::is_false(messages.is_empty(), "expected an error message").check()?;
        Assertion::all_trimmed_non_empty(&messages).check()
    })
}

fn single_character(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let entered = round_trip(page, &test_data().valid_surnames.single_char).await?;
        Assertion::equals(&1, &entered.chars().count()).check()
    })
}

fn lowercase(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let entered = round_trip(page, &test_data().valid_surnames.lowercase).await?;
        Assertion::matches(&entered, "^[a-z]+$").check()
    })
}

fn mixed_case(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let entered = round_trip(page, &test_data().valid_surnames.mixed_case).await?;
        Assertion::matches(&entered, "[A-Z]").check()?;
        Assertion::matches(&entered, "[a-z]").check()
    })
}

fn hyphenated(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let surname = &test_data().valid_surnames.hyphenated;

        let entered = round_trip(page, surname).await?;

        Assertion::contains(&entered, "-").check()
    })
}

fn apostrophe(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let surname = &test_data().valid_surnames.with_apostrophe;

        let entered = round_trip(page, surname).await?;

        Assertion::contains(&entered, "'").check()
    })
}

fn exceeds_max_length(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let surname = &test_data().invalid_surnames.exceeds_max_length;

        page.enter_surname(surname).await?;
        let entered = page.surname_value().await?;

        let len = entered.chars().count();
        Assertion::at_most_chars(&entered, surname.chars().count()).check()?;
        if len < surname.chars().count() {
            Assertion::at_most_chars(&entered, NAME_MAX_LENGTH).check()?;
        }
        Ok(())
    })
}
