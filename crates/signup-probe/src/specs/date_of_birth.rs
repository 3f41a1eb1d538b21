use super::{baseline_form, complete_form, error_surfaces};
use crate::assertion::Assertion;
use crate::form_data::DateOfBirth;
use crate::result::ProbeResult;
use crate::runner::{TestCase, TestFuture};
use crate::signup_page::{DateField, SignupPage};
use crate::test_data::test_data;

const GROUP: &str = "Date of Birth Field Tests";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new("TC_DOB_001", "should accept valid date of birth", GROUP, valid_date),
        TestCase::new("TC_DOB_002", "should allow submitting at the minimum age of 13 years", GROUP, minimum_age),
        TestCase::new("TC_DOB_003", "should accept 29 February of a leap year", GROUP, leap_year),
        TestCase::new("TC_DOB_004", "should reject 29 February of a non-leap year", GROUP, non_leap_year),
        TestCase::new("TC_DOB_005", "should reject a birthday of today", GROUP, born_today),
    ]
}

/// Select all three dropdowns and check they read back
async fn select_and_verify(page: &mut SignupPage, dob: &DateOfBirth) -> ProbeResult<()> {
    page.select_day(&dob.day).await?;
    page.select_month(dob.month).await?;
    page.select_year(&dob.year).await?;

    Assertion::equals(dob.day.as_str(), page.selected(DateField::Day).await?.as_str())
        .context("day")
        .check()?;
    Assertion::equals(
        dob.month.option_value().as_str(),
        page.selected(DateField::Month).await?.as_str(),
    )
    .context("month")
    .check()?;
    Assertion::equals(dob.year.as_str(), page.selected(DateField::Year).await?.as_str())
        .context("year")
        .check()
}

fn valid_date(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { select_and_verify(page, &test_data().valid_dates.standard).await })
}

fn minimum_age(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let dob = test_data().valid_dates.min_age.clone();

        let mut form = baseline_form()?;
        form.surname = "Doe".to_string();
        form.date_of_birth = dob;
        page.fill_signup_form(&form).await?;

        // Age is only checked on submit, server side.
        Assertion::is_true(
            page.is_signup_button_enabled().await,
            "signup button should be enabled",
        )
        .check()
    })
}

fn leap_year(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { select_and_verify(page, &test_data().valid_dates.leap_year).await })
}

/// Submit an otherwise complete form with `dob` and expect an error
async fn rejects_birthday(page: &mut SignupPage, dob: &DateOfBirth) -> ProbeResult<()> {
    let mut form = complete_form()?;
    form.date_of_birth = dob.clone();
    page.submit_signup(&form).await?;

    Assertion::is_true(error_surfaces(page).await?, &format!("expected an error for {dob}")).check()?;
    Assertion::is_true(
        page.is_signup_form_displayed().await,
        "signup form should still be displayed",
    )
    .check()
}

fn non_leap_year(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { rejects_birthday(page, &test_data().invalid_dates.non_leap_year).await })
}

fn born_today(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { rejects_birthday(page, &test_data().invalid_dates.today).await })
}
