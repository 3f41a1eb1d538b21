use super::{baseline_form, error_surfaces};
use crate::assertion::Assertion;
use crate::form_data::Gender;
use crate::result::ProbeResult;
use crate::runner::{TestCase, TestFuture};
use crate::signup_page::SignupPage;
use crate::test_data::test_data;

const GROUP: &str = "Gender Field Tests";

pub(super) fn cases() -> Vec<TestCase> {
    vec![
        TestCase::new("TC_GN_001", "should select Female gender", GROUP, female),
        TestCase::new("TC_GN_002", "should select Male gender", GROUP, male),
        TestCase::new("TC_GN_003", "should select Custom gender", GROUP, custom),
        TestCase::new("TC_GN_004", "should switch between every gender option", GROUP, switch_between),
        TestCase::new("TC_GN_005", "should show error when no gender is selected", GROUP, no_gender),
    ]
}

async fn select_and_verify(page: &mut SignupPage, gender: Gender) -> ProbeResult<()> {
    page.select_gender(gender).await?;

    Assertion::is_true(
        page.is_signup_form_displayed().await,
        "signup form should still be displayed",
    )
    .check()?;
    Assertion::equals(&Some(gender), &page.selected_gender().await?).check()
}

fn female(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { select_and_verify(page, Gender::Female).await })
}

fn male(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { select_and_verify(page, Gender::Male).await })
}

fn custom(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move { select_and_verify(page, Gender::Custom).await })
}

fn switch_between(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        for gender in test_data().genders {
            select_and_verify(page, gender).await?;
        }
        Ok(())
    })
}

fn no_gender(page: &mut SignupPage) -> TestFuture<'_> {
    Box::pin(async move {
        let form = baseline_form()?;

        page.submit_signup(&form).await?;

        Assertion::is_true(error_surfaces(page).await?, "expected an error without a gender")
            .check()?;
        Assertion::equals(&None, &page.selected_gender().await?).check()
    })
}
