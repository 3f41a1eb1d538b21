//! Signup form test cases, one module per form area.
//!
//! Every case is Arrange/Act/Assert shaped and receives a signup page that the
//! fixture already opened. Values come from [`crate::test_data`].

mod date_of_birth;
mod email_password;
mod first_name;
mod gender;
mod submission;
mod surname;

use crate::form_data::{DateOfBirth, Gender, SignupFormData};
use crate::result::ProbeResult;
use crate::runner::TestCase;
use crate::signup_page::SignupPage;

/// Every case in registration order
#[must_use]
pub fn all() -> Vec<TestCase> {
    let mut cases = Vec::new();
    cases.extend(first_name::cases());
    cases.extend(surname::cases());
    cases.extend(date_of_birth::cases());
    cases.extend(gender::cases());
    cases.extend(email_password::cases());
    cases.extend(submission::cases());
    cases
}

/// Form filled with acceptable placeholder values around the field under test
fn baseline_form() -> ProbeResult<SignupFormData> {
    Ok(SignupFormData::new(
        "John",
        "TestSurname",
        DateOfBirth::new("15", "3", "2000")?,
        None,
        "test@example.com",
        "Test1234",
    ))
}

/// Same as [`baseline_form`] with a gender picked
fn complete_form() -> ProbeResult<SignupFormData> {
    Ok(baseline_form()?.with_gender(Some(Gender::Female)))
}

/// Whether an error region becomes visible within the expect timeout
///
/// A timeout means no error surfaced; any other failure is returned.
async fn error_surfaces(page: &mut SignupPage) -> ProbeResult<bool> {
    let timeout = page.expect_timeout_ms();
    match page.wait_for_error_message(timeout).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_timeout() => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_case_ids_are_unique() {
        let cases = all();
        let ids: HashSet<&str> = cases.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), cases.len());
    }

    #[test]
    fn test_no_case_is_focused() {
        assert!(all().iter().all(|c| !c.only));
    }

    #[test]
    fn test_every_group_is_present() {
        let groups: HashSet<&str> = all().iter().map(|c| c.group).collect();
        for prefix in ["TC_FN_", "TC_SN_", "TC_DOB_", "TC_GN_", "TC_EMAIL_", "TC_PWD_", "TC_SUBMIT_"] {
            assert!(all().iter().any(|c| c.id.starts_with(prefix)), "{prefix}");
        }
        assert!(groups.len() >= 6);
    }

    #[test]
    fn test_baseline_form_is_complete_apart_from_gender() {
        let form = baseline_form().unwrap();
        assert!(form.gender.is_none());
        assert_eq!(form.date_of_birth.to_string(), "15 Mar 2000");
        assert_eq!(complete_form().unwrap().gender, Some(Gender::Female));
    }
}
