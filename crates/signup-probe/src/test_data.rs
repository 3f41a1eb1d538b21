//! Static test data for the signup form.
//!
//! Tables are built once per process and handed out by shared reference.
//! Dates relative to "today" (minimum age, underage, today, future) are
//! derived from the local clock when the tables are first used. Tests that
//! need a variation copy a value and change the copy.

use crate::form_data::{DateOfBirth, Gender, Month, SignupFormData};
use chrono::{Datelike, Days, Local, Months, NaiveDate};
use serde::Serialize;
use std::sync::OnceLock;

/// Minimum age accepted by the signup form, in years
pub const MINIMUM_AGE_YEARS: u32 = 13;

/// Longest name the form is expected to keep
pub const NAME_MAX_LENGTH: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct ValidFirstNames {
    pub standard: String,
    pub with_space: String,
    pub single_char: String,
    pub lowercase: String,
    pub mixed_case: String,
    pub hyphenated: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidFirstNames {
    pub with_numbers: String,
    pub with_special_chars: String,
    pub with_leading_space: String,
    pub with_trailing_space: String,
    pub exceeds_max_length: String,
    pub empty: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidSurnames {
    pub standard: String,
    pub compound: String,
    pub single_char: String,
    pub lowercase: String,
    pub mixed_case: String,
    pub hyphenated: String,
    pub with_apostrophe: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidSurnames {
    pub with_numbers: String,
    pub with_special_chars: String,
    pub empty: String,
    pub exceeds_max_length: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidDates {
    pub standard: DateOfBirth,
    /// Exactly the minimum age today
    pub min_age: DateOfBirth,
    pub leap_year: DateOfBirth,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidDates {
    /// One year short of the minimum age
    pub underage: DateOfBirth,
    pub future: DateOfBirth,
    pub today: DateOfBirth,
    /// 29 February of a non-leap year
    pub non_leap_year: DateOfBirth,
}

#[derive(Debug, Clone, Serialize)]
pub struct Emails {
    pub valid: String,
    pub with_subdomain: String,
    pub with_plus: String,
    pub with_dot: String,
    pub with_numbers: String,
    pub uppercase: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidEmails {
    pub missing_at: String,
    pub missing_domain: String,
    pub missing_local: String,
    pub with_space: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Passwords {
    pub strong: String,
    pub min_length: String,
    pub letters_only: String,
    pub numbers_only: String,
    pub with_special: String,
    pub with_space: String,
    pub long_password: String,
    pub unicode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidPasswords {
    pub less_than_minimum: String,
    pub empty: String,
}

/// Every per-field table
#[derive(Debug, Clone, Serialize)]
pub struct TestData {
    pub valid_first_names: ValidFirstNames,
    pub invalid_first_names: InvalidFirstNames,
    pub valid_surnames: ValidSurnames,
    pub invalid_surnames: InvalidSurnames,
    pub valid_dates: ValidDates,
    pub invalid_dates: InvalidDates,
    pub emails: Emails,
    pub invalid_emails: InvalidEmails,
    pub passwords: Passwords,
    pub invalid_passwords: InvalidPasswords,
    pub genders: [Gender; 3],
}

/// Complete form submissions composed from the tables
#[derive(Debug, Clone, Serialize)]
pub struct Scenarios {
    pub valid_registration: SignupFormData,
    /// Invalid in every field; no gender selected
    pub invalid_registration: SignupFormData,
}

fn date(day: u32, month: Month, year: i32) -> DateOfBirth {
    DateOfBirth {
        day: day.to_string(),
        month,
        year: year.to_string(),
    }
}

fn from_naive(d: NaiveDate) -> DateOfBirth {
    date(d.day(), Month::ALL[d.month0() as usize], d.year())
}

fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(12 * years))
        .unwrap_or(NaiveDate::MIN)
}

impl TestData {
    /// Tables as seen on `today`
    #[must_use]
    pub fn at(today: NaiveDate) -> Self {
        let future = today
            .checked_add_months(Months::new(1))
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .unwrap_or(NaiveDate::MAX);

        Self {
            valid_first_names: ValidFirstNames {
                standard: "John".into(),
                with_space: "Mary Jane".into(),
                single_char: "A".into(),
                lowercase: "john".into(),
                mixed_case: "JoHn".into(),
                hyphenated: "Jean-Paul".into(),
            },
            invalid_first_names: InvalidFirstNames {
                with_numbers: "John123".into(),
                with_special_chars: "John@123".into(),
                with_leading_space: " John".into(),
                with_trailing_space: "John ".into(),
                exceeds_max_length: "A".repeat(NAME_MAX_LENGTH + 1),
                empty: String::new(),
            },
            valid_surnames: ValidSurnames {
                standard: "Smith".into(),
                compound: "Van Der Berg".into(),
                single_char: "S".into(),
                lowercase: "smith".into(),
                mixed_case: "SmITh".into(),
                hyphenated: "Garcia-Lopez".into(),
                with_apostrophe: "O'Brien".into(),
            },
            invalid_surnames: InvalidSurnames {
                with_numbers: "Smith123".into(),
                with_special_chars: "Smith@123".into(),
                empty: String::new(),
                exceeds_max_length: "S".repeat(NAME_MAX_LENGTH + 1),
            },
            valid_dates: ValidDates {
                standard: date(15, Month::Mar, 2000),
                min_age: from_naive(years_before(today, MINIMUM_AGE_YEARS)),
                leap_year: date(29, Month::Feb, 2000),
            },
            invalid_dates: InvalidDates {
                underage: from_naive(years_before(today, MINIMUM_AGE_YEARS - 1)),
                future: from_naive(future),
                today: from_naive(today),
                non_leap_year: date(29, Month::Feb, 2001),
            },
            emails: Emails {
                valid: "testuser@example.com".into(),
                with_subdomain: "user@mail.example.co.uk".into(),
                with_plus: "user+tag@example.com".into(),
                with_dot: "user.name@example.com".into(),
                with_numbers: "user123@example.com".into(),
                uppercase: "User@Example.COM".into(),
            },
            invalid_emails: InvalidEmails {
                missing_at: "userexample.com".into(),
                missing_domain: "user@".into(),
                missing_local: "@example.com".into(),
                with_space: "user name@example.com".into(),
            },
            passwords: Passwords {
                strong: "MyPass123!".into(),
                min_length: "Pass12".into(),
                letters_only: "Password".into(),
                numbers_only: "123456".into(),
                with_special: "!@#$%^".into(),
                with_space: "Pass 123".into(),
                long_password: format!("{}123", "A".repeat(100)),
                unicode: "Pass@123™".into(),
            },
            invalid_passwords: InvalidPasswords {
                less_than_minimum: "Pass1".into(),
                empty: String::new(),
            },
            genders: Gender::ALL,
        }
    }

    /// Compose the two aggregate scenarios from these tables
    #[must_use]
    pub fn scenarios(&self) -> Scenarios {
        Scenarios {
            valid_registration: SignupFormData::new(
                self.valid_first_names.standard.clone(),
                self.valid_surnames.standard.clone(),
                self.valid_dates.standard.clone(),
                Some(Gender::Male),
                self.emails.valid.clone(),
                self.passwords.strong.clone(),
            ),
            invalid_registration: SignupFormData::new(
                self.invalid_first_names.with_numbers.clone(),
                self.invalid_surnames.with_special_chars.clone(),
                self.invalid_dates.underage.clone(),
                None,
                self.invalid_emails.missing_at.clone(),
                self.invalid_passwords.less_than_minimum.clone(),
            ),
        }
    }
}

/// Process-wide tables
pub fn test_data() -> &'static TestData {
    static DATA: OnceLock<TestData> = OnceLock::new();
    DATA.get_or_init(|| TestData::at(Local::now().date_naive()))
}

/// Process-wide scenarios
pub fn scenarios() -> &'static Scenarios {
    static SCENARIOS: OnceLock<Scenarios> = OnceLock::new();
    SCENARIOS.get_or_init(|| test_data().scenarios())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 14).unwrap()
    }

    #[test]
    fn test_relative_dates() {
        let data = TestData::at(fixed_today());
        assert_eq!(data.valid_dates.min_age, date(14, Month::Jan, 2013));
        assert_eq!(data.invalid_dates.underage, date(14, Month::Jan, 2014));
        assert_eq!(data.invalid_dates.today, date(14, Month::Jan, 2026));
        assert_eq!(data.invalid_dates.future, date(15, Month::Feb, 2026));
    }

    #[test]
    fn test_min_age_on_leap_day() {
        let today = NaiveDate::from_ymd_opt(2028, 2, 29).unwrap();
        let data = TestData::at(today);
        assert_eq!(data.valid_dates.min_age, date(28, Month::Feb, 2015));
    }

    #[test]
    fn test_length_edge_values() {
        let data = test_data();
        assert_eq!(data.invalid_first_names.exceeds_max_length.len(), 51);
        assert_eq!(data.invalid_surnames.exceeds_max_length.len(), 51);
        assert_eq!(data.passwords.long_password.len(), 103);
        assert_eq!(data.passwords.min_length.len(), 6);
        assert_eq!(data.invalid_passwords.less_than_minimum.len(), 5);
    }

    #[test]
    fn test_unicode_password_is_one_trademark_sign() {
        let unicode = &test_data().passwords.unicode;
        assert_eq!(unicode, "Pass@123\u{2122}");
        assert_eq!(unicode.chars().count(), 9);
    }

    #[test]
    fn test_scenarios_reference_tables() {
        let data = test_data();
        let s = scenarios();
        let valid = &s.valid_registration;
        assert_eq!(valid.first_name, data.valid_first_names.standard);
        assert_eq!(valid.surname, data.valid_surnames.standard);
        assert_eq!(valid.date_of_birth, data.valid_dates.standard);
        assert_eq!(valid.gender, Some(Gender::Male));
        assert_eq!(valid.email, data.emails.valid);
        assert_eq!(valid.password, data.passwords.strong);

        let invalid = &s.invalid_registration;
        assert_eq!(invalid.first_name, data.invalid_first_names.with_numbers);
        assert_eq!(invalid.surname, data.invalid_surnames.with_special_chars);
        assert_eq!(invalid.date_of_birth, data.invalid_dates.underage);
        assert!(invalid.gender.is_none());
        assert_eq!(invalid.email, data.invalid_emails.missing_at);
        assert_eq!(invalid.password, data.invalid_passwords.less_than_minimum);
    }

    #[test]
    fn test_tables_are_shared() {
        assert!(std::ptr::eq(test_data(), test_data()));
    }
}
