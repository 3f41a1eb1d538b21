//! Values entered into the signup form.
//!
//! [`SignupFormData`] is parsed once at construction: the month of the date
//! of birth becomes a [`Month`], everything else is carried verbatim. The
//! content of each field is never judged here; accepting or rejecting it is
//! the remote application's job.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gender radio options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// `input[value="1"]`
    Female,
    /// `input[value="2"]`
    Male,
    /// `input[value="-1"]`
    Custom,
}

impl Gender {
    /// All options in page order
    pub const ALL: [Self; 3] = [Self::Female, Self::Male, Self::Custom];

    /// Radio `value` attribute for this option
    #[must_use]
    pub const fn option_value(self) -> &'static str {
        match self {
            Self::Female => "1",
            Self::Male => "2",
            Self::Custom => "-1",
        }
    }

    /// Display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "1" => Ok(Self::Female),
            "male" | "2" => Ok(Self::Male),
            "custom" | "-1" => Ok(Self::Custom),
            other => Err(ProbeError::InvalidFormData {
                message: format!("unknown gender {other:?}"),
            }),
        }
    }
}

/// Calendar month as shown in the month dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    /// Three-letter abbreviation
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }

    /// 1-based month number
    #[must_use]
    pub const fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Value of the matching `<option>` ("1".."12")
    #[must_use]
    pub fn option_value(self) -> String {
        self.number().to_string()
    }

    /// Month for a 1-based number
    #[must_use]
    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.get(number.checked_sub(1)? as usize).copied()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Month {
    type Err = ProbeError;

    /// Accepts `Jan`..`Dec` (any case) or `1`..`12`
    fn from_str(s: &str) -> ProbeResult<Self> {
        let s = s.trim();
        let by_name = Self::ALL
            .iter()
            .find(|m| m.abbreviation().eq_ignore_ascii_case(s))
            .copied();
        by_name
            .or_else(|| s.parse::<u32>().ok().and_then(Self::from_number))
            .ok_or_else(|| ProbeError::InvalidFormData {
                message: format!("unknown month {s:?}"),
            })
    }
}

/// Date of birth as three dropdown selections
///
/// Day and year are kept as the literal option values; the date is not
/// checked against the calendar, so `29 Feb 2001` is representable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOfBirth {
    /// Day option value ("1".."31")
    pub day: String,
    /// Month
    pub month: Month,
    /// Year option value
    pub year: String,
}

impl DateOfBirth {
    /// Build from literal parts, parsing the month
    pub fn new(day: impl Into<String>, month: &str, year: impl Into<String>) -> ProbeResult<Self> {
        Ok(Self {
            day: day.into(),
            month: month.parse()?,
            year: year.into(),
        })
    }
}

impl fmt::Display for DateOfBirth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.day, self.month, self.year)
    }
}

/// Complete set of values for one signup attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupFormData {
    pub first_name: String,
    pub surname: String,
    pub date_of_birth: DateOfBirth,
    /// `None` leaves every gender radio unselected
    pub gender: Option<Gender>,
    pub email: String,
    pub password: String,
}

impl SignupFormData {
    /// Assemble form data
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        surname: impl Into<String>,
        date_of_birth: DateOfBirth,
        gender: Option<Gender>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            date_of_birth,
            gender,
            email: email.into(),
            password: password.into(),
        }
    }

    /// Copy with a different first name
    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    /// Copy with a different surname
    #[must_use]
    pub fn with_surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = surname.into();
        self
    }

    /// Copy with a different gender selection
    #[must_use]
    pub const fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }
}
