//! Assertions used by test bodies.
//!
//! Every helper returns an [`AssertionResult`]; `check()` turns a failed
//! result into [`ProbeError::AssertionFailed`] so bodies can use `?`.

use crate::result::{ProbeError, ProbeResult};
use regex::Regex;
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message, empty on success
    pub message: String,
}

impl AssertionResult {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
        }
    }

    /// Convert into a `ProbeResult`
    pub fn check(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::assertion(self.message))
        }
    }

    /// Replace the failure message with `context: message`
    #[must_use]
    pub fn context(mut self, context: &str) -> Self {
        if !self.passed {
            self.message = format!("{context}: {}", self.message);
        }
        self
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug + ?Sized>(expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {expected:?}, got {actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected {haystack:?} to contain {needle:?}"))
        }
    }

    /// Assert a string matches a regular expression
    #[must_use]
    pub fn matches(value: &str, pattern: &str) -> AssertionResult {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(value) => AssertionResult::pass(),
            Ok(_) => AssertionResult::fail(format!("expected {value:?} to match /{pattern}/")),
            Err(e) => AssertionResult::fail(format!("invalid pattern /{pattern}/: {e}")),
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message)
        }
    }

    /// Assert a condition is false
    #[must_use]
    pub fn is_false(condition: bool, message: &str) -> AssertionResult {
        Self::is_true(!condition, message)
    }

    /// Assert a string has at most `max` characters
    #[must_use]
    pub fn at_most_chars(value: &str, max: usize) -> AssertionResult {
        let len = value.chars().count();
        if len <= max {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!("expected at most {max} characters, got {len}"))
        }
    }

    /// Assert a collection has expected length
    #[must_use]
    pub fn has_length<T>(collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(format!(
                "expected length {expected}, got {}",
                collection.len()
            ))
        }
    }

    /// Assert every entry is non-empty and has no surrounding whitespace
    #[must_use]
    pub fn all_trimmed_non_empty(values: &[String]) -> AssertionResult {
        match values
            .iter()
            .find(|v| v.is_empty() || v.trim().len() != v.len())
        {
            None => AssertionResult::pass(),
            Some(bad) => AssertionResult::fail(format!("expected trimmed non-empty text, got {bad:?}")),
        }
    }

    /// Assert a Result is Ok
    #[must_use]
    pub fn is_ok<T, E: Debug>(result: &Result<T, E>) -> AssertionResult {
        match result {
            Ok(_) => AssertionResult::pass(),
            Err(e) => AssertionResult::fail(format!("expected Ok, got Err({e:?})")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_maps_failure_to_error() {
        assert!(Assertion::equals("a", "a").check().is_ok());
        let err = Assertion::equals("a", "b").check().unwrap_err();
        assert!(matches!(err, ProbeError::AssertionFailed { .. }));
        assert!(err.to_string().contains("expected \"a\", got \"b\""));
    }

    #[test]
    fn test_context_only_on_failure() {
        assert_eq!(Assertion::is_true(true, "x").context("ctx").message, "");
        assert_eq!(
            Assertion::is_true(false, "x").context("ctx").message,
            "ctx: x"
        );
    }

    #[test]
    fn test_matches() {
        assert!(Assertion::matches("Sign up for Facebook | Facebook", "(?i)sign up").passed);
        assert!(!Assertion::matches("Log in", "^Sign").passed);
        let bad = Assertion::matches("x", "(");
        assert!(!bad.passed);
        assert!(bad.message.contains("invalid pattern"));
    }

    #[test]
    fn test_at_most_chars_counts_chars() {
        assert!(Assertion::at_most_chars("é", 1).passed);
        assert!(!Assertion::at_most_chars(&"A".repeat(51), 50).passed);
    }

    #[test]
    fn test_all_trimmed_non_empty() {
        assert!(Assertion::all_trimmed_non_empty(&["a".into(), "b c".into()]).passed);
        assert!(!Assertion::all_trimmed_non_empty(&[" a".into()]).passed);
        assert!(!Assertion::all_trimmed_non_empty(&[String::new()]).passed);
        assert!(Assertion::all_trimmed_non_empty(&[]).passed);
    }

    #[test]
    fn test_has_length_and_is_ok() {
        assert!(Assertion::has_length(&[1, 2], 2).passed);
        assert!(!Assertion::has_length(&[1], 2).passed);
        let r: Result<(), &str> = Err("boom");
        assert!(Assertion::is_ok(&r).message.contains("boom"));
    }
}
