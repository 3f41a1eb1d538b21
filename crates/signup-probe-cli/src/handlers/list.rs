//! List command handler

use crate::commands::ListArgs;
use crate::error::CliResult;
use signup_probe::{select_cases, specs, TestCase};
use std::fmt::Write as _;

/// Execute the list command
pub fn execute_list(args: &ListArgs) -> CliResult<()> {
    let config = args.source.load()?;
    let grep = args.grep.as_deref().or(config.grep.as_deref());
    let cases = select_cases(specs::all(), grep, false)?;
    print!("{}", render_case_list(&cases));
    Ok(())
}

/// One line per case, then a count
#[must_use]
pub fn render_case_list(cases: &[TestCase]) -> String {
    let mut out = String::new();
    for case in cases {
        let _ = writeln!(out, "{:<14} {}", case.id, case.full_title());
    }
    let _ = writeln!(out, "\n{} test case(s)", cases.len());
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_case() {
        let cases = specs::all();
        let out = render_case_list(&cases);
        assert!(out.contains("TC_FN_001"));
        assert!(out.contains("TC_SUBMIT_005"));
        assert!(out.ends_with(&format!("{} test case(s)\n", cases.len())));
    }

    #[test]
    fn test_filtered_list() {
        let cases = select_cases(specs::all(), Some("tc_dob_"), false).unwrap();
        let out = render_case_list(&cases);
        assert!(out.contains("TC_DOB_001"));
        assert!(!out.contains("TC_FN_001"));
    }
}
