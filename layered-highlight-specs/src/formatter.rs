//! Failure and summary formatting.

use layered_highlight::IntervalDisplay;
use std::fmt::Write;

use crate::failures::HarnessResult;
use crate::fixture::HighlightFixture;
use crate::runner::CheckResult;

/// Format a failed check with the fixture's interval layout.
pub fn format_failure(fixture_name: &str, fixture: &HighlightFixture, check: &CheckResult) -> String {
    let mut output = String::new();

    writeln!(output, "FAIL: {} ({})", fixture_name, fixture.display_title()).unwrap();
    writeln!(output).unwrap();

    let layout = IntervalDisplay::new(&fixture.text).with_all(&fixture.intervals);
    for line in layout.to_string().lines() {
        writeln!(output, "  {}", line).unwrap();
    }
    writeln!(output).unwrap();

    writeln!(output, "  check `{}` failed", check.check).unwrap();
    writeln!(output, "    expected: {}", check.expected).unwrap();
    writeln!(output, "    actual:   {}", check.actual).unwrap();

    output
}

/// Format the tally for one fixture.
pub fn format_summary(fixture_name: &str, result: &HarnessResult) -> String {
    let status = if result.success() { "PASS" } else { "FAIL" };
    format!(
        "{}: {}\n  {} passed, {} failed ({} expected, {} regressions)\n",
        status,
        fixture_name,
        result.passed,
        result.failed(),
        result.expected_failures,
        result.regressions
    )
}
