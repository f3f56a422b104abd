//! Runs fixtures through the highlighter and checks the results.

use std::path::Path;

use layered_highlight::{HighlightOutcome, Highlighter};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::failures::{ExpectedFailures, FailureState, HarnessResult};
use crate::fixture::HighlightFixture;
use crate::formatter::{format_failure, format_summary};
use crate::loader::{load_all_fixtures, EXPECTED_FAILURES_FILE};
use crate::SpecResult;

/// Outcome of one expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Name of the checked expectation (`markup`, `max_depth`, ...).
    pub check: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

impl CheckResult {
    fn compare<T: PartialEq + ToString>(check: &str, expected: T, actual: T) -> Self {
        Self {
            check: check.to_string(),
            passed: expected == actual,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Rendering of a fixture together with its checks.
#[derive(Debug, Clone)]
pub struct FixtureRun {
    pub markup: String,
    pub outcome: HighlightOutcome,
    pub checks: Vec<CheckResult>,
}

impl FixtureRun {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

/// Render a fixture and check it against its expectations.
pub fn run_fixture(fixture: &HighlightFixture) -> SpecResult<FixtureRun> {
    let config = fixture.config();
    let tag_name = config.tag_name.clone();
    let highlighter = Highlighter::new(config);

    let mut out = Vec::new();
    let outcome = highlighter.highlight(fixture.text.as_bytes(), &fixture.intervals, &mut out)?;
    let markup = String::from_utf8_lossy(&out).into_owned();

    let mut checks = Vec::new();
    let balance = check_balance(&markup, &tag_name);
    checks.push(CheckResult {
        check: "balanced".to_string(),
        expected: "balanced".to_string(),
        passed: balance.is_ok(),
        actual: balance.err().unwrap_or_else(|| "balanced".to_string()),
    });

    let expect = &fixture.expect;
    if let Some(expected) = &expect.markup {
        checks.push(CheckResult::compare("markup", expected.as_str(), markup.as_str()));
    }
    if let Some(expected) = expect.max_depth {
        checks.push(CheckResult::compare("max_depth", expected, outcome.max_depth));
    }
    if let Some(expected) = expect.truncated {
        checks.push(CheckResult::compare("truncated", expected, outcome.truncated));
    }
    if let Some(expected) = expect.splits {
        checks.push(CheckResult::compare("splits", expected, outcome.splits));
    }

    Ok(FixtureRun {
        markup,
        outcome,
        checks,
    })
}

/// Any element, opening or closing. A missing `>` marks an unterminated tag.
static TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)[^<>]*(>)?").expect("Invalid tag regex")
});

/// Checks that every `<tag_name ...>` has a matching close.
///
/// Other elements (line breaks, style blocks) are ignored.
pub fn check_balance(markup: &str, tag_name: &str) -> Result<(), String> {
    let mut depth = 0usize;

    for caps in TAG.captures_iter(markup) {
        let at = caps.get(0).map_or(0, |m| m.start());
        if caps.get(3).is_none() {
            return Err(format!("unterminated tag at byte {}", at));
        }
        if &caps[2] != tag_name {
            continue;
        }
        if caps[1].is_empty() {
            depth += 1;
        } else {
            depth = depth
                .checked_sub(1)
                .ok_or_else(|| format!("close without open at byte {}", at))?;
        }
    }

    if depth == 0 {
        Ok(())
    } else {
        Err(format!("{} tag(s) left open", depth))
    }
}

/// Run every fixture in `dir`, classifying failures with the
/// expected-failures ledger found next to them.
///
/// Returns the tally and a printable report.
pub fn run_all(dir: &Path) -> SpecResult<(HarnessResult, String)> {
    let expected = ExpectedFailures::load(&dir.join(EXPECTED_FAILURES_FILE))?;
    let mut result = HarnessResult::new();
    let mut report = String::new();

    for (name, fixture) in load_all_fixtures(dir)? {
        let run = run_fixture(&fixture)?;
        let mut fixture_result = HarnessResult::new();

        for check in &run.checks {
            if check.passed {
                fixture_result.record_pass();
                continue;
            }
            let state = expected.is_expected(&name, &check.check);
            fixture_result.record_failure(state);
            if state == FailureState::Regression {
                report.push_str(&format_failure(&name, &fixture, check));
            }
        }

        tracing::debug!(fixture = %name, passed = fixture_result.passed, "ran fixture");
        report.push_str(&format_summary(&name, &fixture_result));
        result.merge(&fixture_result);
    }

    Ok((result, report))
}
