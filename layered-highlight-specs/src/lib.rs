#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing infrastructure for layered-highlight.
//!
//! Test cases are TOML fixture files naming a text, the intervals overlaid
//! on it, highlighter options, and the expected rendering.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture file format
//! - [`loader`] - Fixture file loading
//! - [`runner`] - Renders fixtures and checks their expectations
//! - [`errors`] - Error types for the fixture harness
//! - [`formatter`] - Failure reports with the interval layout drawn out
//! - [`failures`] - Expected failures tracking via TOML

pub mod errors;
pub mod failures;
pub mod fixture;
pub mod formatter;
pub mod loader;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{parse_fixture, FixtureExpectations, FixtureOptions, HighlightFixture};
pub use formatter::{format_failure, format_summary};
pub use loader::{load_all_fixtures, load_fixture, EXPECTED_FAILURES_FILE};
pub use runner::{check_balance, run_all, run_fixture, CheckResult, FixtureRun};
