//! Fixture file format.
//!
//! A fixture is a TOML document naming a text, the intervals to overlay on
//! it, the highlighter options, and what the rendering must look like:
//!
//! ```toml
//! title = "Crossing pair"
//! text = "first second"
//!
//! [options]
//! chunk_size = 4
//!
//! [[intervals]]
//! start = 0
//! end = 5
//! css_classes = ["entity"]
//!
//! [expect]
//! max_depth = 1
//! ```

use layered_highlight::{AnnotationInterval, HighlightConfig};
use serde::{Deserialize, Serialize};

use crate::{SpecError, SpecResult};

/// A parsed fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightFixture {
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    #[serde(default)]
    pub intervals: Vec<AnnotationInterval>,
    #[serde(default)]
    pub options: FixtureOptions,
    #[serde(default)]
    pub expect: FixtureExpectations,
}

/// Highlighter options a fixture may override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureOptions {
    pub chunk_size: Option<usize>,
    pub max_length: Option<usize>,
    /// Style blocks are off unless a fixture asks for them.
    pub emit_style: bool,
}

/// What a rendering is checked against. Absent fields are not checked;
/// tag balance is always checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureExpectations {
    pub markup: Option<String>,
    pub max_depth: Option<usize>,
    pub truncated: Option<bool>,
    pub splits: Option<usize>,
}

impl HighlightFixture {
    /// Highlighter configuration for this fixture.
    pub fn config(&self) -> HighlightConfig {
        let mut config = HighlightConfig::default().with_style(self.options.emit_style);
        if let Some(chunk_size) = self.options.chunk_size {
            config = config.with_chunk_size(chunk_size);
        }
        if let Some(max_length) = self.options.max_length {
            config = config.with_max_length(max_length);
        }
        config
    }

    /// Title, or a placeholder when the fixture has none.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Parse a fixture from TOML.
pub fn parse_fixture(content: &str) -> SpecResult<HighlightFixture> {
    toml::from_str(content).map_err(|e| SpecError::Parse {
        message: e.to_string(),
    })
}
