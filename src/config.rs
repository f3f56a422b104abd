//! Highlighter configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::reader::DEFAULT_CHUNK_SIZE;
use crate::{HighlightError, HighlightResult};

/// Notice appended when output is cut short.
pub const DEFAULT_TRUNCATION_NOTICE: &str = r#"<span class="truncated">[…]</span>"#;

/// Marker inserted after every newline of the rendered markup.
pub const DEFAULT_LINE_BREAK_MARKER: &str = "<br>";

/// Configuration for a [`Highlighter`](crate::Highlighter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Characters pulled from the source per chunk.
    pub chunk_size: usize,
    /// Characters of source text after which no new span opens and output
    /// stops once the open ones close (None = unbounded).
    pub max_length: Option<usize>,
    /// Append a `<style>` block sized to the observed nesting depth.
    pub emit_style: bool,
    pub line_break_marker: String,
    pub truncation_notice: String,
    /// Element name used for every annotation tag.
    pub tag_name: String,
    pub style: StyleConfig,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_length: None,
            emit_style: true,
            line_break_marker: DEFAULT_LINE_BREAK_MARKER.to_string(),
            truncation_notice: DEFAULT_TRUNCATION_NOTICE.to_string(),
            tag_name: "span".to_string(),
            style: StyleConfig::default(),
        }
    }
}

impl HighlightConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Markup only: no style block.
    pub fn markup_only() -> Self {
        Self {
            emit_style: false,
            ..Default::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn with_style(mut self, emit_style: bool) -> Self {
        self.emit_style = emit_style;
        self
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> HighlightResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| HighlightError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> HighlightResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| HighlightError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            HighlightError::Config { message } => HighlightError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> HighlightResult<()> {
        if self.chunk_size == 0 {
            return Err(HighlightError::Config {
                message: "chunk_size must be at least 1".to_string(),
            });
        }
        if self.tag_name.is_empty() || !self.tag_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(HighlightError::Config {
                message: format!("tag_name {:?} is not a valid element name", self.tag_name),
            });
        }
        Ok(())
    }
}

/// Parameters of the generated style sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Class every nesting level is selected through.
    pub annotation_class: String,
    /// Class of annotations rendered with a dashed underline.
    pub resolvable_class: String,
    pub underline_color: String,
    pub resolvable_color: String,
    /// Line height at depth 2, in `em`.
    pub line_height_base: f32,
    /// Extra line height per depth beyond 2, in `em`.
    pub line_height_step: f32,
    /// Extra underline offset per depth beyond 1, in `px`.
    pub outset_step: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            annotation_class: "entity".to_string(),
            resolvable_class: "resolvable".to_string(),
            underline_color: "#000".to_string(),
            resolvable_color: "#999".to_string(),
            line_height_base: 1.6,
            line_height_step: 0.3,
            outset_step: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = HighlightConfig::default();
        assert_eq!(config.chunk_size, 512_000);
        assert_eq!(config.max_length, None);
        assert!(config.emit_style);
        assert_eq!(config.tag_name, "span");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = HighlightConfig::from_toml_str(
            r#"
            max_length = 200

            [style]
            annotation_class = "vertex"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_length, Some(200));
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.style.annotation_class, "vertex");
        assert_eq!(config.style.resolvable_class, "resolvable");
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = HighlightConfig::from_toml_str("chunk_size = 0").unwrap_err();
        assert!(matches!(err, HighlightError::Config { .. }));
    }

    #[test]
    fn bad_tag_name_is_rejected() {
        let config = HighlightConfig {
            tag_name: "span onclick".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highlight.toml");
        fs::write(&path, "chunk_size = \"big\"").unwrap();

        let err = HighlightConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("highlight.toml"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highlight.toml");
        fs::write(&path, "emit_style = false\nchunk_size = 64").unwrap();

        let config = HighlightConfig::load(&path).unwrap();
        assert!(!config.emit_style);
        assert_eq!(config.chunk_size, 64);
    }
}
