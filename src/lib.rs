#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Streaming overlay of annotation intervals onto text.
//!
//! Given a character stream and a set of possibly overlapping
//! `[start, end)` annotation intervals, the highlighter produces escaped
//! markup in which every annotation is wrapped in tags that nest properly,
//! even where intervals cross. Memory use is bounded by the chunk size and
//! the number of simultaneously overlapping intervals, never by the
//! document size.
//!
//! ## Pipeline
//!
//! - [`interval`] - validates, filters and orders the intervals
//! - [`reader`] - pulls the source in fixed-size character chunks
//! - [`nesting`] - the span nesting engine
//! - [`decorator`] - line breaks and non-breaking-space cleanup
//! - [`style`] - style sheet sized to the nesting depth
//! - [`truncation`] - output length bound
//!
//! ## Example
//!
//! ```
//! use layered_highlight::{AnnotationInterval, HighlightConfig, Highlighter};
//!
//! let intervals = vec![
//!     AnnotationInterval::new(0, 5).with_class("entity").with_identifier("a"),
//!     AnnotationInterval::new(4, 8).with_class("entity").with_identifier("b"),
//! ];
//! let highlighter = Highlighter::new(HighlightConfig::markup_only());
//! let markup = highlighter.highlight_str("first second", &intervals).unwrap();
//!
//! // the crossing pair is split so that tags nest
//! assert_eq!(
//!     markup,
//!     concat!(
//!         r#"<span class="entity" data-ref-id="a">firs"#,
//!         r#"<span class="entity" data-ref-id="b">t</span></span>"#,
//!         r#"<span class="entity" data-ref="b"> se</span>cond"#,
//!     )
//! );
//! ```

mod config;
pub mod decorator;
mod display;
mod error;
pub mod escape;
mod highlighter;
pub mod interval;
pub mod nesting;
pub mod reader;
pub mod style;
pub mod truncation;

pub use config::{HighlightConfig, StyleConfig, DEFAULT_LINE_BREAK_MARKER, DEFAULT_TRUNCATION_NOTICE};
pub use decorator::OutputDecorator;
pub use display::IntervalDisplay;
pub use error::{HighlightError, HighlightResult};
pub use highlighter::Highlighter;
pub use interval::{normalize, Annotation, AnnotationInterval};
pub use nesting::{HighlightOutcome, HighlightSession};
pub use reader::{Chunk, ChunkReader, DEFAULT_CHUNK_SIZE};
pub use style::style_sheet;
