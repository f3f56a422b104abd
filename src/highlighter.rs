//! Entry point wiring the pipeline stages together for one call.

use std::io::{Read, Write};

use crate::decorator::OutputDecorator;
use crate::interval::normalize;
use crate::nesting::{HighlightOutcome, HighlightSession};
use crate::reader::ChunkReader;
use crate::style::style_sheet;
use crate::{Annotation, HighlightConfig, HighlightResult};

/// Renders documents with their annotation intervals as nested markup.
///
/// A `Highlighter` only holds configuration; every call gets its own
/// session, so one instance can serve concurrent calls.
///
/// # Example
///
/// ```
/// use layered_highlight::{AnnotationInterval, HighlightConfig, Highlighter};
///
/// let highlighter = Highlighter::new(HighlightConfig::markup_only());
/// let intervals = vec![AnnotationInterval::new(0, 5).with_class("entity")];
/// let markup = highlighter.highlight_str("Alice met Bob", &intervals).unwrap();
/// assert_eq!(markup, r#"<span class="entity">Alice</span> met Bob"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Streams `reader` through the engine into `sink`.
    ///
    /// Intervals are validated before anything is read or written. On an
    /// I/O or payload error, whatever reached `sink` is incomplete.
    pub fn highlight<R, W, A>(&self, reader: R, intervals: &[A], sink: W) -> HighlightResult<HighlightOutcome>
    where
        R: Read,
        W: Write,
        A: Annotation,
    {
        self.run(ChunkReader::new(reader, self.config.chunk_size), 0, intervals, sink)
    }

    /// Renders an in-memory document to a `String`, style block included
    /// when enabled.
    pub fn highlight_str<A: Annotation>(&self, text: &str, intervals: &[A]) -> HighlightResult<String> {
        self.highlight_segment(text, 0, intervals)
    }

    /// Renders one externally segmented piece of a larger document.
    ///
    /// `base_offset` is the global offset of the segment's first character;
    /// intervals keep their document-global offsets and are clipped to the
    /// segment.
    pub fn highlight_segment<A: Annotation>(
        &self,
        text: &str,
        base_offset: usize,
        intervals: &[A],
    ) -> HighlightResult<String> {
        let reader = ChunkReader::new(text.as_bytes(), self.config.chunk_size).starting_at(base_offset);
        let mut out = Vec::with_capacity(text.len());
        self.run(reader, base_offset, intervals, &mut out)?;
        // only whole `str` slices and escapes are ever written
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn run<R, W, A>(
        &self,
        mut reader: ChunkReader<R>,
        start_offset: usize,
        intervals: &[A],
        sink: W,
    ) -> HighlightResult<HighlightOutcome>
    where
        R: Read,
        W: Write,
        A: Annotation,
    {
        self.config.validate()?;
        let ordered = normalize(intervals)?;

        let mut session = HighlightSession::new(
            ordered,
            start_offset,
            self.config.max_length,
            &self.config.tag_name,
            &self.config.truncation_notice,
        );
        let mut decorated = OutputDecorator::new(sink, &self.config.line_break_marker);

        while !session.is_done() {
            match reader.next_chunk()? {
                Some(chunk) => session.process_chunk(&chunk, &mut decorated)?,
                None => break,
            }
        }
        let outcome = session.finish(&mut decorated)?;
        let mut sink = decorated.finish()?;

        if self.config.emit_style && outcome.max_depth > 0 {
            let css = style_sheet(outcome.max_depth, &self.config.style);
            write!(sink, "<style>\n{}</style>", css)?;
            sink.flush()?;
        }

        Ok(outcome)
    }
}
