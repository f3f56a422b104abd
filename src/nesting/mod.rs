//! Turns ordered, possibly crossing intervals into well-nested tags.
//!
//! The session walks the document once, chunk by chunk. At every boundary
//! (an interval start or end) it first closes what ends there, then opens
//! what starts there. Closing a span that is not innermost forces the spans
//! opened inside it to close too; those that continue past the boundary are
//! re-opened right after, in back-reference form. Crossing intervals thus
//! end up split into several sibling tags that share an identifier.
//!
//! ```text
//! A = [0, 5)   B = [4, 8)   over "first second"
//!
//! <A>firs<B>t</B></A><B> se</B>cond
//!             ╰─ split at 5, B re-opened
//! ```

mod active;
mod tag;

use std::collections::{HashSet, VecDeque};
use std::io::Write;

use serde::Serialize;

use crate::escape::write_escaped;
use crate::reader::Chunk;
use crate::truncation::{TruncationController, TruncationState};
use crate::{Annotation, HighlightResult};

pub use active::{ActiveSet, ActiveSpan};

/// Summary of a finished highlight call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightOutcome {
    /// Largest number of simultaneously open tags.
    pub max_depth: usize,
    /// Characters pulled from the source.
    pub chars_read: usize,
    /// Characters of source text written to the output.
    pub chars_rendered: usize,
    /// Whether the output was cut at the length limit.
    pub truncated: bool,
    /// Opening tags written, re-opens included.
    pub spans_opened: usize,
    /// Opening tags written to continue a span after a forced close.
    pub splits: usize,
}

/// Per-call state of the nesting engine.
pub struct HighlightSession<'a, A> {
    pending: VecDeque<&'a A>,
    active: ActiveSet<'a, A>,
    /// Identifiers whose full tag was already written.
    rendered: HashSet<&'a str>,
    start_offset: usize,
    /// Global offset of the next character to flush.
    cursor: usize,
    /// Global offset one past the last chunk received.
    global_offset: usize,
    next_seq: usize,
    truncation: TruncationController,
    tag_name: String,
    truncation_notice: String,
    outcome: HighlightOutcome,
}

impl<'a, A: Annotation> HighlightSession<'a, A> {
    /// `ordered` must come from [`normalize`](crate::interval::normalize).
    /// Intervals ending at or before `start_offset` are ignored; those
    /// starting before it open at `start_offset`.
    pub fn new(
        ordered: Vec<&'a A>,
        start_offset: usize,
        max_length: Option<usize>,
        tag_name: &str,
        truncation_notice: &str,
    ) -> Self {
        let pending = ordered
            .into_iter()
            .filter(|annotation| annotation.end() > start_offset)
            .collect();

        Self {
            pending,
            active: ActiveSet::new(),
            rendered: HashSet::new(),
            start_offset,
            cursor: start_offset,
            global_offset: start_offset,
            next_seq: 0,
            truncation: TruncationController::new(max_length, start_offset),
            tag_name: tag_name.to_string(),
            truncation_notice: truncation_notice.to_string(),
            outcome: HighlightOutcome::default(),
        }
    }

    /// True once truncation has completed; no further chunks are needed.
    pub fn is_done(&self) -> bool {
        self.truncation.is_finished()
    }

    pub fn max_depth(&self) -> usize {
        self.outcome.max_depth
    }

    /// Renders one chunk. Chunks must arrive in order and without gaps.
    pub fn process_chunk<W: Write + ?Sized>(&mut self, chunk: &Chunk, out: &mut W) -> HighlightResult<()> {
        if self.is_done() {
            return Ok(());
        }
        debug_assert_eq!(chunk.start, self.cursor, "chunks must be contiguous");

        let mut text = chunk.text.as_str();
        if self.truncation.is_streaming() {
            let limit = self.truncation.clamp(chunk.end());
            text = self.render_through(text, limit, out)?;
            if limit < chunk.end() {
                self.begin_truncation(out)?;
            }
        }
        if self.truncation.state() == TruncationState::Closing {
            self.drain_active(text, chunk.end(), out)?;
        }
        self.global_offset = chunk.end();
        Ok(())
    }

    /// Closes whatever is still open at the end of the input.
    pub fn finish<W: Write + ?Sized>(mut self, out: &mut W) -> HighlightResult<HighlightOutcome> {
        match self.truncation.state() {
            TruncationState::Streaming => self.close_all(out)?,
            TruncationState::Closing => {
                self.close_all(out)?;
                self.write_notice(out)?;
            }
            TruncationState::Finished => {}
        }
        self.outcome.chars_read = self.global_offset - self.start_offset;
        self.outcome.chars_rendered = self.cursor - self.start_offset;
        self.outcome.truncated = self.truncation.triggered();

        tracing::debug!(
            max_depth = self.outcome.max_depth,
            chars = self.outcome.chars_rendered,
            splits = self.outcome.splits,
            truncated = self.outcome.truncated,
            "highlight session finished"
        );
        Ok(self.outcome)
    }

    /// Opens, closes and flushes everything up to `stop`, returning the
    /// unrendered rest of `text`.
    fn render_through<'t, W: Write + ?Sized>(
        &mut self,
        mut text: &'t str,
        stop: usize,
        out: &mut W,
    ) -> HighlightResult<&'t str> {
        while let Some(boundary) = self.next_boundary().filter(|b| *b < stop) {
            text = self.flush_to(text, boundary, out)?;
            self.close_ending_through(boundary, out)?;
            self.open_starting_through(boundary, out)?;
        }
        self.flush_to(text, stop, out)
    }

    /// Past the limit: keeps flushing text and closing spans at their ends,
    /// opening nothing new, until the active set runs empty.
    fn drain_active<W: Write + ?Sized>(&mut self, mut text: &str, stop: usize, out: &mut W) -> HighlightResult<()> {
        while let Some(boundary) = self.active.next_end().filter(|b| *b <= stop) {
            text = self.flush_to(text, boundary, out)?;
            self.close_ending_through(boundary, out)?;
            if self.active.is_empty() {
                return self.write_notice(out);
            }
        }
        self.flush_to(text, stop, out)?;
        Ok(())
    }

    fn next_boundary(&self) -> Option<usize> {
        let next_start = self
            .pending
            .front()
            .map(|annotation| annotation.start().max(self.cursor));
        match (next_start, self.active.next_end()) {
            (Some(start), Some(end)) => Some(start.min(end)),
            (start, end) => start.or(end),
        }
    }

    /// Writes the text between the cursor and `offset`, returning the rest.
    fn flush_to<'t, W: Write + ?Sized>(
        &mut self,
        text: &'t str,
        offset: usize,
        out: &mut W,
    ) -> HighlightResult<&'t str> {
        let count = offset - self.cursor;
        let split = text
            .char_indices()
            .nth(count)
            .map_or(text.len(), |(idx, _)| idx);
        write_escaped(out, &text[..split])?;
        self.cursor = offset;
        Ok(&text[split..])
    }

    fn close_ending_through<W: Write + ?Sized>(&mut self, offset: usize, out: &mut W) -> HighlightResult<()> {
        self.active.discard_ends_through(offset);
        let lowest = match self.active.lowest_ending_through(offset) {
            Some(idx) => idx,
            None => return Ok(()),
        };

        let closed = self.active.split_off(lowest);
        for _ in &closed {
            tag::write_close(out, &self.tag_name)?;
        }

        let mut continuing: Vec<_> = closed.into_iter().filter(|span| span.end() > offset).collect();
        if continuing.is_empty() {
            return Ok(());
        }
        // longest-lived outermost, ties in open order
        continuing.sort_by(|a, b| b.end().cmp(&a.end()).then(a.seq.cmp(&b.seq)));

        tracing::trace!(offset, reopened = continuing.len(), "split crossing spans");
        for span in continuing {
            // continuations never repeat the title or info payload
            tag::write_open_reference(out, &self.tag_name, span.annotation)?;
            self.outcome.spans_opened += 1;
            self.outcome.splits += 1;
            self.active.reopen(span);
        }
        Ok(())
    }

    fn open_starting_through<W: Write + ?Sized>(&mut self, offset: usize, out: &mut W) -> HighlightResult<()> {
        while let Some(annotation) = self.pending.front().copied() {
            if annotation.start() > offset {
                break;
            }
            self.pending.pop_front();

            self.write_open(annotation, out)?;
            let span = ActiveSpan {
                annotation,
                seq: self.next_seq,
            };
            self.next_seq += 1;
            self.active.push(span);
            self.outcome.max_depth = self.outcome.max_depth.max(self.active.len());
        }
        Ok(())
    }

    /// First opening tag of an annotation: the full form, unless another
    /// annotation with the same identifier was already rendered in full.
    fn write_open<W: Write + ?Sized>(&mut self, annotation: &'a A, out: &mut W) -> HighlightResult<()> {
        let primary = match annotation.identifier() {
            Some(identifier) => self.rendered.insert(identifier),
            None => true,
        };
        if primary {
            tag::write_open_full(out, &self.tag_name, annotation)?;
        } else {
            tag::write_open_reference(out, &self.tag_name, annotation)?;
        }
        self.outcome.spans_opened += 1;
        Ok(())
    }

    fn close_all<W: Write + ?Sized>(&mut self, out: &mut W) -> HighlightResult<()> {
        for _ in self.active.drain_all() {
            tag::write_close(out, &self.tag_name)?;
        }
        Ok(())
    }

    fn begin_truncation<W: Write + ?Sized>(&mut self, out: &mut W) -> HighlightResult<()> {
        self.truncation.begin_closing();
        tracing::debug!(
            at = self.cursor,
            limit = ?self.truncation.limit(),
            open = self.active.len(),
            "output limit reached, draining open spans"
        );
        if self.active.is_empty() {
            self.write_notice(out)?;
        }
        Ok(())
    }

    fn write_notice<W: Write + ?Sized>(&mut self, out: &mut W) -> HighlightResult<()> {
        out.write_all(self.truncation_notice.as_bytes())?;
        self.truncation.finish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::normalize;
    use crate::reader::ChunkReader;
    use crate::AnnotationInterval;
    use serde_json::json;

    fn labeled(start: usize, end: usize, label: &str) -> AnnotationInterval {
        AnnotationInterval::new(start, end)
            .with_class(label)
            .with_identifier(label)
    }

    fn render(text: &str, intervals: &[AnnotationInterval], chunk_size: usize) -> (String, HighlightOutcome) {
        let ordered = normalize(intervals).unwrap();
        let mut session = HighlightSession::new(ordered, 0, None, "span", "[cut]");
        let mut reader = ChunkReader::new(text.as_bytes(), chunk_size);
        let mut out = Vec::new();
        while let Some(chunk) = reader.next_chunk().unwrap() {
            session.process_chunk(&chunk, &mut out).unwrap();
        }
        let outcome = session.finish(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), outcome)
    }

    #[test]
    fn crossing_pair_is_split() {
        let intervals = vec![labeled(0, 5, "a"), labeled(4, 8, "b")];
        let (markup, outcome) = render("first second", &intervals, 64);

        insta::assert_snapshot!(markup, @r###"<span class="a" data-ref-id="a">firs<span class="b" data-ref-id="b">t</span></span><span class="b" data-ref="b"> se</span>cond"###);
        assert_eq!(outcome.splits, 1);
        assert_eq!(outcome.spans_opened, 3);
        assert_eq!(outcome.max_depth, 2);
    }

    #[test]
    fn nested_spans_close_innermost_first() {
        let intervals = vec![labeled(2, 4, "inner"), labeled(0, 6, "outer")];
        let (markup, outcome) = render("abcdefgh", &intervals, 64);

        assert_eq!(
            markup,
            r#"<span class="outer" data-ref-id="outer">ab<span class="inner" data-ref-id="inner">cd</span>ef</span>gh"#
        );
        assert_eq!(outcome.splits, 0);
    }

    #[test]
    fn adjacent_spans_are_siblings() {
        let intervals = vec![labeled(0, 2, "x"), labeled(2, 4, "y")];
        let (markup, outcome) = render("abcd", &intervals, 64);

        assert_eq!(
            markup,
            r#"<span class="x" data-ref-id="x">ab</span><span class="y" data-ref-id="y">cd</span>"#
        );
        assert_eq!(outcome.max_depth, 1);
    }

    #[test]
    fn span_continues_across_chunks() {
        let intervals = vec![labeled(2, 7, "s")];
        let (markup, outcome) = render("abcdefghij", &intervals, 4);

        assert_eq!(markup, r#"ab<span class="s" data-ref-id="s">cdefg</span>hij"#);
        assert_eq!(outcome.spans_opened, 1);
        assert_eq!(outcome.chars_read, 10);
    }

    #[test]
    fn span_past_the_end_is_closed() {
        let intervals = vec![labeled(1, 100, "long"), labeled(50, 60, "never")];
        let (markup, outcome) = render("abc", &intervals, 64);

        assert_eq!(markup, r#"a<span class="long" data-ref-id="long">bc</span>"#);
        assert_eq!(outcome.spans_opened, 1);
    }

    #[test]
    fn chains_of_crossings_stay_balanced() {
        let intervals = vec![labeled(0, 4, "a"), labeled(2, 6, "b"), labeled(3, 8, "c")];
        let (markup, outcome) = render("0123456789", &intervals, 3);

        insta::assert_snapshot!(markup, @r###"<span class="a" data-ref-id="a">01<span class="b" data-ref-id="b">2<span class="c" data-ref-id="c">3</span></span></span><span class="c" data-ref="c"><span class="b" data-ref="b">45</span>67</span>89"###);
        assert_eq!(outcome.max_depth, 3);
        assert_eq!(outcome.splits, 2);
    }

    fn render_truncated(text: &str, intervals: &[AnnotationInterval], max_length: usize) -> (String, HighlightOutcome, bool) {
        let ordered = normalize(intervals).unwrap();
        let mut session = HighlightSession::new(ordered, 0, Some(max_length), "span", "[cut]");
        let mut out = Vec::new();
        let chunk = Chunk {
            start: 0,
            text: text.to_string(),
            char_len: text.chars().count(),
        };
        session.process_chunk(&chunk, &mut out).unwrap();
        let done = session.is_done();
        let outcome = session.finish(&mut out).unwrap();
        (String::from_utf8(out).unwrap(), outcome, done)
    }

    #[test]
    fn truncation_lets_open_spans_reach_their_end() {
        let intervals = vec![labeled(3, 7, "t"), labeled(8, 9, "late")];
        let (markup, outcome, done) = render_truncated("abcdefghij", &intervals, 5);

        assert_eq!(markup, r#"abc<span class="t" data-ref-id="t">defg</span>[cut]"#);
        assert!(done);
        assert!(outcome.truncated);
        assert_eq!(outcome.chars_rendered, 7);
        assert_eq!(outcome.spans_opened, 1);
    }

    #[test]
    fn truncation_notice_waits_for_input_end() {
        let intervals = vec![labeled(3, 20, "t")];
        let (markup, outcome, done) = render_truncated("abcdefghij", &intervals, 5);

        assert_eq!(markup, r#"abc<span class="t" data-ref-id="t">defghij</span>[cut]"#);
        assert!(!done);
        assert!(outcome.truncated);
        assert_eq!(outcome.chars_rendered, 10);
    }

    #[test]
    fn crossing_spans_still_split_while_draining() {
        let intervals = vec![labeled(2, 6, "a"), labeled(4, 9, "b")];
        let (markup, outcome, done) = render_truncated("abcdefghij", &intervals, 5);

        insta::assert_snapshot!(markup, @r###"ab<span class="a" data-ref-id="a">cd<span class="b" data-ref-id="b">ef</span></span><span class="b" data-ref="b">ghi</span>[cut]"###);
        assert!(done);
        assert_eq!(outcome.splits, 1);
    }

    #[test]
    fn continuation_without_identifier_omits_payload() {
        let intervals = vec![
            AnnotationInterval::new(0, 5).with_class("a"),
            AnnotationInterval::new(4, 8)
                .with_class("b")
                .with_title("T")
                .with_info("k", json!("v")),
        ];
        let (markup, outcome) = render("first second", &intervals, 64);

        assert_eq!(
            markup,
            r#"<span class="a">firs<span class="b" title="T" data-info="{&quot;k&quot;:&quot;v&quot;}">t</span></span><span class="b"> se</span>cond"#
        );
        assert_eq!(markup.matches("data-info").count(), 1);
        assert_eq!(markup.matches("title=").count(), 1);
        assert_eq!(outcome.splits, 1);
    }

    #[test]
    fn clipped_to_segment_start() {
        let intervals = vec![labeled(0, 12, "before"), labeled(2, 8, "gone")];
        let ordered = normalize(&intervals).unwrap();
        let mut session = HighlightSession::new(ordered, 10, None, "span", "");
        let mut out = Vec::new();
        let chunk = Chunk {
            start: 10,
            text: "wxyz".to_string(),
            char_len: 4,
        };
        session.process_chunk(&chunk, &mut out).unwrap();
        session.finish(&mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<span class="before" data-ref-id="before">wx</span>yz"#
        );
    }
}
