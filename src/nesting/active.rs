//! The set of spans currently open in the output.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::Annotation;

/// An annotation that is open at the current scan position.
#[derive(Debug)]
pub struct ActiveSpan<'a, A> {
    pub annotation: &'a A,
    /// Order in which the annotation was first opened.
    pub seq: usize,
}

impl<'a, A: Annotation> ActiveSpan<'a, A> {
    pub fn end(&self) -> usize {
        self.annotation.end()
    }
}

/// Open spans in tag order, plus their end offsets in a min-heap.
///
/// The stack order is the order tags were written, so only the top may be
/// closed without disturbing the others. The heap answers "where does the
/// next span end" without scanning the stack.
#[derive(Debug)]
pub struct ActiveSet<'a, A> {
    stack: Vec<ActiveSpan<'a, A>>,
    ends: BinaryHeap<Reverse<usize>>,
}

impl<'a, A: Annotation> ActiveSet<'a, A> {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            ends: BinaryHeap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Adds a newly opened span.
    pub fn push(&mut self, span: ActiveSpan<'a, A>) {
        self.ends.push(Reverse(span.end()));
        self.stack.push(span);
    }

    /// Puts back a span that was closed early to let another one close.
    /// Its end is still tracked.
    pub fn reopen(&mut self, span: ActiveSpan<'a, A>) {
        self.stack.push(span);
    }

    /// Smallest end offset among the open spans.
    pub fn next_end(&self) -> Option<usize> {
        self.ends.peek().map(|Reverse(end)| *end)
    }

    /// Forgets tracked ends at or before `offset`.
    pub fn discard_ends_through(&mut self, offset: usize) {
        while matches!(self.ends.peek(), Some(Reverse(end)) if *end <= offset) {
            self.ends.pop();
        }
    }

    /// Stack position of the outermost span ending at or before `offset`.
    pub fn lowest_ending_through(&self, offset: usize) -> Option<usize> {
        self.stack.iter().position(|span| span.end() <= offset)
    }

    /// Removes the spans at stack positions `idx..`, outermost first.
    pub fn split_off(&mut self, idx: usize) -> Vec<ActiveSpan<'a, A>> {
        self.stack.split_off(idx)
    }

    /// Removes every span, outermost first.
    pub fn drain_all(&mut self) -> Vec<ActiveSpan<'a, A>> {
        self.ends.clear();
        std::mem::take(&mut self.stack)
    }
}

impl<'a, A: Annotation> Default for ActiveSet<'a, A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnnotationInterval;

    fn span(annotation: &AnnotationInterval, seq: usize) -> ActiveSpan<'_, AnnotationInterval> {
        ActiveSpan { annotation, seq }
    }

    #[test]
    fn next_end_is_smallest() {
        let a = AnnotationInterval::new(0, 9);
        let b = AnnotationInterval::new(1, 4);
        let c = AnnotationInterval::new(2, 6);
        let mut set = ActiveSet::new();
        set.push(span(&a, 0));
        set.push(span(&b, 1));
        set.push(span(&c, 2));

        assert_eq!(set.next_end(), Some(4));
        set.discard_ends_through(4);
        assert_eq!(set.next_end(), Some(6));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn lowest_ending_through_finds_outermost() {
        let a = AnnotationInterval::new(0, 5);
        let b = AnnotationInterval::new(1, 8);
        let c = AnnotationInterval::new(2, 5);
        let mut set = ActiveSet::new();
        set.push(span(&a, 0));
        set.push(span(&b, 1));
        set.push(span(&c, 2));

        assert_eq!(set.lowest_ending_through(5), Some(0));
        assert_eq!(set.lowest_ending_through(4), None);
    }

    #[test]
    fn reopen_does_not_track_end_twice() {
        let a = AnnotationInterval::new(0, 5);
        let mut set = ActiveSet::new();
        set.push(span(&a, 0));
        let popped = set.split_off(0);
        assert!(set.is_empty());
        for s in popped {
            set.reopen(s);
        }
        set.discard_ends_through(5);
        assert_eq!(set.next_end(), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn drain_all_clears_ends() {
        let a = AnnotationInterval::new(0, 5);
        let mut set = ActiveSet::new();
        set.push(span(&a, 0));
        assert_eq!(set.drain_all().len(), 1);
        assert_eq!(set.next_end(), None);
    }
}
