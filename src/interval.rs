//! Annotation intervals and their normalization.
//!
//! An annotation is a half-open `[start, end)` range over document-global
//! character offsets, carrying the display metadata the nesting engine
//! renders into opening tags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{HighlightError, HighlightResult};

/// The capability set the engine needs from an annotation.
///
/// Interval providers can implement this on their own types instead of
/// converting into [`AnnotationInterval`]. The engine only ever borrows
/// annotations.
///
/// # Example
///
/// ```
/// use layered_highlight::Annotation;
///
/// #[derive(Debug)]
/// struct Mention {
///     range: (usize, usize),
///     concept: String,
/// }
///
/// impl Annotation for Mention {
///     fn start(&self) -> usize { self.range.0 }
///     fn end(&self) -> usize { self.range.1 }
///     fn css_classes(&self) -> &[String] { std::slice::from_ref(&self.concept) }
/// }
/// ```
pub trait Annotation {
    /// Inclusive start offset, in characters from the document start.
    fn start(&self) -> usize;

    /// Exclusive end offset, in characters from the document start.
    fn end(&self) -> usize;

    /// Whether the annotation should be rendered at all.
    fn should_highlight(&self) -> bool {
        true
    }

    /// CSS classes of the opening tag, in order.
    fn css_classes(&self) -> &[String];

    /// Optional tooltip title.
    fn title(&self) -> Option<&str> {
        None
    }

    /// Stable identifier shared by every rendered piece of this annotation.
    fn identifier(&self) -> Option<&str> {
        None
    }

    /// Serialized info payload, or `None` when there is nothing to embed.
    fn info_json(&self) -> serde_json::Result<Option<String>> {
        Ok(None)
    }
}

/// A concrete annotation interval, as produced by an annotation provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationInterval {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub css_classes: Vec<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
    /// Opaque structured data, serialized into the primary render only.
    #[serde(default)]
    pub info: BTreeMap<String, serde_json::Value>,
    #[serde(default = "default_should_highlight")]
    pub should_highlight: bool,
}

fn default_should_highlight() -> bool {
    true
}

impl AnnotationInterval {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            css_classes: Vec::new(),
            title: None,
            identifier: None,
            info: BTreeMap::new(),
            should_highlight: true,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.css_classes.push(class.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.info.insert(key.into(), value);
        self
    }

    /// Marks the interval as not to be rendered.
    pub fn hidden(mut self) -> Self {
        self.should_highlight = false;
        self
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Annotation for AnnotationInterval {
    fn start(&self) -> usize {
        self.start
    }

    fn end(&self) -> usize {
        self.end
    }

    fn should_highlight(&self) -> bool {
        self.should_highlight
    }

    fn css_classes(&self) -> &[String] {
        &self.css_classes
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    fn info_json(&self) -> serde_json::Result<Option<String>> {
        if self.info.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&self.info).map(Some)
    }
}

/// Checks that every interval is a well-formed half-open range.
pub fn validate<A: Annotation>(intervals: &[A]) -> HighlightResult<()> {
    for (index, interval) in intervals.iter().enumerate() {
        if interval.end() < interval.start() {
            return Err(HighlightError::MalformedInterval {
                index,
                start: interval.start(),
                end: interval.end(),
            });
        }
    }
    Ok(())
}

/// Validates, filters and orders the intervals for the nesting engine.
///
/// Hidden and zero-length intervals are dropped. The rest are sorted by
/// `start` ascending, then `end` descending so that the longer of two
/// intervals starting together is opened first. The sort is stable: equal
/// `(start, end)` pairs keep the caller's order.
pub fn normalize<A: Annotation>(intervals: &[A]) -> HighlightResult<Vec<&A>> {
    validate(intervals)?;

    let mut ordered: Vec<&A> = intervals
        .iter()
        .filter(|interval| interval.should_highlight())
        .filter(|interval| interval.end() > interval.start())
        .collect();
    ordered.sort_by(|a, b| a.start().cmp(&b.start()).then(b.end().cmp(&a.end())));

    tracing::debug!(
        given = intervals.len(),
        kept = ordered.len(),
        "normalized annotation intervals"
    );

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ranges(ordered: &[&AnnotationInterval]) -> Vec<(usize, usize)> {
        ordered.iter().map(|i| (i.start, i.end)).collect()
    }

    #[test]
    fn sorts_by_start_then_longest_first() {
        let intervals = vec![
            AnnotationInterval::new(4, 8),
            AnnotationInterval::new(0, 3),
            AnnotationInterval::new(0, 5),
            AnnotationInterval::new(2, 3),
        ];
        let ordered = normalize(&intervals).unwrap();
        assert_eq!(ranges(&ordered), vec![(0, 5), (0, 3), (2, 3), (4, 8)]);
    }

    #[test]
    fn identical_ranges_keep_caller_order() {
        let intervals = vec![
            AnnotationInterval::new(1, 4).with_identifier("first"),
            AnnotationInterval::new(0, 9),
            AnnotationInterval::new(1, 4).with_identifier("second"),
        ];
        let ordered = normalize(&intervals).unwrap();
        let ids: Vec<_> = ordered.iter().map(|i| i.identifier.as_deref()).collect();
        assert_eq!(ids, vec![None, Some("first"), Some("second")]);
    }

    #[test]
    fn drops_hidden_and_zero_length() {
        let intervals = vec![
            AnnotationInterval::new(0, 2).hidden(),
            AnnotationInterval::new(3, 3),
            AnnotationInterval::new(1, 2),
        ];
        let ordered = normalize(&intervals).unwrap();
        assert_eq!(ranges(&ordered), vec![(1, 2)]);
    }

    #[test]
    fn rejects_reversed_interval_with_its_index() {
        let intervals = vec![AnnotationInterval::new(0, 2), AnnotationInterval::new(5, 3)];
        match normalize(&intervals) {
            Err(HighlightError::MalformedInterval { index, start, end }) => {
                assert_eq!((index, start, end), (1, 5, 3));
            }
            other => panic!("expected MalformedInterval, got {:?}", other),
        }
    }

    #[test]
    fn hidden_intervals_are_still_validated() {
        let intervals = vec![AnnotationInterval::new(9, 1).hidden()];
        assert!(normalize(&intervals).is_err());
    }

    #[test]
    fn info_json_is_none_when_empty() {
        let plain = AnnotationInterval::new(0, 1);
        assert_eq!(plain.info_json().unwrap(), None);

        let with_info = AnnotationInterval::new(0, 1).with_info("type", json!("person"));
        assert_eq!(
            with_info.info_json().unwrap().as_deref(),
            Some(r#"{"type":"person"}"#)
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let interval: AnnotationInterval =
            serde_json::from_str(r#"{"start": 2, "end": 6, "css_classes": ["entity"]}"#).unwrap();
        assert!(interval.should_highlight);
        assert_eq!(interval.css_classes, vec!["entity".to_string()]);
        assert!(interval.info.is_empty());
    }
}
