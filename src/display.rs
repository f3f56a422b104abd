use crate::Annotation;
use std::collections::HashMap;
use std::fmt::Write;
use unicode_width::UnicodeWidthChar;

/// Convert a zero-based index to a base-26 label: A, B, ..., Z, AA, AB, ..., AZ, BA, ...
/// Similar to Excel column naming.
fn index_to_base26_label(mut n: usize) -> String {
    let mut result = String::new();
    loop {
        let remainder = n % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Internal representation of an included interval for display.
struct IncludedInterval {
    start: usize,
    end: usize,
    label: String,
    identifier: Option<String>,
}

/// Debug view of intervals drawn under the text they cover.
///
/// Not the highlighter output: this is for eyeballing interval layouts in
/// tests and failure reports. Intervals sharing an identifier get the same
/// `[A]`-style label.
pub struct IntervalDisplay<'a> {
    text: &'a str,
    include_intervals: Vec<IncludedInterval>,
}

//  first second third
//  ╰───╯[A] first
//      ╰──╯[B] t se
//               ╰───╯ third
impl<'a> std::fmt::Display for IntervalDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // display column at which each character starts, plus one past the end
        let mut char_idx_to_display_col = Vec::new();
        let mut opening_line = String::new();
        let mut col = 0;
        for c in self.text.chars() {
            char_idx_to_display_col.push(col);
            let shown = match c {
                '\n' => '↵',
                '\t' | '\r' => ' ',
                other => other,
            };
            opening_line.push(shown);
            col += UnicodeWidthChar::width(shown).unwrap_or(0);
        }
        char_idx_to_display_col.push(col);

        f.write_str(&opening_line)?;

        let id_labels = self.build_identifier_labels();
        let last = char_idx_to_display_col.len() - 1;

        for interval in self.include_intervals.iter() {
            f.write_char('\n')?;

            let start_col = char_idx_to_display_col[interval.start.min(last)];
            let end_col = char_idx_to_display_col[interval.end.min(last)];
            for _ in 0..start_col {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_col.saturating_sub(start_col) > 1 {
                f.write_char('╯')?;
            }

            match interval.identifier.as_ref().and_then(|id| id_labels.get(id)) {
                Some(label) => write!(f, "{} ", label)?,
                None => f.write_char(' ')?,
            }

            f.write_str(&interval.label)?;
        }

        Ok(())
    }
}

impl<'a> IntervalDisplay<'a> {
    pub fn new(text: &'a str) -> Self {
        IntervalDisplay {
            text,
            include_intervals: Vec::new(),
        }
    }

    /// Map from identifiers to labels like "[A]", "[B]", in order of
    /// first appearance.
    fn build_identifier_labels(&self) -> HashMap<String, String> {
        let mut labels = HashMap::new();
        for identifier in self
            .include_intervals
            .iter()
            .filter_map(|interval| interval.identifier.as_ref())
        {
            if !labels.contains_key(identifier) {
                let label = format!("[{}]", index_to_base26_label(labels.len()));
                labels.insert(identifier.clone(), label);
            }
        }
        labels
    }

    /// Adds one interval, labeled with its css classes (or its title when
    /// it has none).
    pub fn include<A: Annotation + ?Sized>(&mut self, annotation: &A) {
        let label = if annotation.css_classes().is_empty() {
            annotation.title().unwrap_or_default().to_string()
        } else {
            annotation.css_classes().join(" ")
        };
        self.include_intervals.push(IncludedInterval {
            start: annotation.start(),
            end: annotation.end(),
            label,
            identifier: annotation.identifier().map(str::to_string),
        });
    }

    /// Adds every interval, in the given order.
    pub fn include_all<A: Annotation>(&mut self, annotations: &[A]) {
        for annotation in annotations {
            self.include(annotation);
        }
    }

    /// Takes self
    pub fn with<A: Annotation + ?Sized>(mut self, annotation: &A) -> Self {
        self.include(annotation);
        self
    }

    /// Takes self, includes every interval
    pub fn with_all<A: Annotation>(mut self, annotations: &[A]) -> Self {
        self.include_all(annotations);
        self
    }
}
