//! Markup escaping for literal text and attribute values.

use std::io::{self, Write};

/// Replacement for a character that must not appear raw in markup.
fn escaped(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Writes `text` to `out`, escaping markup-significant characters.
pub fn write_escaped<W: Write + ?Sized>(out: &mut W, text: &str) -> io::Result<()> {
    let mut last = 0;
    for (idx, c) in text.char_indices() {
        if let Some(replacement) = escaped(c) {
            out.write_all(text[last..idx].as_bytes())?;
            out.write_all(replacement.as_bytes())?;
            last = idx + c.len_utf8();
        }
    }
    out.write_all(text[last..].as_bytes())
}

/// Returns an escaped copy of `text`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match escaped(c) {
            Some(replacement) => out.push_str(replacement),
            None => out.push(c),
        }
    }
    out
}
