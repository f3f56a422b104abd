//! Opening and closing tags for annotation spans.

use std::io::Write;

use crate::escape::write_escaped;
use crate::{Annotation, HighlightError, HighlightResult};

/// Full opening tag: classes, title, info payload and identifier.
pub fn write_open_full<W, A>(out: &mut W, tag_name: &str, annotation: &A) -> HighlightResult<()>
where
    W: Write + ?Sized,
    A: Annotation + ?Sized,
{
    // serialize first so a failing payload leaves no half-written tag
    let info = annotation
        .info_json()
        .map_err(|source| HighlightError::Payload {
            identifier: annotation.identifier().map(str::to_string),
            source,
        })?;

    write!(out, "<{}", tag_name)?;
    write_class_attr(out, annotation.css_classes())?;
    if let Some(title) = annotation.title() {
        write_attr(out, "title", title)?;
    }
    if let Some(info) = &info {
        write_attr(out, "data-info", info)?;
    }
    if let Some(identifier) = annotation.identifier() {
        write_attr(out, "data-ref-id", identifier)?;
    }
    out.write_all(b">")?;
    Ok(())
}

/// Back-reference opening tag for an identifier already rendered in full.
pub fn write_open_reference<W, A>(out: &mut W, tag_name: &str, annotation: &A) -> HighlightResult<()>
where
    W: Write + ?Sized,
    A: Annotation + ?Sized,
{
    write!(out, "<{}", tag_name)?;
    write_class_attr(out, annotation.css_classes())?;
    if let Some(identifier) = annotation.identifier() {
        write_attr(out, "data-ref", identifier)?;
    }
    out.write_all(b">")?;
    Ok(())
}

pub fn write_close<W: Write + ?Sized>(out: &mut W, tag_name: &str) -> HighlightResult<()> {
    write!(out, "</{}>", tag_name)?;
    Ok(())
}

fn write_class_attr<W: Write + ?Sized>(out: &mut W, classes: &[String]) -> std::io::Result<()> {
    if classes.is_empty() {
        return Ok(());
    }
    out.write_all(b" class=\"")?;
    for (idx, class) in classes.iter().enumerate() {
        if idx > 0 {
            out.write_all(b" ")?;
        }
        write_escaped(out, class)?;
    }
    out.write_all(b"\"")
}

fn write_attr<W: Write + ?Sized>(out: &mut W, name: &str, value: &str) -> std::io::Result<()> {
    write!(out, " {}=\"", name)?;
    write_escaped(out, value)?;
    out.write_all(b"\"")
}
