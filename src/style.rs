//! Style sheet sized to the nesting depth of a rendering.
//!
//! Nested annotations each draw an underline; without extra spacing those
//! underlines would be drawn on top of each other. Every depth level gets
//! a rule pushing its underline further down.

use std::fmt::Write;

use crate::StyleConfig;

/// Selector matching an annotation nested `depth` levels deep.
pub fn depth_selector(class: &str, depth: usize) -> String {
    let mut selector = String::new();
    for level in 0..depth {
        if level > 0 {
            selector.push(' ');
        }
        selector.push('.');
        selector.push_str(class);
    }
    selector
}

/// Builds the rules for depths `1..=max_depth`. Empty when nothing nests.
pub fn style_sheet(max_depth: usize, config: &StyleConfig) -> String {
    let mut css = String::new();
    let class = &config.annotation_class;

    for depth in 1..=max_depth {
        let selector = depth_selector(class, depth);
        if depth == 1 {
            // writing to a String cannot fail
            let _ = writeln!(
                css,
                "{} {{ border-bottom: 1px solid {}; }}",
                selector, config.underline_color
            );
            let _ = writeln!(
                css,
                "{}.{} {{ border-bottom: 1px dashed {}; }}",
                selector, config.resolvable_class, config.resolvable_color
            );
        } else {
            let line_height = config.line_height_base + config.line_height_step * (depth - 2) as f32;
            let outset = config.outset_step as usize * (depth - 1);
            let _ = writeln!(
                css,
                "{} {{ line-height: {:.1}em; padding-bottom: {}px; }}",
                selector, line_height, outset
            );
        }
    }

    css
}
