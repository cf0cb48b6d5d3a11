use std::fmt::Write as _;

use crate::metadata::{FieldValue, Metadata, KNOWN_FIELDS};

use super::scalar::{render_item, render_text};

/// Renders the `---` block: known fields in their fixed order, then the rest
/// in the order they were read.
pub(super) fn render_header(metadata: &Metadata) -> String {
    let mut out = String::from("---\n");
    for name in KNOWN_FIELDS {
        if let Some(value) = metadata.get(name) {
            push_field(&mut out, name, value);
        }
    }
    for (name, value) in metadata.iter() {
        if !KNOWN_FIELDS.contains(&name) {
            push_field(&mut out, name, value);
        }
    }
    out.push_str("---\n");
    out
}

fn push_field(out: &mut String, name: &str, value: &FieldValue) {
    match value {
        FieldValue::List(items) => {
            let _ = writeln!(out, "{name}:");
            for item in items {
                let _ = writeln!(out, "  - {}", render_item(item));
            }
        }
        FieldValue::Bool(b) => {
            let _ = writeln!(out, "{name}: {b}");
        }
        FieldValue::Text(s) => {
            let _ = writeln!(out, "{name}: {}", render_text(s));
        }
        // kept verbatim
        FieldValue::Block(lines) => {
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
        }
    }
}
