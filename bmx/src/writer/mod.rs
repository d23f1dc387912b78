use std::fmt::{self, Write};

use crate::document::{Attributes, Document, GLOBAL_BLOCK};
use crate::parser::MARKERS;

/// Serialize `document` into a fresh string.
pub fn write_document(document: &Document) -> String {
    document.to_string()
}

/// Serialize `document` into any formatter sink.
///
/// The global attribute block is written first, without a header, so it is
/// read back into the implicit block. Every other block follows in ascending
/// name order.
pub fn write_to<W: Write>(out: &mut W, document: &Document) -> fmt::Result {
    if let Some(globals) = document.attributes.get(GLOBAL_BLOCK) {
        if globals.is_empty() {
            // A headerless empty block would not survive a reload.
            write_header(out, GLOBAL_BLOCK, Some(MARKERS.attribute))?;
        }
        write_attributes(out, globals)?;
    }

    for name in document.block_names() {
        if let Some(text) = document.texts.get(name) {
            write_header(out, name, None)?;
            out.write_str(text)?;
            if !text.is_empty() && !text.ends_with('\n') {
                out.write_char('\n')?;
            }
        } else if name != GLOBAL_BLOCK {
            if let Some(entries) = document.attributes.get(name) {
                write_header(out, name, Some(MARKERS.attribute))?;
                write_attributes(out, entries)?;
            }
        }
    }
    Ok(())
}

fn write_header<W: Write>(out: &mut W, name: &str, marker: Option<char>) -> fmt::Result {
    out.write_char(MARKERS.block_begin)?;
    if let Some(marker) = marker {
        out.write_char(marker)?;
    }
    out.write_str(name)?;
    out.write_char(MARKERS.block_end)?;
    out.write_char('\n')
}

fn write_attributes<W: Write>(out: &mut W, entries: &Attributes) -> fmt::Result {
    for (key, value) in entries {
        if value.is_empty() {
            writeln!(out, "{}{}{}", MARKERS.attribute, MARKERS.empty_declaration, key)?;
        } else if key.starts_with(MARKERS.empty_declaration) {
            // `@!x: v` would read back as an empty declaration.
            writeln!(out, "{} {}{} {}", MARKERS.attribute, key, MARKERS.separator, value)?;
        } else {
            writeln!(out, "{}{}{} {}", MARKERS.attribute, key, MARKERS.separator, value)?;
        }
    }
    Ok(())
}
