pub mod block;
pub mod document;
pub mod parser;
pub mod source;
pub mod writer;

use std::io::BufRead;

pub use crate::block::{BlockHeader, BlockKind};
pub use crate::document::{Attributes, Document, GLOBAL_BLOCK};
pub use crate::parser::{ErrorKind, MARKERS, Markers, ParseError, Position};

use crate::source::{ReaderLines, StrLines};

/// Load a BMX document from a whole string.
///
/// An empty string is rejected as an input failure before any parsing
/// happens; use [`loads`] when an empty source should produce an empty
/// document.
pub fn load(text: &str) -> Result<Document, ParseError> {
    if text.is_empty() {
        return Err(ParseError::input(
            "failed to load BMX data from an empty string",
        ));
    }
    parser::parse(StrLines::new(text))
}

/// Load a BMX document from a buffered reader, one line at a time.
pub fn loads<R: BufRead>(reader: R) -> Result<Document, ParseError> {
    parser::parse(ReaderLines::new(reader))
}

/// Serialize a document back to BMX syntax.
pub fn dumps(document: &Document) -> String {
    writer::write_document(document)
}
