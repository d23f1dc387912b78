use crate::block::BlockKind;
use crate::document::{Document, GLOBAL_BLOCK};
use crate::parser::attribute::parse_attribute;
use crate::parser::error::{LineError, ParseError};
use crate::parser::header::parse_header;
use crate::parser::markers::MARKERS;
use crate::source::Line;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the block state machine over `lines` and build a document.
///
/// Stops at the first read or syntax error.
pub fn parse<'a, I>(lines: I) -> Result<Document, ParseError>
where
    I: IntoIterator<Item = Line<'a>>,
{
    let mut state = ParseState::new();
    for line in lines {
        let line = line?;
        state.process_line(&line)?;
    }
    Ok(state.finish())
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState {
    document: Document,
    /// Name of the block the next body line belongs to.
    block_name: String,
    block_kind: BlockKind,
    /// 1-based number of the line being processed.
    line_number: usize,
}

impl ParseState {
    fn new() -> Self {
        ParseState {
            document: Document::new(),
            block_name: GLOBAL_BLOCK.to_string(),
            block_kind: BlockKind::Attribute,
            line_number: 1,
        }
    }

    fn process_line(&mut self, line: &str) -> Result<(), ParseError> {
        tracing::trace!(line_number = self.line_number, line, "line");

        if line.starts_with(MARKERS.block_begin) {
            self.enter_block(line)?;
        } else {
            match self.block_kind {
                BlockKind::Comment => {}
                BlockKind::Text => self.push_text(line),
                BlockKind::Attribute => {
                    // Anything that is not a declaration is skipped.
                    if line.starts_with(MARKERS.attribute) {
                        self.declare_attribute(line)?;
                    }
                }
            }
        }

        self.line_number += 1;
        Ok(())
    }

    /// Switch context to the block declared by `line`.
    fn enter_block(&mut self, line: &str) -> Result<(), ParseError> {
        let header = parse_header(line).map_err(|e| self.line_error(line, e))?;

        if self.document.contains_block(header.name) {
            return Err(ParseError::syntax(
                self.line_number,
                line,
                MARKERS.block_begin.len_utf8(),
                format!("block \"{}\" already exists", header.name),
            ));
        }

        // Register right away so empty blocks still show up.
        match header.kind {
            BlockKind::Text => {
                self.document
                    .texts
                    .insert(header.name.to_string(), String::new());
            }
            BlockKind::Attribute => {
                self.document
                    .attributes
                    .insert(header.name.to_string(), Default::default());
            }
            BlockKind::Comment => {}
        }

        tracing::debug!(
            line_number = self.line_number,
            name = header.name,
            kind = %header.kind,
            "entering block"
        );
        self.block_name = header.name.to_string();
        self.block_kind = header.kind;
        Ok(())
    }

    fn push_text(&mut self, line: &str) {
        // Text blocks are registered by `enter_block` before any body line.
        if let Some(body) = self.document.texts.get_mut(&self.block_name) {
            body.push_str(line);
            body.push('\n');
        }
    }

    fn declare_attribute(&mut self, line: &str) -> Result<(), ParseError> {
        let declaration = parse_attribute(line).map_err(|e| self.line_error(line, e))?;

        // The global block only comes into existence with its first entry.
        let entries = self
            .document
            .attributes
            .entry(self.block_name.clone())
            .or_default();

        if entries.contains_key(declaration.key) {
            return Err(ParseError::syntax(
                self.line_number,
                line,
                MARKERS.attribute.len_utf8(),
                format!("attribute \"{}\" already exists", declaration.key),
            ));
        }

        entries.insert(declaration.key.to_string(), declaration.value.to_string());
        Ok(())
    }

    fn line_error(&self, line: &str, error: LineError) -> ParseError {
        ParseError::syntax(self.line_number, line, error.offset, error.message)
    }

    fn finish(self) -> Document {
        tracing::debug!(
            lines = self.line_number - 1,
            texts = self.document.texts.len(),
            attributes = self.document.attributes.len(),
            "parsed document"
        );
        self.document
    }
}
