use crate::parser::error::LineError;
use crate::parser::markers::{MARKERS, last_char_offset, trim};

/// A single `@key: value` or `@!key` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Parse a line starting with `@` inside an attribute block.
///
/// An empty declaration is written `@!key`, or `@key!` when the line has no
/// separator.
pub(crate) fn parse_attribute(line: &str) -> Result<Declaration<'_>, LineError> {
    let body = line
        .strip_prefix(MARKERS.attribute)
        .ok_or_else(|| LineError::new(0, "attribute declaration must start with '@'"))?;
    let marker_len = MARKERS.attribute.len_utf8();

    if let Some(rest) = body.strip_prefix(MARKERS.empty_declaration) {
        let key = trim(rest);
        if key.is_empty() {
            return Err(LineError::new(marker_len, "attribute key is empty"));
        }
        return Ok(Declaration { key, value: "" });
    }

    let Some(separator) = body.find(MARKERS.separator).map(|i| marker_len + i) else {
        // Postfix form of the empty declaration: `@key!`.
        if let Some(key) = trim(body).strip_suffix(MARKERS.empty_declaration) {
            let key = trim(key);
            if key.is_empty() {
                return Err(LineError::new(marker_len, "attribute key is empty"));
            }
            return Ok(Declaration { key, value: "" });
        }
        return Err(LineError::new(
            last_char_offset(line),
            "failed to find separator after attribute's key",
        ));
    };

    let key = trim(&line[marker_len..separator]);
    if key.is_empty() {
        return Err(LineError::new(separator, "attribute's key is empty"));
    }

    let after = separator + MARKERS.separator.len_utf8();
    if after == line.len() {
        return Err(LineError::new(separator, "attribute's value is empty"));
    }

    // Whitespace-only values trim down to an empty value and are accepted.
    let value = trim(&line[after..]);
    Ok(Declaration { key, value })
}
