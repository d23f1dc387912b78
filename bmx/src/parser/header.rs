use crate::block::{BlockHeader, BlockKind};
use crate::parser::error::LineError;
use crate::parser::markers::{MARKERS, last_char_offset, trim};

/// Parse a line starting with `[` into a block name and kind.
///
/// Anything after the last `]` is not inspected.
pub(crate) fn parse_header(line: &str) -> Result<BlockHeader<'_>, LineError> {
    let body = line
        .strip_prefix(MARKERS.block_begin)
        .ok_or_else(|| LineError::new(0, "block declaration must start with '['"))?;
    let begin_len = MARKERS.block_begin.len_utf8();

    let end = body
        .rfind(MARKERS.block_end)
        .ok_or_else(|| LineError::new(last_char_offset(line), "block declaration isn't closed"))?;
    let inner = &body[..end];

    if let Some(stray) = inner.find([MARKERS.block_begin, MARKERS.block_end]) {
        return Err(LineError::new(
            begin_len + stray,
            "unexpected bracket in block declaration",
        ));
    }

    let name = trim(inner);
    if name.is_empty() {
        return Err(LineError::new(begin_len + end, "block's name cannot be empty"));
    }

    let header = if let Some(name) = name.strip_prefix(MARKERS.attribute) {
        BlockHeader {
            name,
            kind: BlockKind::Attribute,
        }
    } else if let Some(name) = name.strip_prefix(MARKERS.comment) {
        BlockHeader {
            name,
            kind: BlockKind::Comment,
        }
    } else {
        BlockHeader {
            name,
            kind: BlockKind::Text,
        }
    };
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, kind: BlockKind) -> BlockHeader<'_> {
        BlockHeader { name, kind }
    }

    #[test]
    fn block_kinds() {
        assert_eq!(parse_header("[body]"), Ok(header("body", BlockKind::Text)));
        assert_eq!(parse_header("[@meta]"), Ok(header("meta", BlockKind::Attribute)));
        assert_eq!(parse_header("[#notes]"), Ok(header("notes", BlockKind::Comment)));
    }

    #[test]
    fn name_is_trimmed_before_marker_check() {
        assert_eq!(parse_header("[  @meta  ]"), Ok(header("meta", BlockKind::Attribute)));
        assert_eq!(parse_header("[ two words ]"), Ok(header("two words", BlockKind::Text)));
    }

    #[test]
    fn only_one_marker_is_stripped() {
        assert_eq!(parse_header("[@@x]"), Ok(header("@x", BlockKind::Attribute)));
        assert_eq!(parse_header("[#@x]"), Ok(header("@x", BlockKind::Comment)));
        assert_eq!(parse_header("[@ x]"), Ok(header(" x", BlockKind::Attribute)));
    }

    #[test]
    fn trailing_text_after_close_is_accepted() {
        assert_eq!(parse_header("[body] trailing"), Ok(header("body", BlockKind::Text)));
    }

    #[test]
    fn unclosed_points_at_last_character() {
        let err = parse_header("[@a").unwrap_err();
        assert_eq!(err, LineError::new(2, "block declaration isn't closed"));

        let err = parse_header("[").unwrap_err();
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn stray_bracket_inside_header() {
        let err = parse_header("[a[b]").unwrap_err();
        assert_eq!(err, LineError::new(2, "unexpected bracket in block declaration"));

        let err = parse_header("[a]b]").unwrap_err();
        assert_eq!(err, LineError::new(2, "unexpected bracket in block declaration"));
    }

    #[test]
    fn empty_name() {
        let err = parse_header("[   ]").unwrap_err();
        assert_eq!(err, LineError::new(4, "block's name cannot be empty"));
        assert!(parse_header("[]").is_err());
    }
}
