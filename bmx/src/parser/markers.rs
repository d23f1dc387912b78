/// The ASCII characters that give BMX lines their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Markers {
    /// Opens a block header: `[`.
    pub block_begin: char,
    /// Closes a block header: `]`.
    pub block_end: char,
    /// Marks an attribute block in a header, and an attribute line in a body: `@`.
    pub attribute: char,
    /// Separates an attribute key from its value: `:`.
    pub separator: char,
    /// Declares an attribute without a value: `!`.
    pub empty_declaration: char,
    /// Marks a comment block in a header: `#`.
    pub comment: char,
}

pub const MARKERS: Markers = Markers {
    block_begin: '[',
    block_end: ']',
    attribute: '@',
    separator: ':',
    empty_declaration: '!',
    comment: '#',
};

/// Strip leading and trailing plain spaces. Tabs and other whitespace are kept.
pub fn trim(s: &str) -> &str {
    s.trim_matches(' ')
}

/// Byte offset of the last character of `line`, or 0 for an empty line.
pub(crate) fn last_char_offset(line: &str) -> usize {
    line.char_indices().next_back().map_or(0, |(i, _)| i)
}
