use std::fmt;

/// How the body lines of a block are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Body lines are kept verbatim.
    Text,
    /// Body lines are `@key: value` declarations.
    Attribute,
    /// Body lines are discarded.
    Comment,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Text => write!(f, "text"),
            BlockKind::Attribute => write!(f, "attribute"),
            BlockKind::Comment => write!(f, "comment"),
        }
    }
}

/// A parsed `[...]` declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader<'a> {
    /// The block name with its kind marker stripped.
    pub name: &'a str,
    pub kind: BlockKind,
}
