use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::writer;

/// Name of the implicit attribute block holding declarations that appear
/// before the first block header.
pub const GLOBAL_BLOCK: &str = "__global__";

/// Attribute entries of a single block, ordered by key.
pub type Attributes = BTreeMap<String, String>;

/// A parsed BMX document.
///
/// Text and attribute blocks live in separate maps, but block names are
/// unique across both. Comment blocks never reach the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Text block name -> accumulated body, each line followed by `\n`.
    pub texts: BTreeMap<String, String>,
    /// Attribute block name -> key/value entries.
    pub attributes: BTreeMap<String, Attributes>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.attributes.is_empty()
    }

    /// Whether `name` is already used by a text or attribute block.
    pub fn contains_block(&self, name: &str) -> bool {
        self.texts.contains_key(name) || self.attributes.contains_key(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    pub fn attribute_block(&self, block: &str) -> Option<&Attributes> {
        self.attributes.get(block)
    }

    pub fn attribute(&self, block: &str, key: &str) -> Option<&str> {
        self.attributes
            .get(block)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    /// Every block name in ascending order, text and attribute blocks merged.
    pub fn block_names(&self) -> BTreeSet<&str> {
        self.texts
            .keys()
            .chain(self.attributes.keys())
            .map(String::as_str)
            .collect()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writer::write_to(f, self)
    }
}
