//! Line sources feeding the parser.
//!
//! Both adapters yield lines without their terminator; `\n` and `\r\n` are
//! treated alike.

use std::borrow::Cow;
use std::io::{self, BufRead};

use crate::parser::ParseError;

/// One raw line pulled from a source, or the read failure that ended it.
pub type Line<'a> = Result<Cow<'a, str>, ParseError>;

/// Lines of an in-memory string. Borrows every line, never fails.
#[derive(Debug, Clone)]
pub struct StrLines<'a> {
    inner: std::str::Lines<'a>,
}

impl<'a> StrLines<'a> {
    pub fn new(text: &'a str) -> Self {
        StrLines {
            inner: text.lines(),
        }
    }
}

impl<'a> Iterator for StrLines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|line| Ok(Cow::Borrowed(line)))
    }
}

/// Lines of a buffered reader, read on demand.
#[derive(Debug)]
pub struct ReaderLines<R> {
    inner: io::Lines<R>,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        ReaderLines {
            inner: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for ReaderLines<R> {
    type Item = Line<'static>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|line| {
            line.map(Cow::Owned)
                .map_err(|e| ParseError::input(format!("failed to read line: {}", e)))
        })
    }
}
