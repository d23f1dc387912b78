mod attribute;
pub mod error;
mod header;
pub mod markers;
mod structural;

pub use error::{ErrorKind, ParseError, Position};
pub use markers::{MARKERS, Markers, trim};
pub use structural::parse;
