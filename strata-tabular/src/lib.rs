//! Batch sources over delimited text.
//!
//! A [`TabularReader`] tokenizes text into rows of transient byte cells. A
//! [`TabularFileReader`] pulls rows from one, copies every cell into an arena, and serves them as
//! string batches.

pub use delimited::*;
pub use reader::*;

mod delimited;
mod reader;

use strata_error::StrataResult;

/// A row-at-a-time tokenizer over tabular text.
pub trait TabularReader {
    /// The ordered column names.
    fn columns(&self) -> &[String];

    /// Advance to the next row, returning whether there was one.
    fn next_row(&mut self) -> StrataResult<bool>;

    /// The cell of `column` in the current row, empty if the row is short.
    ///
    /// The bytes are only valid until the next call to [`TabularReader::next_row`].
    fn current(&self, column: usize) -> &[u8];
}
