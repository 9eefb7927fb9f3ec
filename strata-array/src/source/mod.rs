//! The pull-based batch source contract, and its extension methods.

use log::trace;
use strata_dtype::Schema;
use strata_error::{StrataResult, strata_bail, strata_err};

use crate::Batch;
use crate::compare::Operator;
use crate::filter::WhereSource;
use crate::scalar::Scalar;

mod memory;

pub use memory::*;

/// An accessor for one column of a [`BatchSource`].
///
/// Obtained once through [`BatchSource::column_getter`] and then passed to
/// [`BatchSource::batch`] after every pull. It performs no I/O and always reflects the batch
/// produced by the most recent [`BatchSource::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnGetter {
    column: usize,
}

impl ColumnGetter {
    /// An accessor for `column`. Sources validate the index in [`BatchSource::column_getter`];
    /// implementations of that method call this.
    pub fn new(column: usize) -> Self {
        Self { column }
    }

    /// The column index within the source's schema.
    pub fn column(&self) -> usize {
        self.column
    }
}

/// A stateful cursor over a table, producing one batch per column on each pull.
///
/// Nothing downstream of a source runs until a caller pulls with [`BatchSource::next`]. The
/// batches it hands out borrow the source, so they are only valid until the next pull: the
/// source is free to reuse and overwrite their storage.
///
/// Wrapping sources (writers, filters, transforms) own exactly one inner source, forward
/// [`columns`](BatchSource::columns), [`reset`](BatchSource::reset) and
/// [`dispose`](BatchSource::dispose), and do their own work in [`next`](BatchSource::next).
pub trait BatchSource {
    /// The ordered columns, stable until the next [`BatchSource::reset`].
    fn columns(&self) -> &Schema;

    /// An accessor for the column at `column_index`.
    fn column_getter(&self, column_index: usize) -> StrataResult<ColumnGetter> {
        let column_count = self.columns().len();
        if column_index >= column_count {
            strata_bail!(OutOfBounds: column_index, 0, column_count);
        }
        Ok(ColumnGetter::new(column_index))
    }

    /// The current batch of the column behind `getter`.
    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>>;

    /// Produce up to `desired_count` rows and return how many were produced.
    ///
    /// Zero means the end of the data; once returned, every further call returns zero until
    /// [`BatchSource::reset`]. Never returns more than `desired_count`.
    fn next(&mut self, desired_count: usize) -> StrataResult<usize>;

    /// Rewind to the initial state, re-deriving the schema.
    fn reset(&mut self) -> StrataResult<()>;

    /// Release owned resources. Calling it again is a no-op.
    fn dispose(&mut self) -> StrataResult<()>;
}

impl<S: BatchSource + ?Sized> BatchSource for Box<S> {
    fn columns(&self) -> &Schema {
        (**self).columns()
    }

    fn column_getter(&self, column_index: usize) -> StrataResult<ColumnGetter> {
        (**self).column_getter(column_index)
    }

    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>> {
        (**self).batch(getter)
    }

    fn next(&mut self, desired_count: usize) -> StrataResult<usize> {
        (**self).next(desired_count)
    }

    fn reset(&mut self) -> StrataResult<()> {
        (**self).reset()
    }

    fn dispose(&mut self) -> StrataResult<()> {
        (**self).dispose()
    }
}

/// Extension methods composing and driving [`BatchSource`]s.
pub trait BatchSourceExt: BatchSource {
    /// Pull batches of `batch_size` rows until the source is exhausted, returning the total
    /// number of rows.
    fn run(&mut self, batch_size: usize) -> StrataResult<usize> {
        if batch_size == 0 {
            strata_bail!("batch size must be positive");
        }
        let mut total = 0;
        loop {
            let count = self.next(batch_size)?;
            if count == 0 {
                trace!("source exhausted after {total} rows");
                return Ok(total);
            }
            total += count;
        }
    }

    /// Keep only the rows where `column <operator> value` holds.
    fn filter(
        self,
        column: &str,
        operator: Operator,
        value: Scalar,
    ) -> StrataResult<WhereSource<Self>>
    where
        Self: Sized,
    {
        let column_index = self
            .columns()
            .index_of(column)
            .ok_or_else(|| strata_err!("no column named '{}'", column))?;
        WhereSource::try_new(self, column_index, operator, value)
    }

    /// Erase the concrete source type.
    fn boxed<'a>(self) -> Box<dyn BatchSource + 'a>
    where
        Self: Sized + 'a,
    {
        Box::new(self)
    }
}

impl<S: BatchSource + ?Sized> BatchSourceExt for S {}
