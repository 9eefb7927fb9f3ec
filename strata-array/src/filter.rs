//! A source decorator keeping only the rows that satisfy a comparison against a constant.

use log::{debug, trace};
use strata_dtype::Schema;
use strata_error::{StrataResult, strata_err};

use crate::compare::{BatchComparer, CompareFn, Operator, comparer_for};
use crate::source::{BatchSource, ColumnGetter};
use crate::{Batch, RowRemapper, Scalar, Selection};

/// Filters an inner source by `column <operator> value`.
///
/// Each pull evaluates the predicate on the inner batch of the filtered column, then projects
/// every column through the matching rows. Matches keep their original order.
#[derive(Debug)]
pub struct WhereSource<S> {
    inner: S,
    column: ColumnGetter,
    operator: Operator,
    value: Scalar,
    comparer: Box<dyn BatchComparer>,
    compare: CompareFn,
    remapper: RowRemapper,
    selections: Vec<Vec<usize>>,
    count: usize,
}

impl<S: BatchSource> WhereSource<S> {
    /// Filter `inner` on the column at `column_index`.
    ///
    /// Fails if the value's type differs from the column's, or if the column's type does not
    /// support `operator`.
    pub fn try_new(
        inner: S,
        column_index: usize,
        operator: Operator,
        value: Scalar,
    ) -> StrataResult<Self> {
        let column = inner.column_getter(column_index)?;
        let dtype = *inner.columns().column(column_index)?.dtype();
        if !value.is_compatible(&dtype) {
            return Err(strata_err!(MismatchedTypes: dtype, value.dtype()));
        }
        let comparer = comparer_for(&dtype);
        let compare = comparer.try_build(operator)?;
        let selections = vec![Vec::new(); inner.columns().len()];

        Ok(Self {
            inner,
            column,
            operator,
            value,
            comparer,
            compare,
            remapper: RowRemapper::new(),
            selections,
            count: 0,
        })
    }

    /// The wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the inner source.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn clear(&mut self) {
        self.remapper.clear();
        self.selections.iter_mut().for_each(Vec::clear);
        self.count = 0;
    }
}

impl<S: BatchSource> BatchSource for WhereSource<S> {
    fn columns(&self) -> &Schema {
        self.inner.columns()
    }

    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>> {
        let selection = self
            .selections
            .get(getter.column())
            .ok_or_else(|| strata_err!(OutOfBounds: getter.column(), 0, self.selections.len()))?;
        let inner = self.inner.batch(getter)?;
        Batch::try_new(inner.array(), Selection::Indices(selection), self.count)
    }

    fn next(&mut self, desired_count: usize) -> StrataResult<usize> {
        loop {
            self.clear();
            if self.inner.next(desired_count)? == 0 {
                return Ok(0);
            }

            let left = self.inner.batch(self.column)?;
            let right = self.value.as_batch(left.count());
            (self.compare)(self.comparer.as_ref(), &left, &right, &mut self.remapper)?;
            if self.remapper.is_empty() {
                trace!(
                    "no rows of {} matched {} {}",
                    left.count(),
                    self.operator,
                    self.value
                );
                continue;
            }

            for (index, selection) in self.selections.iter_mut().enumerate() {
                let batch = self.inner.batch(ColumnGetter::new(index))?;
                self.remapper.remap_into(&batch, selection);
            }
            self.count = self.remapper.len();
            trace!("{} of {} rows matched", self.count, left.count());
            return Ok(self.count);
        }
    }

    fn reset(&mut self) -> StrataResult<()> {
        self.inner.reset()?;
        self.clear();
        self.selections.resize_with(self.inner.columns().len(), Vec::new);
        self.column = self.inner.column_getter(self.column.column())?;
        Ok(())
    }

    fn dispose(&mut self) -> StrataResult<()> {
        if !self.selections.is_empty() {
            debug!("disposing filter on {} {}", self.operator, self.value);
            self.selections = Vec::new();
            self.remapper = RowRemapper::new();
            self.count = 0;
        }
        self.inner.dispose()
    }
}

#[cfg(test)]
mod tests {
    use strata_dtype::{ColumnDetails, DType, Nullability, PType};

    use super::*;
    use crate::Array;
    use crate::source::{ArraySource, BatchSourceExt};

    fn source() -> ArraySource {
        let schema = Schema::from_iter([
            ColumnDetails::new("n", PType::I32.into(), false),
            ColumnDetails::new("s", DType::Utf8(Nullability::NonNullable), true),
        ]);
        ArraySource::try_new(
            schema,
            vec![
                Array::from_values(vec![5i32, 3, 5, 8, 1]),
                Array::utf8(["a", "b", "c", "d", "e"]).unwrap(),
            ],
        )
        .unwrap()
    }

    fn drain(source: &mut impl BatchSource, batch_size: usize) -> Vec<(i32, Vec<u8>)> {
        let n = source.column_getter(0).unwrap();
        let s = source.column_getter(1).unwrap();
        let mut rows = Vec::new();
        while source.next(batch_size).unwrap() > 0 {
            let numbers = source.batch(n).unwrap().primitive_values::<i32>().unwrap();
            let strings = source.batch(s).unwrap().utf8_values().unwrap();
            rows.extend(numbers.zip(strings.map(<[u8]>::to_vec)));
        }
        rows
    }

    #[test]
    fn keeps_matching_rows_in_order() {
        let mut filtered = source().filter("n", Operator::Eq, Scalar::primitive(5i32)).unwrap();
        assert_eq!(
            drain(&mut filtered, 2),
            vec![(5, b"a".to_vec()), (5, b"c".to_vec())]
        );
        assert_eq!(filtered.next(2).unwrap(), 0);
    }

    #[test]
    fn skips_batches_without_matches() {
        let mut filtered = source().filter("n", Operator::Gt, Scalar::primitive(7i32)).unwrap();
        assert_eq!(filtered.next(2).unwrap(), 1);
        assert_eq!(filtered.next(2).unwrap(), 0);
        assert_eq!(filtered.next(2).unwrap(), 0);
    }

    #[test]
    fn filters_compose_and_reset() {
        let mut filtered = source()
            .filter("n", Operator::Lte, Scalar::primitive(5i32))
            .unwrap()
            .filter("s", Operator::NotEq, Scalar::utf8("c").unwrap())
            .unwrap();
        let expected = vec![(5, b"a".to_vec()), (3, b"b".to_vec()), (1, b"e".to_vec())];
        assert_eq!(drain(&mut filtered, 3), expected);

        filtered.reset().unwrap();
        assert_eq!(drain(&mut filtered, 1), expected);
    }

    #[test]
    fn rejects_bad_predicates() {
        assert!(source().filter("missing", Operator::Eq, Scalar::primitive(1i32)).is_err());
        assert!(source().filter("n", Operator::Eq, Scalar::primitive(1i64)).is_err());
        assert!(source().filter("n", Operator::Contains, Scalar::primitive(1i32)).is_err());
    }

    #[test]
    fn dispose_forwards_and_is_idempotent() {
        let mut filtered = source().filter("n", Operator::Eq, Scalar::primitive(5i32)).unwrap();
        filtered.dispose().unwrap();
        filtered.dispose().unwrap();
        assert_eq!(filtered.next(5).unwrap(), 0);
        assert_eq!(filtered.inner().row_count(), 0);
    }
}
