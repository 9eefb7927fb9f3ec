use log::debug;
use strata_dtype::Schema;
use strata_error::{StrataResult, strata_bail, strata_err};

use crate::source::{BatchSource, ColumnGetter};
use crate::{Array, Batch};

/// A source over columns held in memory.
///
/// Every pull hands out the next run of rows as unselected views into the owned arrays, so no
/// values are copied.
#[derive(Debug)]
pub struct ArraySource {
    schema: Schema,
    arrays: Vec<Array>,
    row_count: usize,
    position: usize,
    start: usize,
    count: usize,
}

impl ArraySource {
    /// Create a source over `arrays`, one per column of `schema`, all of the same length.
    pub fn try_new(schema: Schema, arrays: Vec<Array>) -> StrataResult<Self> {
        if schema.len() != arrays.len() {
            strata_bail!(
                "schema has {} columns but {} arrays were given",
                schema.len(),
                arrays.len()
            );
        }
        for (column, array) in schema.iter().zip(arrays.iter()) {
            if !array.dtype().eq_ignore_nullability(column.dtype()) {
                return Err(strata_err!(MismatchedTypes: column.dtype(), array.dtype())
                    .with_context(format!("column '{}'", column.name())));
            }
        }
        let row_count = arrays.first().map_or(0, Array::len);
        if let Some(array) = arrays.iter().find(|a| a.len() != row_count) {
            strata_bail!(
                "column lengths differ: expected {} rows, found {}",
                row_count,
                array.len()
            );
        }

        Ok(Self {
            schema,
            arrays,
            row_count,
            position: 0,
            start: 0,
            count: 0,
        })
    }

    /// The total number of rows.
    pub fn row_count(&self) -> usize {
        self.row_count
    }
}

impl BatchSource for ArraySource {
    fn columns(&self) -> &Schema {
        &self.schema
    }

    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>> {
        let array = self
            .arrays
            .get(getter.column())
            .ok_or_else(|| strata_err!(OutOfBounds: getter.column(), 0, self.arrays.len()))?;
        Batch::all(array.view().slice(self.start..self.start + self.count), self.count)
    }

    fn next(&mut self, desired_count: usize) -> StrataResult<usize> {
        self.start = self.position;
        self.count = desired_count.min(self.row_count - self.position);
        self.position += self.count;
        Ok(self.count)
    }

    fn reset(&mut self) -> StrataResult<()> {
        debug!("rewinding in-memory source of {} rows", self.row_count);
        self.position = 0;
        self.start = 0;
        self.count = 0;
        Ok(())
    }

    fn dispose(&mut self) -> StrataResult<()> {
        if !self.arrays.is_empty() {
            debug!("releasing in-memory source of {} rows", self.row_count);
            self.arrays.clear();
            self.row_count = 0;
            self.position = 0;
            self.start = 0;
            self.count = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use strata_dtype::{ColumnDetails, DType, Nullability, PType};

    use super::*;
    use crate::source::BatchSourceExt;

    fn source() -> ArraySource {
        let schema = Schema::from_iter([
            ColumnDetails::new("n", PType::I32.into(), false),
            ColumnDetails::new("s", DType::Utf8(Nullability::NonNullable), false),
        ]);
        ArraySource::try_new(
            schema,
            vec![
                Array::from_values(vec![1i32, 2, 3, 4, 5]),
                Array::utf8(["a", "b", "c", "d", "e"]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn pulls_in_batches_then_stays_exhausted() {
        let mut source = source();
        let n = source.column_getter(0).unwrap();
        let s = source.column_getter(1).unwrap();

        assert_eq!(source.next(2).unwrap(), 2);
        assert_eq!(
            source.batch(n).unwrap().primitive_values::<i32>().unwrap().collect_vec(),
            vec![1, 2]
        );
        assert_eq!(source.next(2).unwrap(), 2);
        assert_eq!(
            source.batch(s).unwrap().utf8_values().unwrap().collect_vec(),
            vec![&b"c"[..], &b"d"[..]]
        );
        assert_eq!(source.next(2).unwrap(), 1);
        assert_eq!(source.next(2).unwrap(), 0);
        assert_eq!(source.next(2).unwrap(), 0);
        assert_eq!(source.batch(n).unwrap().count(), 0);
    }

    #[test]
    fn reset_rewinds() {
        let mut source = source();
        assert_eq!(source.run(3).unwrap(), 5);
        source.reset().unwrap();
        assert_eq!(source.run(2).unwrap(), 5);
    }

    #[test]
    fn bad_getter_and_mismatched_arrays() {
        let source = source();
        assert!(source.column_getter(2).is_err());

        let schema = Schema::from_iter([ColumnDetails::new("n", PType::I32.into(), false)]);
        assert!(ArraySource::try_new(schema, vec![Array::from_values(vec![1i64])]).is_err());
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut source = source();
        source.dispose().unwrap();
        source.dispose().unwrap();
        assert_eq!(source.next(10).unwrap(), 0);
    }
}
