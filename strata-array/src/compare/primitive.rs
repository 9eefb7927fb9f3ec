use std::marker::PhantomData;

use strata_dtype::DType;
use strata_error::StrataResult;

use crate::compare::{BatchComparer, select_rows};
use crate::{Batch, NativeValue, RowRemapper};

/// Compares fixed-width native values with their own ordering.
///
/// Floats follow IEEE 754 comparison, so `NaN` matches nothing but `!=`.
#[derive(Debug)]
pub struct PrimitiveComparer<T>(PhantomData<T>);

impl<T: NativeValue> PrimitiveComparer<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }

    #[inline]
    fn select(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
        predicate: impl Fn(T, T) -> bool,
    ) -> StrataResult<()> {
        let lhs = left.as_primitive::<T>()?;
        let rhs = right.as_primitive::<T>()?;
        select_rows(left, right, result, |l, r| predicate(lhs[l], rhs[r]))
    }
}

impl<T: NativeValue> Default for PrimitiveComparer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NativeValue> BatchComparer for PrimitiveComparer<T> {
    fn dtype(&self) -> DType {
        T::PTYPE.into()
    }

    fn where_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.select(left, right, result, |l, r| l == r)
    }

    fn where_not_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.select(left, right, result, |l, r| l != r)
    }

    fn where_less_than(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.select(left, right, result, |l, r| l < r)
    }

    fn where_less_than_or_equal(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.select(left, right, result, |l, r| l <= r)
    }

    fn where_greater_than(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.select(left, right, result, |l, r| l > r)
    }

    fn where_greater_than_or_equal(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.select(left, right, result, |l, r| l >= r)
    }
}
