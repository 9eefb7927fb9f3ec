use strata_dtype::{DType, Nullability};
use strata_error::{StrataResult, strata_bail};

use crate::compare::{BatchComparer, Operator, select_rows};
use crate::{Batch, RowRemapper};

/// Compares booleans. Booleans have no ordering, so only equality is supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolComparer;

impl BoolComparer {
    fn select(
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
        equal: bool,
    ) -> StrataResult<()> {
        let lhs = left.as_bool()?;
        let rhs = right.as_bool()?;
        select_rows(left, right, result, |l, r| (lhs[l] == rhs[r]) == equal)
    }

    fn unordered(&self, operator: Operator) -> StrataResult<()> {
        strata_bail!(NotImplemented: format!("operator {operator}"), self.dtype())
    }
}

impl BatchComparer for BoolComparer {
    fn dtype(&self) -> DType {
        DType::Bool(Nullability::NonNullable)
    }

    fn where_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, true)
    }

    fn where_not_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, false)
    }

    fn where_less_than(
        &self,
        _left: &Batch<'_>,
        _right: &Batch<'_>,
        _result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.unordered(Operator::Lt)
    }

    fn where_less_than_or_equal(
        &self,
        _left: &Batch<'_>,
        _right: &Batch<'_>,
        _result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.unordered(Operator::Lte)
    }

    fn where_greater_than(
        &self,
        _left: &Batch<'_>,
        _right: &Batch<'_>,
        _result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.unordered(Operator::Gt)
    }

    fn where_greater_than_or_equal(
        &self,
        _left: &Batch<'_>,
        _right: &Batch<'_>,
        _result: &mut RowRemapper,
    ) -> StrataResult<()> {
        self.unordered(Operator::Gte)
    }

    fn supports(&self, operator: Operator) -> bool {
        matches!(operator, Operator::Eq | Operator::NotEq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArrayView, Scalar};

    #[test]
    fn equality_only() {
        let values = [true, false, true];
        let left = Batch::full(ArrayView::Bool(&values));
        let scalar = Scalar::from(true);

        let mut result = RowRemapper::new();
        BoolComparer.where_equals(&left, &scalar.as_batch(3), &mut result).unwrap();
        assert_eq!(result.indices(), &[0, 2]);

        result.clear();
        BoolComparer.where_not_equals(&left, &scalar.as_batch(3), &mut result).unwrap();
        assert_eq!(result.indices(), &[1]);

        assert!(
            BoolComparer
                .where_greater_than(&left, &scalar.as_batch(3), &mut result)
                .is_err()
        );
        assert!(!BoolComparer.supports(Operator::Gte));
    }
}
