use strata_dtype::{DType, Nullability};
use strata_error::StrataResult;

use crate::compare::{BatchComparer, Operator, select_rows};
use crate::{Batch, RowRemapper};

/// Compares byte strings lexicographically by byte value, with no collation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Comparer;

impl Utf8Comparer {
    #[inline]
    fn select(
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
        predicate: impl Fn(&[u8], &[u8]) -> bool,
    ) -> StrataResult<()> {
        let lhs = left.as_utf8()?;
        let rhs = right.as_utf8()?;
        select_rows(left, right, result, |l, r| predicate(lhs.value(l), rhs.value(r)))
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}

impl BatchComparer for Utf8Comparer {
    fn dtype(&self) -> DType {
        DType::Utf8(Nullability::NonNullable)
    }

    fn where_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l == r)
    }

    fn where_not_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l != r)
    }

    fn where_less_than(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l < r)
    }

    fn where_less_than_or_equal(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l <= r)
    }

    fn where_greater_than(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l > r)
    }

    fn where_greater_than_or_equal(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l >= r)
    }

    fn where_starts_with(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, |l, r| l.starts_with(r))
    }

    fn where_contains(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()> {
        Self::select(left, right, result, contains)
    }

    fn supports(&self, _operator: Operator) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::compare::comparer_for;
    use crate::{Array, Scalar};

    #[rstest]
    #[case(Operator::Eq, "b", vec![1])]
    #[case(Operator::Lt, "b", vec![0, 2, 3])]
    #[case(Operator::Gte, "b", vec![1, 4])]
    #[case(Operator::StartsWith, "ab", vec![0, 2])]
    #[case(Operator::StartsWith, "", vec![0, 1, 2, 3, 4])]
    #[case(Operator::Contains, "b", vec![0, 1, 2])]
    #[case(Operator::Contains, "\0", vec![4])]
    fn byte_order_and_matching(
        #[case] operator: Operator,
        #[case] value: &str,
        #[case] expected: Vec<usize>,
    ) {
        let array = Array::utf8(["ab", "b", "abc", "", "c\0"]).unwrap();
        let scalar = Scalar::utf8(value).unwrap();
        let comparer = comparer_for(&Utf8Comparer.dtype());
        let compare = comparer.try_build(operator).unwrap();

        let mut result = RowRemapper::new();
        compare(
            comparer.as_ref(),
            &Batch::full(array.view()),
            &scalar.as_batch(5),
            &mut result,
        )
        .unwrap();
        assert_eq!(result.indices(), expected.as_slice());
    }

    #[test]
    fn non_ascii_compares_by_byte() {
        let array = Array::utf8(["é", "z"]).unwrap();
        let scalar = Scalar::utf8("z").unwrap();
        let mut result = RowRemapper::new();
        Utf8Comparer
            .where_greater_than(&Batch::full(array.view()), &scalar.as_batch(2), &mut result)
            .unwrap();
        assert_eq!(result.indices(), &[0]);
    }
}
