//! Row-level comparison of two batches, producing the matching rows of the left one.

use core::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use log::debug;
use strata_dtype::{DType, match_each_native_ptype};
use strata_error::{StrataError, StrataResult, strata_bail, strata_err};

use crate::{Batch, RowRemapper};

mod boolean;
mod primitive;
mod utf8;

pub use boolean::*;
pub use primitive::*;
pub use utf8::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// The left value begins with the right one.
    StartsWith,
    /// The left value contains the right one.
    Contains,
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.symbol(), f)
    }
}

impl FromStr for Operator {
    type Err = StrataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "=" | "==" => Operator::Eq,
            "!=" | "<>" => Operator::NotEq,
            ">" => Operator::Gt,
            ">=" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" => Operator::Lte,
            "|>" => Operator::StartsWith,
            ":" => Operator::Contains,
            _ => strata_bail!("unknown operator '{}'", s),
        })
    }
}

impl Operator {
    fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::StartsWith => "|>",
            Operator::Contains => ":",
        }
    }

    /// Whether the operator is one of the six ordering comparisons.
    pub fn is_relational(self) -> bool {
        !matches!(self, Operator::StartsWith | Operator::Contains)
    }

    /// The operator that gives the same result with the operands exchanged.
    ///
    /// String matching is not symmetric, so it has no swapped form.
    pub fn swap(self) -> Option<Self> {
        Some(match self {
            Operator::Eq => Operator::Eq,
            Operator::NotEq => Operator::NotEq,
            Operator::Gt => Operator::Lt,
            Operator::Gte => Operator::Lte,
            Operator::Lt => Operator::Gt,
            Operator::Lte => Operator::Gte,
            Operator::StartsWith | Operator::Contains => return None,
        })
    }

    /// The predicate of a relational operator over single values.
    pub fn to_fn<T: PartialEq + PartialOrd>(self) -> Option<fn(T, T) -> bool> {
        let f: fn(T, T) -> bool = match self {
            Operator::Eq => |l, r| l == r,
            Operator::NotEq => |l, r| l != r,
            Operator::Gt => |l, r| l > r,
            Operator::Gte => |l, r| l >= r,
            Operator::Lt => |l, r| l < r,
            Operator::Lte => |l, r| l <= r,
            Operator::StartsWith | Operator::Contains => return None,
        };
        Some(f)
    }
}

/// A comparison entry point of a [`BatchComparer`], chosen once per operator by
/// [`BatchComparer::try_build`] and then applied to every batch.
pub type CompareFn =
    fn(&dyn BatchComparer, &Batch<'_>, &Batch<'_>, &mut RowRemapper) -> StrataResult<()>;

/// Evaluates comparisons between a left and a right batch of one type.
///
/// Every method appends the logical rows of `left` where the comparison holds to `result`, in
/// ascending order. Both batches must have the same number of rows, unless `right` is a
/// broadcast constant. Selections on either side are respected.
pub trait BatchComparer: Debug {
    /// The type of values this comparer reads.
    fn dtype(&self) -> DType;

    fn where_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()>;

    fn where_not_equals(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()>;

    fn where_less_than(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()>;

    fn where_less_than_or_equal(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()>;

    fn where_greater_than(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()>;

    fn where_greater_than_or_equal(
        &self,
        left: &Batch<'_>,
        right: &Batch<'_>,
        result: &mut RowRemapper,
    ) -> StrataResult<()>;

    fn where_starts_with(
        &self,
        _left: &Batch<'_>,
        _right: &Batch<'_>,
        _result: &mut RowRemapper,
    ) -> StrataResult<()> {
        strata_bail!(NotImplemented: format!("operator {}", Operator::StartsWith), self.dtype())
    }

    fn where_contains(
        &self,
        _left: &Batch<'_>,
        _right: &Batch<'_>,
        _result: &mut RowRemapper,
    ) -> StrataResult<()> {
        strata_bail!(NotImplemented: format!("operator {}", Operator::Contains), self.dtype())
    }

    /// Whether `operator` can be evaluated on this comparer's type.
    fn supports(&self, operator: Operator) -> bool {
        operator.is_relational()
    }

    /// Resolve `operator` to the method evaluating it, failing if it is unsupported.
    fn try_build(&self, operator: Operator) -> StrataResult<CompareFn> {
        if !self.supports(operator) {
            debug!("{} comparer rejected operator {}", self.dtype(), operator);
            strata_bail!(NotImplemented: format!("operator {operator}"), self.dtype());
        }
        let f: CompareFn = match operator {
            Operator::Eq => |c, l, r, out| c.where_equals(l, r, out),
            Operator::NotEq => |c, l, r, out| c.where_not_equals(l, r, out),
            Operator::Gt => |c, l, r, out| c.where_greater_than(l, r, out),
            Operator::Gte => |c, l, r, out| c.where_greater_than_or_equal(l, r, out),
            Operator::Lt => |c, l, r, out| c.where_less_than(l, r, out),
            Operator::Lte => |c, l, r, out| c.where_less_than_or_equal(l, r, out),
            Operator::StartsWith => |c, l, r, out| c.where_starts_with(l, r, out),
            Operator::Contains => |c, l, r, out| c.where_contains(l, r, out),
        };
        Ok(f)
    }
}

/// The comparer for values of `dtype`, ignoring nullability.
pub fn comparer_for(dtype: &DType) -> Box<dyn BatchComparer> {
    match dtype {
        DType::Bool(_) => Box::new(BoolComparer),
        DType::Utf8(_) => Box::new(Utf8Comparer),
        DType::Primitive(ptype, _) => match_each_native_ptype!(ptype, |$T| {
            Box::new(PrimitiveComparer::<$T>::new())
        }),
    }
}

/// Append every logical row of `left` for which `matches(left_slot, right_slot)` holds.
fn select_rows(
    left: &Batch<'_>,
    right: &Batch<'_>,
    result: &mut RowRemapper,
    mut matches: impl FnMut(usize, usize) -> bool,
) -> StrataResult<()> {
    if !right.is_broadcast() && right.count() != left.count() {
        return Err(strata_err!(
            "cannot compare {} rows against {} rows",
            left.count(),
            right.count()
        ));
    }
    for row in 0..left.count() {
        if matches(left.index(row), right.index(row)) {
            result.add(row);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strata_dtype::{Nullability, PType};

    use super::*;
    use crate::{ArrayView, Scalar, Selection};

    fn evaluate(operator: Operator, values: &[i32], value: i32) -> Vec<usize> {
        let comparer = comparer_for(&PType::I32.into());
        let compare = comparer.try_build(operator).unwrap();
        let scalar = Scalar::primitive(value);
        let mut result = RowRemapper::new();
        compare(
            comparer.as_ref(),
            &Batch::full(ArrayView::I32(values)),
            &scalar.as_batch(values.len()),
            &mut result,
        )
        .unwrap();
        result.indices().to_vec()
    }

    #[rstest]
    #[case(Operator::Eq, vec![0, 2])]
    #[case(Operator::NotEq, vec![1, 3, 4])]
    #[case(Operator::Gt, vec![3])]
    #[case(Operator::Gte, vec![0, 2, 3])]
    #[case(Operator::Lt, vec![1, 4])]
    #[case(Operator::Lte, vec![0, 1, 2, 4])]
    fn relational_operators(#[case] operator: Operator, #[case] expected: Vec<usize>) {
        assert_eq!(evaluate(operator, &[5, 3, 5, 8, 1], 5), expected);
    }

    #[rstest]
    #[case(Operator::Eq)]
    #[case(Operator::NotEq)]
    #[case(Operator::Gt)]
    #[case(Operator::Gte)]
    #[case(Operator::Lt)]
    #[case(Operator::Lte)]
    #[case(Operator::StartsWith)]
    #[case(Operator::Contains)]
    fn display_round_trips(#[case] operator: Operator) {
        assert_eq!(operator.to_string().parse::<Operator>().unwrap(), operator);
    }

    #[test]
    fn unsupported_operator_is_named() {
        let comparer = comparer_for(&PType::I64.into());
        let err = comparer.try_build(Operator::StartsWith).unwrap_err();
        assert!(matches!(err, StrataError::NotImplemented(..)));
        assert!(err.to_string().contains("operator |>"));

        let comparer = comparer_for(&DType::Bool(Nullability::Nullable));
        let err = comparer.try_build(Operator::Lt).unwrap_err();
        assert!(err.to_string().contains("operator <"));
    }

    #[test]
    fn respects_left_selection() {
        let values = [1i32, 9, 2, 9, 3];
        let selection = [4usize, 3, 1, 0];
        let left =
            Batch::try_new(ArrayView::I32(&values), Selection::Indices(&selection), 4).unwrap();
        let scalar = Scalar::primitive(9i32);

        let comparer = comparer_for(&PType::I32.into());
        let mut result = RowRemapper::new();
        comparer
            .where_equals(&left, &scalar.as_batch(4), &mut result)
            .unwrap();
        assert_eq!(result.indices(), &[1, 2]);
    }

    #[test]
    fn column_against_column() {
        let left = [1u64, 5, 3];
        let right = [2u64, 5, 1];
        let comparer = comparer_for(&PType::U64.into());
        let mut result = RowRemapper::new();
        comparer
            .where_greater_than_or_equal(
                &Batch::full(ArrayView::U64(&left)),
                &Batch::full(ArrayView::U64(&right)),
                &mut result,
            )
            .unwrap();
        assert_eq!(result.indices(), &[1, 2]);

        let short = [1u64];
        assert!(
            comparer
                .where_equals(
                    &Batch::full(ArrayView::U64(&left)),
                    &Batch::full(ArrayView::U64(&short)),
                    &mut RowRemapper::new(),
                )
                .is_err()
        );
    }

    #[test]
    fn swap_keeps_meaning() {
        for operator in [Operator::Gt, Operator::Gte, Operator::Lt, Operator::Lte] {
            let f = operator.to_fn::<i32>().unwrap();
            let swapped = operator.swap().and_then(Operator::to_fn::<i32>).unwrap();
            assert_eq!(f(1, 2), swapped(2, 1));
        }
        assert_eq!(Operator::Contains.swap(), None);
        assert!(Operator::Contains.to_fn::<i32>().is_none());
    }
}
