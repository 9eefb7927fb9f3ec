use strata_dtype::NativePType;

use crate::{Array, ArrayView, Scalar};

/// A native type that has its own [`ArrayView`], [`Array`] and [`Scalar`] variants.
pub trait NativeValue: NativePType {
    /// View a slice of values as column storage.
    fn view(values: &[Self]) -> ArrayView<'_>;

    /// The slice behind `view`, if it holds this type.
    fn try_from_view(view: ArrayView<'_>) -> Option<&[Self]>;

    /// Wrap owned values as an array.
    fn into_array(values: Vec<Self>) -> Array;

    /// Wrap one value as a scalar.
    fn into_scalar(self) -> Scalar;
}

macro_rules! native_value {
    ($T:ty, $variant:ident) => {
        impl NativeValue for $T {
            #[inline]
            fn view(values: &[Self]) -> ArrayView<'_> {
                ArrayView::$variant(values)
            }

            #[inline]
            fn try_from_view(view: ArrayView<'_>) -> Option<&[Self]> {
                match view {
                    ArrayView::$variant(values) => Some(values),
                    _ => None,
                }
            }

            fn into_array(values: Vec<Self>) -> Array {
                Array::$variant(values)
            }

            fn into_scalar(self) -> Scalar {
                Scalar::$variant(self)
            }
        }
    };
}

native_value!(u8, U8);
native_value!(u32, U32);
native_value!(u64, U64);
native_value!(i32, I32);
native_value!(i64, I64);
native_value!(f32, F32);
native_value!(f64, F64);
