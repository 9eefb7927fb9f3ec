use std::fmt::{Display, Formatter};

use strata_dtype::{DType, PType, match_each_native_ptype};
use strata_error::{StrataResult, strata_err};

use crate::{ArrayView, Batch, ByteSpan, NativeValue, Selection, Utf8View};

/// An owned byte string together with the single span covering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Scalar {
    value: Vec<u8>,
    span: ByteSpan,
}

impl Utf8Scalar {
    /// Wrap a byte string, failing if it is longer than a span can address.
    pub fn try_new(value: impl Into<Vec<u8>>) -> StrataResult<Self> {
        let value = value.into();
        let span = ByteSpan::try_from_range(0..value.len())?;
        Ok(Self { value, span })
    }

    /// The bytes of the value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    fn view(&self) -> Utf8View<'_> {
        Utf8View::new(std::slice::from_ref(&self.span), &self.value)
    }
}

/// A single owned value, used as the constant side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A boolean
    Bool(bool),
    /// A `u8`
    U8(u8),
    /// A `u32`
    U32(u32),
    /// A `u64`
    U64(u64),
    /// An `i32`
    I32(i32),
    /// An `i64`
    I64(i64),
    /// An `f32`
    F32(f32),
    /// An `f64`
    F64(f64),
    /// A byte string
    Utf8(Utf8Scalar),
}

impl Scalar {
    /// A native value.
    pub fn primitive<T: NativeValue>(value: T) -> Self {
        value.into_scalar()
    }

    /// A byte string.
    pub fn utf8(value: impl Into<Vec<u8>>) -> StrataResult<Self> {
        Utf8Scalar::try_new(value).map(Self::Utf8)
    }

    /// Parse the textual form of a value of type `dtype`.
    pub fn parse(dtype: &DType, text: &str) -> StrataResult<Self> {
        match dtype {
            DType::Bool(_) => text
                .parse::<bool>()
                .map(Self::Bool)
                .map_err(|e| strata_err!("cannot parse '{}' as bool: {}", text, e)),
            DType::Utf8(_) => Self::utf8(text),
            DType::Primitive(ptype, _) => match_each_native_ptype!(ptype, |$T| {
                text.parse::<$T>()
                    .map(Self::primitive)
                    .map_err(|e| strata_err!("cannot parse '{}' as {}: {}", text, ptype, e))
            }),
        }
    }

    /// The non-nullable logical type of the value.
    pub fn dtype(&self) -> DType {
        self.view().dtype()
    }

    /// The value as one storage slot.
    pub fn view(&self) -> ArrayView<'_> {
        match self {
            Self::Bool(v) => ArrayView::Bool(std::slice::from_ref(v)),
            Self::U8(v) => ArrayView::U8(std::slice::from_ref(v)),
            Self::U32(v) => ArrayView::U32(std::slice::from_ref(v)),
            Self::U64(v) => ArrayView::U64(std::slice::from_ref(v)),
            Self::I32(v) => ArrayView::I32(std::slice::from_ref(v)),
            Self::I64(v) => ArrayView::I64(std::slice::from_ref(v)),
            Self::F32(v) => ArrayView::F32(std::slice::from_ref(v)),
            Self::F64(v) => ArrayView::F64(std::slice::from_ref(v)),
            Self::Utf8(v) => ArrayView::Utf8(v.view()),
        }
    }

    /// The value repeated for `count` rows.
    pub fn as_batch(&self, count: usize) -> Batch<'_> {
        // A scalar view always holds exactly one slot, so any count is addressable.
        Batch::new_unchecked(self.view(), Selection::Broadcast, count)
    }

    /// The physical type of a primitive scalar, if any.
    pub fn ptype(&self) -> Option<PType> {
        self.dtype().as_ptype()
    }

    /// Whether the scalar can be compared against a column of type `dtype`.
    pub fn is_compatible(&self, dtype: &DType) -> bool {
        self.dtype().eq_ignore_nullability(dtype)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Utf8(v) => write!(f, "\"{}\"", String::from_utf8_lossy(v.value())),
        }
    }
}
