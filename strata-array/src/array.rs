use strata_dtype::DType;
use strata_error::StrataResult;

use crate::{ArenaBlock, ArrayView, ByteSpan, NativeValue, Utf8View};

/// Owned byte strings: one arena holding every value, and one span per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Utf8Array {
    arena: ArenaBlock,
    spans: Vec<ByteSpan>,
}

impl Utf8Array {
    /// Create an empty array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect byte strings into an array.
    pub fn try_from_iter<I, V>(values: I) -> StrataResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        let mut array = Self::new();
        for value in values {
            array.push(value.as_ref())?;
        }
        Ok(array)
    }

    /// Append a copy of `value`.
    pub fn push(&mut self, value: &[u8]) -> StrataResult<()> {
        let span = self.arena.get_copy(value)?;
        self.spans.push(span);
        Ok(())
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The bytes of value `index`.
    pub fn value(&self, index: usize) -> &[u8] {
        self.arena.get(self.spans[index])
    }

    /// A view over every value.
    pub fn view(&self) -> Utf8View<'_> {
        Utf8View::new(&self.spans, self.arena.bytes())
    }
}

/// Owned column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    /// Booleans
    Bool(Vec<bool>),
    /// `u8` values
    U8(Vec<u8>),
    /// `u32` values
    U32(Vec<u32>),
    /// `u64` values
    U64(Vec<u64>),
    /// `i32` values
    I32(Vec<i32>),
    /// `i64` values
    I64(Vec<i64>),
    /// `f32` values
    F32(Vec<f32>),
    /// `f64` values
    F64(Vec<f64>),
    /// Byte strings
    Utf8(Utf8Array),
}

impl Array {
    /// Wrap native values.
    pub fn from_values<T: NativeValue>(values: Vec<T>) -> Self {
        T::into_array(values)
    }

    /// Collect byte strings into an array.
    pub fn utf8<I, V>(values: I) -> StrataResult<Self>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        Utf8Array::try_from_iter(values).map(Self::Utf8)
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.view().len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The non-nullable logical type of the values.
    pub fn dtype(&self) -> DType {
        self.view().dtype()
    }

    /// Borrow the storage.
    pub fn view(&self) -> ArrayView<'_> {
        match self {
            Self::Bool(v) => ArrayView::Bool(v),
            Self::U8(v) => ArrayView::U8(v),
            Self::U32(v) => ArrayView::U32(v),
            Self::U64(v) => ArrayView::U64(v),
            Self::I32(v) => ArrayView::I32(v),
            Self::I64(v) => ArrayView::I64(v),
            Self::F32(v) => ArrayView::F32(v),
            Self::F64(v) => ArrayView::F64(v),
            Self::Utf8(v) => ArrayView::Utf8(v.view()),
        }
    }

    /// An empty array of the given type.
    pub fn empty(dtype: &DType) -> Self {
        match dtype {
            DType::Bool(_) => Self::Bool(Vec::new()),
            DType::Utf8(_) => Self::Utf8(Utf8Array::new()),
            DType::Primitive(ptype, _) => {
                strata_dtype::match_each_native_ptype!(ptype, |$T| {
                    Self::from_values::<$T>(Vec::new())
                })
            }
        }
    }
}

impl From<Vec<bool>> for Array {
    fn from(values: Vec<bool>) -> Self {
        Self::Bool(values)
    }
}

impl From<Utf8Array> for Array {
    fn from(values: Utf8Array) -> Self {
        Self::Utf8(values)
    }
}
