use std::fmt::{Display, Formatter};
use std::ops::Range;

use strata_dtype::{DType, Nullability, PType};
use strata_error::{StrataResult, strata_bail, strata_err};

use crate::{ByteSpan, NativeValue};

/// A borrowed run of variable-length byte strings.
///
/// Each value is a [`ByteSpan`] resolved against `bytes`.
#[derive(Debug, Clone, Copy)]
pub struct Utf8View<'a> {
    spans: &'a [ByteSpan],
    bytes: &'a [u8],
}

impl<'a> Utf8View<'a> {
    /// Create a view over `spans`, all of which must lie within `bytes`.
    pub fn new(spans: &'a [ByteSpan], bytes: &'a [u8]) -> Self {
        Self { spans, bytes }
    }

    /// The number of values.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The bytes of the value in storage slot `index`.
    #[inline]
    pub fn value(&self, index: usize) -> &'a [u8] {
        self.spans[index].resolve(self.bytes)
    }

    /// The spans of every value.
    pub fn spans(&self) -> &'a [ByteSpan] {
        self.spans
    }

    /// The buffer the spans resolve against.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    fn slice(&self, range: Range<usize>) -> Self {
        Self {
            spans: &self.spans[range],
            bytes: self.bytes,
        }
    }
}

/// A borrowed, typed slice of column storage.
#[derive(Debug, Clone, Copy)]
pub enum ArrayView<'a> {
    /// Booleans, one per slot
    Bool(&'a [bool]),
    /// `u8` values
    U8(&'a [u8]),
    /// `u32` values
    U32(&'a [u32]),
    /// `u64` values
    U64(&'a [u64]),
    /// `i32` values
    I32(&'a [i32]),
    /// `i64` values
    I64(&'a [i64]),
    /// `f32` values
    F32(&'a [f32]),
    /// `f64` values
    F64(&'a [f64]),
    /// Byte strings
    Utf8(Utf8View<'a>),
}

impl<'a> ArrayView<'a> {
    /// The number of storage slots.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U32(v) => v.len(),
            Self::U64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::Utf8(v) => v.len(),
        }
    }

    /// Whether there are no storage slots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The non-nullable logical type of the values.
    pub fn dtype(&self) -> DType {
        let n = Nullability::NonNullable;
        match self {
            Self::Bool(_) => DType::Bool(n),
            Self::U8(_) => DType::Primitive(PType::U8, n),
            Self::U32(_) => DType::Primitive(PType::U32, n),
            Self::U64(_) => DType::Primitive(PType::U64, n),
            Self::I32(_) => DType::Primitive(PType::I32, n),
            Self::I64(_) => DType::Primitive(PType::I64, n),
            Self::F32(_) => DType::Primitive(PType::F32, n),
            Self::F64(_) => DType::Primitive(PType::F64, n),
            Self::Utf8(_) => DType::Utf8(n),
        }
    }

    /// Narrow the view to the storage slots in `range`.
    ///
    /// ## Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Self {
        match self {
            Self::Bool(v) => Self::Bool(&v[range]),
            Self::U8(v) => Self::U8(&v[range]),
            Self::U32(v) => Self::U32(&v[range]),
            Self::U64(v) => Self::U64(&v[range]),
            Self::I32(v) => Self::I32(&v[range]),
            Self::I64(v) => Self::I64(&v[range]),
            Self::F32(v) => Self::F32(&v[range]),
            Self::F64(v) => Self::F64(&v[range]),
            Self::Utf8(v) => Self::Utf8(v.slice(range)),
        }
    }
}

impl Display for ArrayView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]", self.dtype(), self.len())
    }
}

/// How the logical rows of a [`Batch`] map onto its storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Logical row `i` is storage slot `i`.
    Identity,
    /// Logical row `i` is storage slot `indices[i]`.
    Indices(&'a [usize]),
    /// Every logical row is storage slot 0, e.g. a constant compared against a column.
    Broadcast,
}

/// A view over a contiguous run of typed rows, with an optional selection.
///
/// A batch never owns its storage: it borrows from whichever source produced it, and therefore
/// cannot be held across the next pull on that source. Data that must survive longer has to be
/// copied out, e.g. into an [`ArenaBlock`](crate::ArenaBlock).
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    array: ArrayView<'a>,
    selection: Selection<'a>,
    count: usize,
}

impl<'a> Batch<'a> {
    /// Create a batch, checking that `count` logical rows are addressable.
    pub fn try_new(
        array: ArrayView<'a>,
        selection: Selection<'a>,
        count: usize,
    ) -> StrataResult<Self> {
        let addressable = match selection {
            Selection::Identity => array.len(),
            Selection::Indices(indices) => {
                if let Some(&max) = indices[..count.min(indices.len())].iter().max() {
                    if max >= array.len() {
                        strata_bail!(OutOfBounds: max, 0, array.len());
                    }
                }
                indices.len()
            }
            Selection::Broadcast => {
                if array.is_empty() && count > 0 {
                    strata_bail!("cannot broadcast an empty array to {} rows", count);
                }
                usize::MAX
            }
        };
        if count > addressable {
            strata_bail!(
                "batch of {} rows exceeds the {} rows addressable by its selection",
                count,
                addressable
            );
        }
        Ok(Self {
            array,
            selection,
            count,
        })
    }

    pub(crate) fn new_unchecked(
        array: ArrayView<'a>,
        selection: Selection<'a>,
        count: usize,
    ) -> Self {
        Self {
            array,
            selection,
            count,
        }
    }

    /// The first `count` storage slots of `array`, unselected.
    pub fn all(array: ArrayView<'a>, count: usize) -> StrataResult<Self> {
        Self::try_new(array, Selection::Identity, count)
    }

    /// Every storage slot of `array`, unselected.
    pub fn full(array: ArrayView<'a>) -> Self {
        Self {
            array,
            selection: Selection::Identity,
            count: array.len(),
        }
    }

    /// The first value of `array` repeated for `count` rows.
    pub fn broadcast(array: ArrayView<'a>, count: usize) -> StrataResult<Self> {
        Self::try_new(array, Selection::Broadcast, count)
    }

    /// The underlying storage.
    pub fn array(&self) -> ArrayView<'a> {
        self.array
    }

    /// The mapping from logical rows to storage slots.
    pub fn selection(&self) -> Selection<'a> {
        self.selection
    }

    /// The number of logical rows.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether the batch has no logical rows.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether every logical row reads the same storage slot.
    pub fn is_broadcast(&self) -> bool {
        matches!(self.selection, Selection::Broadcast)
    }

    /// The storage slot holding logical row `row`.
    #[inline]
    pub fn index(&self, row: usize) -> usize {
        match self.selection {
            Selection::Identity => row,
            Selection::Indices(indices) => indices[row],
            Selection::Broadcast => 0,
        }
    }

    /// The storage slots of every logical row, in order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + use<'a> {
        let this = *self;
        (0..this.count).map(move |row| this.index(row))
    }

    /// The storage as a native slice, or a type mismatch error.
    pub fn as_primitive<T: NativeValue>(&self) -> StrataResult<&'a [T]> {
        T::try_from_view(self.array)
            .ok_or_else(|| strata_err!(MismatchedTypes: T::PTYPE, self.array.dtype()))
    }

    /// The storage as byte strings, or a type mismatch error.
    pub fn as_utf8(&self) -> StrataResult<Utf8View<'a>> {
        match self.array {
            ArrayView::Utf8(view) => Ok(view),
            other => Err(strata_err!(MismatchedTypes: "utf8", other.dtype())),
        }
    }

    /// The storage as booleans, or a type mismatch error.
    pub fn as_bool(&self) -> StrataResult<&'a [bool]> {
        match self.array {
            ArrayView::Bool(values) => Ok(values),
            other => Err(strata_err!(MismatchedTypes: "bool", other.dtype())),
        }
    }

    /// The native values of every logical row, in order.
    pub fn primitive_values<T: NativeValue>(
        &self,
    ) -> StrataResult<impl Iterator<Item = T> + use<'a, T>> {
        let values = self.as_primitive::<T>()?;
        Ok(self.indices().map(move |i| values[i]))
    }

    /// The byte strings of every logical row, in order.
    pub fn utf8_values(&self) -> StrataResult<impl Iterator<Item = &'a [u8]> + use<'a>> {
        let view = self.as_utf8()?;
        Ok(self.indices().map(move |i| view.value(i)))
    }

    /// The booleans of every logical row, in order.
    pub fn bool_values(&self) -> StrataResult<impl Iterator<Item = bool> + use<'a>> {
        let values = self.as_bool()?;
        Ok(self.indices().map(move |i| values[i]))
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::ArenaBlock;

    #[test]
    fn selection_remaps_rows() {
        let values = [10i32, 20, 30, 40];
        let selection = [3usize, 0, 2];
        let batch =
            Batch::try_new(ArrayView::I32(&values), Selection::Indices(&selection), 2).unwrap();

        assert_eq!(batch.count(), 2);
        assert_eq!(batch.primitive_values::<i32>().unwrap().collect_vec(), vec![40, 10]);
    }

    #[test]
    fn count_cannot_exceed_storage() {
        let values = [1u8, 2];
        assert!(Batch::all(ArrayView::U8(&values), 3).is_err());

        let selection = [0usize];
        assert!(Batch::try_new(ArrayView::U8(&values), Selection::Indices(&selection), 2).is_err());

        let out_of_range = [5usize];
        assert!(
            Batch::try_new(ArrayView::U8(&values), Selection::Indices(&out_of_range), 1).is_err()
        );
    }

    #[test]
    fn broadcast_repeats_first_slot() {
        let value = [7u64];
        let batch = Batch::broadcast(ArrayView::U64(&value), 3).unwrap();
        assert_eq!(batch.primitive_values::<u64>().unwrap().collect_vec(), vec![7, 7, 7]);
        assert!(Batch::broadcast(ArrayView::U64(&[]), 1).is_err());
    }

    #[test]
    fn utf8_values_resolve_against_arena() {
        let mut arena = ArenaBlock::new();
        let spans = ["a", "", "ccc"]
            .iter()
            .map(|s| arena.get_copy(s.as_bytes()).unwrap())
            .collect_vec();
        let batch = Batch::full(ArrayView::Utf8(Utf8View::new(&spans, arena.bytes())));

        let values = batch.utf8_values().unwrap().collect_vec();
        assert_eq!(values, vec![&b"a"[..], &b""[..], &b"ccc"[..]]);
    }

    #[test]
    fn mismatched_type_is_reported() {
        let values = [1.5f64];
        let batch = Batch::full(ArrayView::F64(&values));
        assert!(batch.as_primitive::<i32>().is_err());
        assert!(batch.as_utf8().is_err());
        assert_eq!(batch.as_primitive::<f64>().unwrap(), &[1.5]);
    }
}
