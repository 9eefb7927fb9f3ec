use std::ops::Range;

use static_assertions::const_assert_eq;
use strata_error::{StrataResult, strata_err};

/// A non-owning reference to one string value: a run of bytes inside some byte buffer.
///
/// A span carries no lifetime; it is only meaningful together with the buffer it was cut from
/// (an [`ArenaBlock`], a column file's values stream, a scalar). Resolving a span against a
/// different buffer yields garbage or panics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    offset: u32,
    len: u32,
}

const_assert_eq!(size_of::<ByteSpan>(), 8);

impl ByteSpan {
    /// A zero-length span.
    pub const EMPTY: Self = Self { offset: 0, len: 0 };

    /// Create a span covering `len` bytes from `offset`.
    pub const fn new(offset: u32, len: u32) -> Self {
        Self { offset, len }
    }

    /// Create a span covering `range`, failing if either end does not fit in 32 bits.
    pub fn try_from_range(range: Range<usize>) -> StrataResult<Self> {
        let offset = u32::try_from(range.start)
            .map_err(|_| strata_err!("span offset {} exceeds u32", range.start))?;
        let len = u32::try_from(range.len())
            .map_err(|_| strata_err!("span length {} exceeds u32", range.len()))?;
        Ok(Self { offset, len })
    }

    /// The first byte of the value within its buffer.
    #[inline]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The length of the value in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the value is the empty string.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The byte range of the value within its buffer.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.len as usize
    }

    /// Resolve the span against the buffer it was cut from.
    ///
    /// ## Panics
    ///
    /// Panics if the span lies outside `bytes`.
    #[inline]
    pub fn resolve<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.range()]
    }
}

/// A bump allocator owning copies of transient byte spans.
///
/// Producers copy cell values that only live until their reader advances into the arena, and
/// hand out [`ByteSpan`]s into it. [`ArenaBlock::clear`] rewinds the write cursor once per batch
/// while keeping the allocation, which bounds peak memory to the largest batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArenaBlock {
    bytes: Vec<u8>,
}

impl ArenaBlock {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty arena that can hold `capacity` bytes before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Copy `value` into the arena, returning a span that stays valid until the next
    /// [`ArenaBlock::clear`].
    pub fn get_copy(&mut self, value: &[u8]) -> StrataResult<ByteSpan> {
        let start = self.bytes.len();
        let span = ByteSpan::try_from_range(start..start + value.len())
            .map_err(|e| e.with_context("arena block is full"))?;
        self.bytes.extend_from_slice(value);
        Ok(span)
    }

    /// The bytes of a span previously returned by [`ArenaBlock::get_copy`].
    #[inline]
    pub fn get(&self, span: ByteSpan) -> &[u8] {
        span.resolve(&self.bytes)
    }

    /// Invalidate every span handed out so far. Capacity is kept.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// The number of bytes in use.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are in use.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The number of bytes the arena can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// The backing buffer that spans from this arena resolve against.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_outlive_the_source_buffer() {
        let mut arena = ArenaBlock::new();
        let spans = {
            let mut transient = b"alpha".to_vec();
            let first = arena.get_copy(&transient).unwrap();
            transient.clear();
            let second = arena.get_copy(&transient).unwrap();
            let third = arena.get_copy(b"\0beta").unwrap();
            [first, second, third]
        };

        assert_eq!(arena.get(spans[0]), b"alpha");
        assert_eq!(arena.get(spans[1]), b"");
        assert_eq!(arena.get(spans[2]), b"\0beta");
        assert_eq!(spans[2], ByteSpan::new(5, 5));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut arena = ArenaBlock::with_capacity(4);
        arena.get_copy(b"0123456789").unwrap();
        let capacity = arena.capacity();

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.capacity(), capacity);

        let span = arena.get_copy(b"xy").unwrap();
        assert_eq!(span.offset(), 0);
    }
}
