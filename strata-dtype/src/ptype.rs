//! Physical type definitions and behavior.

use std::fmt::{Debug, Display, Formatter};

use num_traits::ToBytes;
use serde::{Deserialize, Serialize};

/// Physical type enum, represents the in-memory and on-disk width of fixed-width values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PType {
    /// An 8-bit unsigned integer
    U8,
    /// A 32-bit unsigned integer
    U32,
    /// A 64-bit unsigned integer
    U64,
    /// A 32-bit signed integer
    I32,
    /// A 64-bit signed integer
    I64,
    /// A 32-bit floating point number
    F32,
    /// A 64-bit floating point number
    F64,
}

/// A trait for native Rust types that correspond 1:1 to a PType
pub trait NativePType:
    Send
    + Sync
    + Clone
    + Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + PartialOrd
    + ToBytes
    + 'static
{
    /// The PType that corresponds to this native type
    const PTYPE: PType;

    /// Decode one value from exactly `size_of::<Self>()` little-endian bytes.
    ///
    /// Returns `None` if the chunk has the wrong width.
    fn from_le_chunk(chunk: &[u8]) -> Option<Self>;
}

macro_rules! native_ptype {
    ($T:ty, $ptype:tt) => {
        impl NativePType for $T {
            const PTYPE: PType = PType::$ptype;

            #[inline]
            fn from_le_chunk(chunk: &[u8]) -> Option<Self> {
                chunk.try_into().ok().map(<$T>::from_le_bytes)
            }
        }
    };
}

native_ptype!(u8, U8);
native_ptype!(u32, U32);
native_ptype!(u64, U64);
native_ptype!(i32, I32);
native_ptype!(i64, I64);
native_ptype!(f32, F32);
native_ptype!(f64, F64);

/// Macro to match over each PType, binding the corresponding native type (from `NativePType`)
#[macro_export]
macro_rules! match_each_native_ptype {
    ($self:expr, | $_:tt $enc:ident | $($body:tt)*) => ({
        macro_rules! __with__ {( $_ $enc:ident ) => ( $($body)* )}
        use $crate::PType;
        match $self {
            PType::U8 => __with__! { u8 },
            PType::U32 => __with__! { u32 },
            PType::U64 => __with__! { u64 },
            PType::I32 => __with__! { i32 },
            PType::I64 => __with__! { i64 },
            PType::F32 => __with__! { f32 },
            PType::F64 => __with__! { f64 },
        }
    })
}

impl PType {
    /// Returns `true` iff this PType is an unsigned integer type
    pub const fn is_unsigned_int(self) -> bool {
        matches!(self, Self::U8 | Self::U32 | Self::U64)
    }

    /// Returns `true` iff this PType is a signed integer type
    pub const fn is_signed_int(self) -> bool {
        matches!(self, Self::I32 | Self::I64)
    }

    /// Returns `true` iff this PType is a floating point type
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Returns the number of bytes in one value of this PType
    pub const fn byte_width(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// The short name used in column file names, e.g. `i32` in `V.i32.bin`.
    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_suffix())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(PType::U8)]
    #[case(PType::U32)]
    #[case(PType::U64)]
    #[case(PType::I32)]
    #[case(PType::I64)]
    #[case(PType::F32)]
    #[case(PType::F64)]
    fn byte_width_matches_native(#[case] ptype: PType) {
        let width = match_each_native_ptype!(ptype, |$T| size_of::<$T>());
        assert_eq!(ptype.byte_width(), width);
    }

    #[test]
    fn decode_le_chunk() {
        assert_eq!(i32::from_le_chunk(&(-7i32).to_le_bytes()), Some(-7));
        assert_eq!(u64::from_le_chunk(&[1, 0, 0]), None);
    }
}
