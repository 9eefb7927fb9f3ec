use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use DType::*;

use crate::nullability::Nullability;
use crate::PType;

/// The logical types of values in Strata columns.
///
/// A column keeps a single logical type for its whole lifetime; batches of that column are
/// views over native storage of the matching physical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// The logical boolean type
    Bool(Nullability),
    /// Primitive, fixed-width numeric types (e.g., `u8`, `i32`, `f64`)
    Primitive(PType, Nullability),
    /// Variable-length strings of bytes, stored as byte spans
    Utf8(Nullability),
}

impl DType {
    /// Get the nullability of the DType
    pub fn nullability(&self) -> Nullability {
        match self {
            Bool(n) | Primitive(_, n) | Utf8(n) => *n,
        }
    }

    /// Check if the DType is nullable
    pub fn is_nullable(&self) -> bool {
        self.nullability().into()
    }

    /// Get a new DType with the given nullability (but otherwise the same as `self`)
    pub fn with_nullability(&self, nullability: Nullability) -> Self {
        match self {
            Bool(_) => Bool(nullability),
            Primitive(p, _) => Primitive(*p, nullability),
            Utf8(_) => Utf8(nullability),
        }
    }

    /// Check if `self` and `other` are equal, ignoring nullability
    pub fn eq_ignore_nullability(&self, other: &Self) -> bool {
        self.with_nullability(Nullability::NonNullable)
            == other.with_nullability(Nullability::NonNullable)
    }

    /// The physical type of a primitive DType, if any.
    pub fn as_ptype(&self) -> Option<PType> {
        match self {
            Primitive(p, _) => Some(*p),
            _ => None,
        }
    }

    /// Check if the DType is a variable-length string
    pub fn is_utf8(&self) -> bool {
        matches!(self, Utf8(_))
    }
}

impl From<PType> for DType {
    fn from(ptype: PType) -> Self {
        Primitive(ptype, Nullability::NonNullable)
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Bool(n) => write!(f, "bool{}", n),
            Primitive(p, n) => write!(f, "{}{}", p, n),
            Utf8(n) => write!(f, "utf8{}", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_marks_nullable() {
        assert_eq!(DType::Utf8(Nullability::NonNullable).to_string(), "utf8");
        assert_eq!(DType::Primitive(PType::I32, Nullability::Nullable).to_string(), "i32?");
    }

    #[test]
    fn compare_ignoring_nullability() {
        let left = DType::Primitive(PType::I64, Nullability::Nullable);
        let right = DType::from(PType::I64);
        assert_ne!(left, right);
        assert!(left.eq_ignore_nullability(&right));
        assert!(!left.eq_ignore_nullability(&DType::Utf8(Nullability::Nullable)));
    }
}
