#![cfg(target_endian = "little")]
#![deny(missing_docs)]

//! A type system for Strata
//!
//! This crate contains the logical types of Strata columns, the native fixed-width types that
//! back them, and the ordered column descriptions that make up a table [`Schema`].

pub use column::*;
pub use dtype::*;
pub use nullability::*;
pub use ptype::*;

mod column;
mod dtype;
mod nullability;
mod ptype;
