//! Strata batches and the pull-based source contract.
//!
//! A [`source::BatchSource`] is a stateful cursor over a table that produces one [`Batch`] per
//! column on every call to `next`. Batches are borrowed views over storage owned by the source,
//! so they cannot outlive the next pull. Sources compose by wrapping: a decorator owns exactly
//! one inner source and taps, filters or transforms what it produces.

pub use allocator::*;
pub use arena::*;
pub use array::*;
pub use batch::*;
pub use native::*;
pub use remap::*;
pub use scalar::*;

mod allocator;
mod arena;
mod array;
mod batch;
pub mod compare;
pub mod filter;
mod native;
mod remap;
mod scalar;
pub mod source;
