//! Strata is a pull-based, batch-oriented engine for reading, filtering and persisting columnar
//! tables.
//!
//! Pipelines are built by wrapping [`source::BatchSource`]s: a tabular text reader at the bottom,
//! filters and writers stacked on top, and a caller pulling batches from the outermost one.

pub use strata_array::*;
#[cfg(feature = "files")]
pub use strata_file as file;
#[cfg(feature = "tabular")]
pub use strata_tabular as tabular;
pub use {strata_dtype as dtype, strata_error as error};

pub use logging::*;

mod logging;
