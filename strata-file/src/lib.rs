//! Read and write Strata tables as directories of column files.
//!
//! A table rooted at `{root}` stores its schema in `{root}/Schema.json` and every column in its
//! own directory `{root}/{column}/`:
//!
//! * string columns as `V.s.bin`, the concatenated bytes of every value, and `Vp.i32.bin`, one
//!   little-endian `u32` cumulative end offset per row. Row `i` spans bytes
//!   `offset[i - 1]..offset[i]` of the values, with `offset[-1] = 0`.
//! * fixed-width columns as `V.{ptype}.bin`, one little-endian value per row.
//! * boolean columns as `V.b8.bin`, one byte per row.

pub use column::*;
pub use reader::*;
pub use schema::*;
pub use writer::*;

mod column;
mod reader;
mod schema;
mod stream;
mod writer;

use strata_dtype::DType;

/// The values stream of a string column.
pub const UTF8_VALUES_FILE: &str = "V.s.bin";
/// The positions stream of a string column.
pub const UTF8_POSITIONS_FILE: &str = "Vp.i32.bin";
/// The values stream of a boolean column.
pub const BOOL_VALUES_FILE: &str = "V.b8.bin";
/// The persisted schema of a table.
pub const SCHEMA_FILE: &str = "Schema.json";

/// The values stream holding a column of type `dtype`.
pub fn values_file_name(dtype: &DType) -> String {
    match dtype {
        DType::Bool(_) => BOOL_VALUES_FILE.to_string(),
        DType::Utf8(_) => UTF8_VALUES_FILE.to_string(),
        DType::Primitive(ptype, _) => format!("V.{}.bin", ptype.file_suffix()),
    }
}
