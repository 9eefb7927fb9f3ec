use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use log::debug;
use strata_array::source::{ArraySource, BatchSource, ColumnGetter};
use strata_array::{Array, Batch, NativeValue, Utf8Array};
use strata_dtype::{ColumnDetails, DType, NativePType, Schema, match_each_native_ptype};
use strata_error::{ResultExt, StrataResult, strata_bail, strata_err};

use crate::{
    BOOL_VALUES_FILE, UTF8_POSITIONS_FILE, UTF8_VALUES_FILE, read_schema, values_file_name,
};

fn read_file(path: &Path) -> StrataResult<Bytes> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    debug!("read {} bytes from {}", bytes.len(), path.display());
    Ok(Bytes::from(bytes))
}

fn decode_fixed<T: NativePType>(path: &Path, bytes: &[u8]) -> StrataResult<Vec<T>> {
    let width = size_of::<T>();
    if bytes.len() % width != 0 {
        strata_bail!(
            InvalidSerde: "{} holds {} bytes, not a whole number of {} values",
            path.display(),
            bytes.len(),
            T::PTYPE
        );
    }
    bytes
        .chunks_exact(width)
        .map(|chunk| {
            T::from_le_chunk(chunk)
                .ok_or_else(|| strata_err!(InvalidSerde: "short chunk in {}", path.display()))
        })
        .collect()
}

/// Decode the values of the string column `name` of the table rooted at `root`.
///
/// The values are zero-copy slices of the column's values file. Fails with
/// [`InvalidSerde`](strata_error::StrataError::InvalidSerde) if the positions are not
/// non-decreasing or do not end at the length of the values.
pub fn read_utf8_column(root: &Path, name: &str) -> StrataResult<Vec<Bytes>> {
    let directory = root.join(name);
    let values = read_file(&directory.join(UTF8_VALUES_FILE))?;
    let positions_path = directory.join(UTF8_POSITIONS_FILE);
    let positions = decode_fixed::<u32>(&positions_path, &read_file(&positions_path)?)?;

    let mut start = 0usize;
    let mut result = Vec::with_capacity(positions.len());
    for (row, &end) in positions.iter().enumerate() {
        let end = end as usize;
        if end < start || end > values.len() {
            strata_bail!(
                InvalidSerde: "{} row {}: offset {} outside {}..={}",
                positions_path.display(),
                row,
                end,
                start,
                values.len()
            );
        }
        result.push(values.slice(start..end));
        start = end;
    }
    if start != values.len() {
        strata_bail!(
            InvalidSerde: "{} ends at offset {} but the values hold {} bytes",
            positions_path.display(),
            start,
            values.len()
        );
    }
    Ok(result)
}

fn read_primitive<T: NativeValue>(directory: &Path) -> StrataResult<Array> {
    let path = directory.join(values_file_name(&DType::from(T::PTYPE)));
    Ok(Array::from_values(decode_fixed::<T>(&path, &read_file(&path)?)?))
}

fn read_bool(directory: &Path) -> StrataResult<Array> {
    let path = directory.join(BOOL_VALUES_FILE);
    let values = read_file(&path)?
        .iter()
        .map(|&byte| match byte {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(strata_err!(
                InvalidSerde: "{} holds {} where a boolean was expected",
                path.display(),
                other
            )),
        })
        .collect::<StrataResult<Vec<_>>>()?;
    Ok(Array::Bool(values))
}

fn read_column(root: &Path, column: &ColumnDetails) -> StrataResult<Array> {
    let directory = root.join(column.name());
    match column.dtype() {
        DType::Utf8(_) => Ok(Array::Utf8(Utf8Array::try_from_iter(read_utf8_column(
            root,
            column.name(),
        )?)?)),
        DType::Bool(_) => read_bool(&directory),
        DType::Primitive(ptype, _) => {
            match_each_native_ptype!(ptype, |$T| read_primitive::<$T>(&directory))
        }
    }
}

/// Serves a table written by a [`BinaryTableWriter`](crate::BinaryTableWriter) as a batch source.
///
/// Every column is loaded and validated when the table is opened; [`BatchSource::reset`] reopens
/// it from disk.
#[derive(Debug)]
pub struct BinaryTableReader {
    root: PathBuf,
    columns: ArraySource,
}

impl BinaryTableReader {
    /// Open the table rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StrataResult<Self> {
        let root = root.as_ref().to_path_buf();
        let columns = Self::load(&root)?;
        Ok(Self { root, columns })
    }

    fn load(root: &Path) -> StrataResult<ArraySource> {
        let schema = read_schema(root)?;
        let arrays = schema
            .iter()
            .map(|column| {
                read_column(root, column)
                    .with_context(|| format!("loading column '{}'", column.name()))
            })
            .collect::<StrataResult<Vec<_>>>()?;
        let source = ArraySource::try_new(schema, arrays)
            .with_context(|| format!("opening table {}", root.display()))?;
        debug!(
            "opened table {} with {} rows",
            root.display(),
            source.row_count()
        );
        Ok(source)
    }

    /// The root directory of the table.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.columns.row_count()
    }
}

impl BatchSource for BinaryTableReader {
    fn columns(&self) -> &Schema {
        self.columns.columns()
    }

    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>> {
        self.columns.batch(getter)
    }

    fn next(&mut self, desired_count: usize) -> StrataResult<usize> {
        self.columns.next(desired_count)
    }

    fn reset(&mut self) -> StrataResult<()> {
        self.columns = Self::load(&self.root)?;
        Ok(())
    }

    fn dispose(&mut self) -> StrataResult<()> {
        self.columns.dispose()
    }
}
