use std::fmt::Debug;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{trace, warn};
use num_traits::ToBytes;
use strata_array::{Batch, NativeValue, allocate_to_size};
use strata_dtype::{ColumnDetails, DType, match_each_native_ptype};
use strata_error::{ResultExt, StrataResult, strata_err};

use crate::stream::OutputStream;
use crate::{
    BOOL_VALUES_FILE, TableWriteOptions, UTF8_POSITIONS_FILE, UTF8_VALUES_FILE, values_file_name,
};

/// Appends batches of one column to its files.
///
/// Writers own their files: they are created when the writer is, and flushed and closed by
/// [`ColumnWriter::dispose`]. A failed write leaves the files in an unspecified state and the
/// whole table must be discarded.
pub trait ColumnWriter: Debug {
    /// Append the logical rows of `batch`, in order.
    fn write(&mut self, batch: &Batch<'_>) -> StrataResult<()>;

    /// Flush and close the column's files. Calling it again is a no-op.
    fn dispose(&mut self) -> StrataResult<()>;
}

/// The writer for `column` of the table rooted at `root`, chosen by its type.
pub fn new_column_writer(
    root: &Path,
    column: &ColumnDetails,
    options: &TableWriteOptions,
) -> StrataResult<Box<dyn ColumnWriter>> {
    let capacity = options.buffer_capacity();
    let writer: Box<dyn ColumnWriter> = match column.dtype() {
        DType::Utf8(_) => Box::new(Utf8ColumnWriter::with_buffer_capacity(
            root,
            column.name(),
            capacity,
        )?),
        DType::Bool(_) => Box::new(BoolColumnWriter::with_buffer_capacity(
            root,
            column.name(),
            capacity,
        )?),
        DType::Primitive(ptype, _) => match_each_native_ptype!(ptype, |$T| {
            Box::new(PrimitiveColumnWriter::<$T>::with_buffer_capacity(
                root,
                column.name(),
                capacity,
            )?)
        }),
    };
    Ok(writer)
}

fn column_directory(root: &Path, name: &str) -> StrataResult<PathBuf> {
    let directory = root.join(name);
    fs::create_dir_all(&directory)
        .with_context(|| format!("creating column directory {}", directory.display()))?;
    Ok(directory)
}

/// Writes a string column as a values stream and a positions stream of cumulative end offsets.
#[derive(Debug)]
pub struct Utf8ColumnWriter {
    values: OutputStream,
    positions: OutputStream,
    running_offset: u32,
    offsets: Vec<u32>,
    offset_bytes: Vec<u8>,
}

impl Utf8ColumnWriter {
    /// Create the column's directory under `root` if needed, and create or truncate its files.
    pub fn try_new(root: &Path, name: &str) -> StrataResult<Self> {
        Self::with_buffer_capacity(root, name, TableWriteOptions::default().buffer_capacity())
    }

    /// Like [`Utf8ColumnWriter::try_new`], buffering up to `capacity` bytes per file.
    pub fn with_buffer_capacity(root: &Path, name: &str, capacity: usize) -> StrataResult<Self> {
        let directory = column_directory(root, name)?;
        Ok(Self {
            values: OutputStream::create(directory.join(UTF8_VALUES_FILE), capacity)?,
            positions: OutputStream::create(directory.join(UTF8_POSITIONS_FILE), capacity)?,
            running_offset: 0,
            offsets: Vec::new(),
            offset_bytes: Vec::new(),
        })
    }

    /// The number of value bytes written so far.
    pub fn bytes_written(&self) -> u32 {
        self.running_offset
    }
}

impl ColumnWriter for Utf8ColumnWriter {
    fn write(&mut self, batch: &Batch<'_>) -> StrataResult<()> {
        let strings = batch.as_utf8()?;
        let count = batch.count();
        allocate_to_size(&mut self.offsets, count);
        allocate_to_size(&mut self.offset_bytes, count * size_of::<u32>());

        for (row, slot) in batch.indices().enumerate() {
            let value = strings.value(slot);
            self.values.write_all(value)?;
            self.running_offset = u32::try_from(value.len())
                .ok()
                .and_then(|len| self.running_offset.checked_add(len))
                .ok_or_else(|| {
                    strata_err!(
                        "{} would exceed {} bytes",
                        self.values.path().display(),
                        u32::MAX
                    )
                })?;
            self.offsets[row] = self.running_offset;
        }

        let offset_bytes = &mut self.offset_bytes[..count * size_of::<u32>()];
        for (chunk, offset) in offset_bytes
            .chunks_exact_mut(size_of::<u32>())
            .zip(&self.offsets[..count])
        {
            chunk.copy_from_slice(&offset.to_le_bytes());
        }
        self.positions.write_all(offset_bytes)?;
        trace!(
            "wrote {} strings to {}, {} bytes total",
            count,
            self.values.path().display(),
            self.running_offset
        );
        Ok(())
    }

    fn dispose(&mut self) -> StrataResult<()> {
        let values = self.values.close();
        let positions = self.positions.close();
        values.and(positions)
    }
}

impl Drop for Utf8ColumnWriter {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            warn!("failed to close {}: {}", self.values.path().display(), err);
        }
    }
}

/// Writes a fixed-width column as one little-endian value per row.
#[derive(Debug)]
pub struct PrimitiveColumnWriter<T> {
    values: OutputStream,
    buffer: Vec<u8>,
    _type: PhantomData<T>,
}

impl<T: NativeValue> PrimitiveColumnWriter<T> {
    /// Create the column's directory under `root` if needed, and create or truncate its file.
    pub fn try_new(root: &Path, name: &str) -> StrataResult<Self> {
        Self::with_buffer_capacity(root, name, TableWriteOptions::default().buffer_capacity())
    }

    /// Like [`PrimitiveColumnWriter::try_new`], buffering up to `capacity` bytes.
    pub fn with_buffer_capacity(root: &Path, name: &str, capacity: usize) -> StrataResult<Self> {
        let directory = column_directory(root, name)?;
        let file_name = values_file_name(&DType::from(T::PTYPE));
        Ok(Self {
            values: OutputStream::create(directory.join(file_name), capacity)?,
            buffer: Vec::new(),
            _type: PhantomData,
        })
    }
}

impl<T: NativeValue> ColumnWriter for PrimitiveColumnWriter<T> {
    fn write(&mut self, batch: &Batch<'_>) -> StrataResult<()> {
        let width = size_of::<T>();
        let len = batch.count() * width;
        allocate_to_size(&mut self.buffer, len);
        for (chunk, value) in self.buffer[..len]
            .chunks_exact_mut(width)
            .zip(batch.primitive_values::<T>()?)
        {
            chunk.copy_from_slice(value.to_le_bytes().as_ref());
        }
        self.values.write_all(&self.buffer[..len])
    }

    fn dispose(&mut self) -> StrataResult<()> {
        self.values.close()
    }
}

impl<T> Drop for PrimitiveColumnWriter<T> {
    fn drop(&mut self) {
        if let Err(err) = self.values.close() {
            warn!("failed to close {}: {}", self.values.path().display(), err);
        }
    }
}

/// Writes a boolean column as one byte per row, `0` or `1`.
#[derive(Debug)]
pub struct BoolColumnWriter {
    values: OutputStream,
    buffer: Vec<u8>,
}

impl BoolColumnWriter {
    /// Create the column's directory under `root` if needed, and create or truncate its file.
    pub fn try_new(root: &Path, name: &str) -> StrataResult<Self> {
        Self::with_buffer_capacity(root, name, TableWriteOptions::default().buffer_capacity())
    }

    /// Like [`BoolColumnWriter::try_new`], buffering up to `capacity` bytes.
    pub fn with_buffer_capacity(root: &Path, name: &str, capacity: usize) -> StrataResult<Self> {
        let directory = column_directory(root, name)?;
        Ok(Self {
            values: OutputStream::create(directory.join(BOOL_VALUES_FILE), capacity)?,
            buffer: Vec::new(),
        })
    }
}

impl ColumnWriter for BoolColumnWriter {
    fn write(&mut self, batch: &Batch<'_>) -> StrataResult<()> {
        self.buffer.clear();
        self.buffer.extend(batch.bool_values()?.map(u8::from));
        self.values.write_all(&self.buffer)
    }

    fn dispose(&mut self) -> StrataResult<()> {
        self.values.close()
    }
}

impl Drop for BoolColumnWriter {
    fn drop(&mut self) {
        if let Err(err) = self.values.close() {
            warn!("failed to close {}: {}", self.values.path().display(), err);
        }
    }
}
