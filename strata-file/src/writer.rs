use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use strata_array::Batch;
use strata_array::source::{BatchSource, ColumnGetter};
use strata_dtype::Schema;
use strata_error::{ResultExt, StrataResult, strata_bail};

use crate::{ColumnWriter, SCHEMA_FILE, new_column_writer, write_schema};

const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Column names become directory names under the table root, so each must be a unique, plain
/// path component that does not collide with the schema file.
fn check_column_names(schema: &Schema) -> StrataResult<()> {
    let mut seen = HashSet::with_capacity(schema.len());
    for column in schema {
        let name = column.name();
        if name.is_empty() || name == "." || name == ".." || name == SCHEMA_FILE {
            strata_bail!("'{}' cannot be used as a column name", name);
        }
        if name.contains(['/', '\\', '\0']) {
            strata_bail!("column name '{}' contains a path separator", name);
        }
        if !seen.insert(name) {
            strata_bail!("duplicate column name '{}'", name);
        }
    }
    Ok(())
}

/// Options for writing a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableWriteOptions {
    buffer_capacity: usize,
}

impl Default for TableWriteOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl TableWriteOptions {
    /// Buffer up to `capacity` bytes per output file before writing through.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// The buffer size of each output file.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }
}

/// Writes every batch pulled through it to a table on disk, passing the batches on unchanged.
///
/// The writer is a tap: callers keep pulling from it as they would from the inner source, and
/// each column's batch is appended to that column's files before [`BatchSource::next`] returns.
/// Dropping the writer disposes it.
#[derive(Debug)]
pub struct BinaryTableWriter<S: BatchSource> {
    inner: S,
    root: PathBuf,
    options: TableWriteOptions,
    getters: Vec<ColumnGetter>,
    writers: Vec<Box<dyn ColumnWriter>>,
    rows_written: u64,
    disposed: bool,
}

impl<S: BatchSource> BinaryTableWriter<S> {
    /// Write the table pulled from `inner` under `root`.
    pub fn try_new(inner: S, root: impl AsRef<Path>) -> StrataResult<Self> {
        Self::with_options(inner, root, TableWriteOptions::default())
    }

    /// Write the table pulled from `inner` under `root`, with `options`.
    pub fn with_options(
        inner: S,
        root: impl AsRef<Path>,
        options: TableWriteOptions,
    ) -> StrataResult<Self> {
        let mut writer = Self {
            inner,
            root: root.as_ref().to_path_buf(),
            options,
            getters: Vec::new(),
            writers: Vec::new(),
            rows_written: 0,
            disposed: false,
        };
        writer.open_table()?;
        Ok(writer)
    }

    /// The root directory of the table.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The number of rows written since the table was last (re)created.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Create the table's directory, persist its schema, and create or truncate every column file.
    fn open_table(&mut self) -> StrataResult<()> {
        check_column_names(self.inner.columns())
            .with_context(|| format!("writing table {}", self.root.display()))?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating table directory {}", self.root.display()))?;
        let schema = self.inner.columns();
        write_schema(&self.root, schema)?;

        let getters = (0..schema.len())
            .map(|index| self.inner.column_getter(index))
            .collect::<StrataResult<Vec<_>>>()?;
        let writers = schema
            .iter()
            .map(|column| new_column_writer(&self.root, column, &self.options))
            .collect::<StrataResult<Vec<_>>>()?;
        debug!(
            "opened table {} with {} columns",
            self.root.display(),
            schema.len()
        );

        self.getters = getters;
        self.writers = writers;
        self.rows_written = 0;
        Ok(())
    }

    fn close_writers(&mut self) -> StrataResult<()> {
        let mut result = Ok(());
        for writer in &mut self.writers {
            let closed = writer.dispose();
            if result.is_ok() {
                result = closed;
            }
        }
        result
    }
}

impl<S: BatchSource> BatchSource for BinaryTableWriter<S> {
    fn columns(&self) -> &Schema {
        self.inner.columns()
    }

    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>> {
        self.inner.batch(getter)
    }

    fn next(&mut self, desired_count: usize) -> StrataResult<usize> {
        let count = self.inner.next(desired_count)?;
        if count == 0 {
            return Ok(0);
        }
        for (getter, writer) in self.getters.iter().zip(self.writers.iter_mut()) {
            let batch = self.inner.batch(*getter)?;
            writer.write(&batch)?;
        }
        self.rows_written += count as u64;
        trace!("wrote {} rows to {}", count, self.root.display());
        Ok(count)
    }

    /// Rewind the inner source and start the table over, truncating every file.
    fn reset(&mut self) -> StrataResult<()> {
        self.inner.reset()?;
        self.close_writers()?;
        self.open_table()?;
        self.disposed = false;
        Ok(())
    }

    fn dispose(&mut self) -> StrataResult<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        debug!(
            "closing table {} after {} rows",
            self.root.display(),
            self.rows_written
        );
        let inner = self.inner.dispose();
        let writers = self.close_writers();
        inner.and(writers)
    }
}

impl<S: BatchSource> Drop for BinaryTableWriter<S> {
    fn drop(&mut self) {
        if let Err(err) = self.dispose() {
            warn!("failed to dispose table {}: {}", self.root.display(), err);
        }
    }
}
