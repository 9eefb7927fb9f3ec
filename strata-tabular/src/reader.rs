use std::fmt::{Debug, Formatter};
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, trace};
use strata_array::source::{BatchSource, ColumnGetter};
use strata_array::{ArenaBlock, ArrayView, Batch, ByteSpan, Utf8View, allocate_to_size};
use strata_dtype::{ColumnDetails, DType, Nullability, Schema};
use strata_error::{StrataResult, strata_err};

use crate::{CsvReadOptions, CsvTabularReader, TabularReader, open_tabular};

type Opener<R> = Box<dyn FnMut() -> StrataResult<R>>;

/// A batch source over a [`TabularReader`], declaring every column a non-nullable string.
///
/// Each pull copies the cells of up to `desired_count` rows into an arena that is cleared at the
/// start of the next pull, so the tokenizer's own buffers never escape.
pub struct TabularFileReader<R> {
    open: Opener<R>,
    reader: Option<R>,
    schema: Schema,
    arena: ArenaBlock,
    spans: Vec<Vec<ByteSpan>>,
    count: usize,
    exhausted: bool,
}

impl TabularFileReader<CsvTabularReader<File>> {
    /// Read the delimited text file at `path`. [`BatchSource::reset`] reopens the file.
    pub fn open(path: impl AsRef<Path>, options: CsvReadOptions) -> StrataResult<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        Self::try_new(move || open_tabular(&path, &options))
    }
}

impl<R: TabularReader> TabularFileReader<R> {
    /// Read from the tokenizer returned by `open`, which is called again on every reset.
    pub fn try_new(open: impl FnMut() -> StrataResult<R> + 'static) -> StrataResult<Self> {
        let mut open: Opener<R> = Box::new(open);
        let reader = open()?;
        let schema = Self::derive_schema(&reader);
        Ok(Self {
            spans: vec![Vec::new(); schema.len()],
            open,
            reader: Some(reader),
            schema,
            arena: ArenaBlock::new(),
            count: 0,
            exhausted: false,
        })
    }

    fn derive_schema(reader: &R) -> Schema {
        reader
            .columns()
            .iter()
            .map(|name| {
                ColumnDetails::new(name.as_str(), DType::Utf8(Nullability::NonNullable), false)
            })
            .collect()
    }
}

impl<R: TabularReader> BatchSource for TabularFileReader<R> {
    fn columns(&self) -> &Schema {
        &self.schema
    }

    fn batch(&self, getter: ColumnGetter) -> StrataResult<Batch<'_>> {
        let spans = self
            .spans
            .get(getter.column())
            .ok_or_else(|| strata_err!(OutOfBounds: getter.column(), 0, self.spans.len()))?;
        let view = Utf8View::new(&spans[..self.count], self.arena.bytes());
        Batch::all(ArrayView::Utf8(view), self.count)
    }

    fn next(&mut self, desired_count: usize) -> StrataResult<usize> {
        self.count = 0;
        let Some(reader) = self.reader.as_mut() else {
            return Ok(0);
        };
        if self.exhausted {
            return Ok(0);
        }

        self.arena.clear();
        for spans in &mut self.spans {
            allocate_to_size(spans, desired_count);
        }
        while self.count < desired_count {
            if !reader.next_row()? {
                self.exhausted = true;
                break;
            }
            for (column, spans) in self.spans.iter_mut().enumerate() {
                spans[self.count] = self.arena.get_copy(reader.current(column))?;
            }
            self.count += 1;
        }
        trace!(
            "read {} rows, {} bytes of cells",
            self.count,
            self.arena.len()
        );
        Ok(self.count)
    }

    fn reset(&mut self) -> StrataResult<()> {
        self.reader = None;
        let reader = (self.open)()?;
        self.schema = Self::derive_schema(&reader);
        self.spans.resize_with(self.schema.len(), Vec::new);
        self.reader = Some(reader);
        self.arena.clear();
        self.count = 0;
        self.exhausted = false;
        debug!("reopened tabular source with {} columns", self.schema.len());
        Ok(())
    }

    fn dispose(&mut self) -> StrataResult<()> {
        if self.reader.take().is_some() {
            debug!("closed tabular source");
        }
        self.count = 0;
        Ok(())
    }
}

impl<R> Debug for TabularFileReader<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabularFileReader")
            .field("schema", &self.schema)
            .field("open", &self.reader.is_some())
            .field("count", &self.count)
            .field("exhausted", &self.exhausted)
            .finish_non_exhaustive()
    }
}
