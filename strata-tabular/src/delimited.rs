use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ByteRecord, ReaderBuilder};
use log::debug;
use strata_error::{ResultExt, StrataResult};

use crate::TabularReader;

/// Options for tokenizing delimited text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReadOptions {
    delimiter: Option<u8>,
    quote: u8,
    has_header: bool,
    flexible: bool,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            has_header: true,
            flexible: false,
        }
    }
}

impl CsvReadOptions {
    /// Separate cells with `delimiter` instead of picking one from the file extension.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Quote cells with `quote`.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Whether the first row names the columns. Without one, columns are named `Column0`,
    /// `Column1`, and so on.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Accept rows with differing numbers of cells. Missing cells read as empty.
    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }

    /// The delimiter for the file at `path`: the configured one, a tab for `.tsv` files, a comma
    /// otherwise.
    pub fn delimiter_for(&self, path: &Path) -> u8 {
        self.delimiter.unwrap_or_else(|| {
            let is_tsv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
            if is_tsv { b'\t' } else { b',' }
        })
    }
}

/// A [`TabularReader`] over delimited text, using the `csv` tokenizer.
///
/// Cells are raw bytes; no UTF-8 validation takes place.
#[derive(Debug)]
pub struct CsvTabularReader<R> {
    reader: csv::Reader<R>,
    columns: Vec<String>,
    record: ByteRecord,
    pending: bool,
}

impl<R: Read> CsvTabularReader<R> {
    /// Tokenize `source`, separating cells with the configured delimiter or a comma.
    pub fn from_reader(source: R, options: &CsvReadOptions) -> StrataResult<Self> {
        Self::with_delimiter(source, options, options.delimiter.unwrap_or(b','))
    }

    fn with_delimiter(source: R, options: &CsvReadOptions, delimiter: u8) -> StrataResult<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(options.flexible)
            .from_reader(source);

        let mut record = ByteRecord::new();
        let (columns, pending) = if options.has_header {
            let columns = reader
                .byte_headers()?
                .iter()
                .map(|name| String::from_utf8_lossy(name).into_owned())
                .collect();
            (columns, false)
        } else {
            // Without a header the first row determines the width, and is replayed on the first
            // call to `next_row`.
            let pending = reader.read_byte_record(&mut record)?;
            let columns = (0..record.len()).map(|i| format!("Column{i}")).collect();
            (columns, pending)
        };

        Ok(Self {
            reader,
            columns,
            record,
            pending,
        })
    }
}

impl<R: Read> TabularReader for CsvTabularReader<R> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> StrataResult<bool> {
        if self.pending {
            self.pending = false;
            return Ok(true);
        }
        Ok(self.reader.read_byte_record(&mut self.record)?)
    }

    fn current(&self, column: usize) -> &[u8] {
        self.record.get(column).unwrap_or_default()
    }
}

/// Open the delimited text file at `path`.
///
/// Unless `options` names a delimiter, `.tsv` files are split on tabs and everything else on
/// commas.
pub fn open_tabular(
    path: impl AsRef<Path>,
    options: &CsvReadOptions,
) -> StrataResult<CsvTabularReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = CsvTabularReader::with_delimiter(file, options, options.delimiter_for(path))
        .with_context(|| format!("reading header of {}", path.display()))?;
    debug!(
        "opened {} with {} columns",
        path.display(),
        reader.columns().len()
    );
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    fn rows(reader: &mut impl TabularReader) -> Vec<Vec<Vec<u8>>> {
        let mut rows = Vec::new();
        while reader.next_row().unwrap() {
            rows.push(
                (0..reader.columns().len())
                    .map(|c| reader.current(c).to_vec())
                    .collect(),
            );
        }
        rows
    }

    #[test]
    fn header_names_columns() {
        let data = b"name,city\nann,\"Paris, FR\"\nbob,\n";
        let mut reader =
            CsvTabularReader::from_reader(&data[..], &CsvReadOptions::default()).unwrap();
        assert_eq!(reader.columns(), &["name", "city"]);
        assert_eq!(
            rows(&mut reader),
            vec![
                vec![b"ann".to_vec(), b"Paris, FR".to_vec()],
                vec![b"bob".to_vec(), Vec::new()],
            ]
        );
        assert!(!reader.next_row().unwrap());
        assert!(!reader.next_row().unwrap());
    }

    #[test]
    fn generated_names_without_header() {
        let data = b"1;2;3\n4;5;6\n";
        let options = CsvReadOptions::default()
            .with_header(false)
            .with_delimiter(b';');
        let mut reader = CsvTabularReader::from_reader(&data[..], &options).unwrap();
        assert_eq!(reader.columns(), &["Column0", "Column1", "Column2"]);
        assert_eq!(rows(&mut reader).len(), 2);
    }

    #[test]
    fn short_rows_need_flexible() {
        let data = b"a,b\n1\n";
        let strict = CsvTabularReader::from_reader(&data[..], &CsvReadOptions::default());
        assert!(strict.unwrap().next_row().is_err());

        let options = CsvReadOptions::default().with_flexible(true);
        let mut reader = CsvTabularReader::from_reader(&data[..], &options).unwrap();
        assert_eq!(rows(&mut reader), vec![vec![b"1".to_vec(), Vec::new()]]);
    }

    #[rstest]
    #[case("table.tsv", b'\t')]
    #[case("TABLE.TSV", b'\t')]
    #[case("table.csv", b',')]
    #[case("table", b',')]
    fn delimiter_follows_extension(#[case] name: &str, #[case] expected: u8) {
        assert_eq!(CsvReadOptions::default().delimiter_for(Path::new(name)), expected);
        assert_eq!(
            CsvReadOptions::default()
                .with_delimiter(b'|')
                .delimiter_for(Path::new(name)),
            b'|'
        );
    }

    #[test]
    fn opens_tsv_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.tsv");
        fs::write(&path, "a\tb\nx,y\tz\n").unwrap();
        let mut reader = open_tabular(&path, &CsvReadOptions::default()).unwrap();
        assert_eq!(rows(&mut reader), vec![vec![b"x,y".to_vec(), b"z".to_vec()]]);

        assert!(open_tabular(dir.path().join("missing.csv"), &CsvReadOptions::default()).is_err());
    }
}
